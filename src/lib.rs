//! Shop server
//!
//! A hyper/tokio HTTP server for the `shop` application. Requests are
//! resolved through an immutable route table with typed path placeholders
//! and dispatched to the shop views:
//!
//! - `GET /`                  -> `shop:index`
//! - `GET /course/<int:id>`   -> `shop:single_course`

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
pub mod shop;
