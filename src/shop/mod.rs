//! The `shop` application: its URL table, views and course catalog

mod catalog;
pub mod urls;
pub mod views;

pub use catalog::{Catalog, Course};
pub use views::{View, ViewRequest};
