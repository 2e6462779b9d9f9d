//! Request handler module
//!
//! Dispatches requests through the shop route table to its views.

pub mod router;

pub use router::handle_request;
