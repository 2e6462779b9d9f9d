//! HTTP protocol layer module
//!
//! Response builders shared by the dispatcher and the shop views.

pub mod response;

pub use response::{
    apply_server_header, build_404_response, build_405_response, build_413_response,
    build_health_response, build_html_response, build_options_response,
};
