//! Routing module
//!
//! Path-pattern routing with typed placeholders:
//! - Pattern compilation (`<int:id>`, `<slug:s>`, `<path:p>`, `<uuid:u>`)
//! - Ordered, first-match-wins resolution
//! - Reverse lookup from namespaced route names

mod converter;
mod error;
mod pattern;
mod table;

pub use converter::{Converter, ParamValue};
pub use error::RouteError;
pub use pattern::RoutePattern;
pub use table::{ResolvedRoute, Route, RouteTable, RouteTableBuilder};
