//! URL table for the shop app

use super::views::{self, View};
use crate::routing::{RouteError, RouteTable};

pub const APP_NAME: &str = "shop";

/// Routes in matching order
pub fn build() -> Result<RouteTable<View>, RouteError> {
    RouteTable::builder(APP_NAME)
        .route("", views::index as View, "index")
        .route("course/<int:course_id>", views::single_course, "single_course")
        .build()
}
