//! In-memory course catalog read by the shop views

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Courses in configuration order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    courses: Vec<Course>,
}

impl Catalog {
    pub const fn new(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    pub fn all(&self) -> &[Course] {
        &self.courses
    }

    pub fn get(&self, id: u64) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }
}
