//! Bulletin board notice
//!
//! Notices are written by the bulletin collaborator. The office only looks
//! at `category` (to spot meeting triggers) and forwards `content` to the
//! reasoning client as meeting context.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    pub category: String,
    pub content: String,
}

impl Notice {
    pub fn new(id: impl Into<String>, category: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            content: content.into(),
        }
    }

    /// Whether this notice carries the given trigger category
    ///
    /// Comparison ignores surrounding whitespace and ASCII case.
    ///
    /// # Example
    /// ```
    /// use virtual_office_core::Notice;
    ///
    /// let notice = Notice::new("n1", " Emergency Meeting", "fire drill");
    /// assert!(notice.is_category("emergency meeting"));
    /// assert!(!notice.is_category("announcement"));
    /// ```
    pub fn is_category(&self, category: &str) -> bool {
        self.category.trim().eq_ignore_ascii_case(category.trim())
    }
}
