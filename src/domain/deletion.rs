//! Deletion targets and the values they are built from
//!
//! A run starts from opaque references scraped out of exported listing pages
//! and ends with typed targets that map one-to-one onto remote delete calls.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of object being deleted.
///
/// Drives the extraction pattern, the remote operation and the counter bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionCategory {
    Comment,
    Reaction,
}

impl DeletionCategory {
    /// Enumeration order; work is flattened in this order.
    pub const ALL: [Self; 2] = [Self::Comment, Self::Reaction];

    /// Label printed at the start of every progress line
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Comment => "Comment",
            Self::Reaction => "Like",
        }
    }

    /// Key used by configuration and the command line
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Comment => "comments",
            Self::Reaction => "likes",
        }
    }
}

impl fmt::Display for DeletionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Href scraped from one exported listing row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawReference(String);

impl RawReference {
    pub fn new(href: impl Into<String>) -> Self {
        Self(href.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RawReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RawReference {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentTarget {
    pub owner_id: String,
    pub item_id: String,
    /// Kept for log lines only, never re-parsed.
    pub source_reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionTarget {
    /// Object type as accepted by `likes.delete` (`post`, `photo`, `video`, ...)
    pub kind: String,
    pub owner_id: String,
    pub item_id: String,
    /// Kept for log lines only, never re-parsed.
    pub source_reference: String,
}

/// One object slated for deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionTarget {
    Comment(CommentTarget),
    Reaction(ReactionTarget),
}

impl DeletionTarget {
    #[must_use]
    pub const fn category(&self) -> DeletionCategory {
        match self {
            Self::Comment(_) => DeletionCategory::Comment,
            Self::Reaction(_) => DeletionCategory::Reaction,
        }
    }

    #[must_use]
    pub fn source_reference(&self) -> &str {
        match self {
            Self::Comment(target) => &target.source_reference,
            Self::Reaction(target) => &target.source_reference,
        }
    }
}

/// Unit of work handed to the dispatch engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// A parsed target that gets exactly one remote delete attempt
    Delete(DeletionTarget),
    /// A reference that matched no known shape. Settled without a network call.
    Unparseable {
        category: DeletionCategory,
        reference: RawReference,
    },
}

impl WorkItem {
    #[must_use]
    pub const fn category(&self) -> DeletionCategory {
        match self {
            Self::Delete(target) => target.category(),
            Self::Unparseable { category, .. } => *category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_order_is_comments_then_likes() {
        assert_eq!(DeletionCategory::ALL, [DeletionCategory::Comment, DeletionCategory::Reaction]);
        assert!(DeletionCategory::Comment < DeletionCategory::Reaction);
    }

    #[test]
    fn labels_and_keys() {
        assert_eq!(DeletionCategory::Comment.label(), "Comment");
        assert_eq!(DeletionCategory::Reaction.label(), "Like");
        assert_eq!(DeletionCategory::Reaction.to_string(), "likes");
    }

    #[test]
    fn work_item_reports_its_category() {
        let item = WorkItem::Delete(DeletionTarget::Reaction(ReactionTarget {
            kind: "post".to_string(),
            owner_id: "1".to_string(),
            item_id: "2".to_string(),
            source_reference: "https://vk.com/wall1_2".to_string(),
        }));
        assert_eq!(item.category(), DeletionCategory::Reaction);

        let skipped = WorkItem::Unparseable {
            category: DeletionCategory::Comment,
            reference: RawReference::from("https://vk.com/feed"),
        };
        assert_eq!(skipped.category(), DeletionCategory::Comment);
    }
}
