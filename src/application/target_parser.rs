//! Conversion of raw listing references into typed deletion targets
//!
//! Each reference is matched on its own, so the owner, item and reference of
//! one target always come from the same href. Nothing is paired positionally
//! across independent scans.
//!
//! Accounting: the category's `expected` counter is set to the number of
//! references scanned, and every reference produces exactly one work item, so
//! a finished run always ends with `completed == expected`.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::domain::{
    CommentTarget, DeletionCategory, DeletionTarget, ProgressCounters, RawReference,
    ReactionTarget, WorkItem,
};

static COMMENT_OWNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"wall(-?\d*)").expect("static comment owner pattern"));
static COMMENT_REPLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"reply=(\d*)").expect("static comment reply pattern"));
static REACTION_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/([A-Za-z]+)(-?\d+)_(\d+)").expect("static reaction object pattern")
});

/// `likes.delete` has no `wall` type; wall objects are `post`.
const WALL_KIND: &str = "wall";
const POST_KIND: &str = "post";

/// Work items for one category, in reference order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedListing {
    pub scanned: usize,
    pub items: Vec<WorkItem>,
}

impl ParsedListing {
    #[must_use]
    pub fn targets(&self) -> Vec<&DeletionTarget> {
        self.items
            .iter()
            .filter_map(|item| match item {
                WorkItem::Delete(target) => Some(target),
                WorkItem::Unparseable { .. } => None,
            })
            .collect()
    }

    #[must_use]
    pub fn unparseable_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, WorkItem::Unparseable { .. }))
            .count()
    }
}

/// Parse the references of `category` and record its expected count.
pub fn parse_listing(
    category: DeletionCategory,
    references: Vec<RawReference>,
    counters: &ProgressCounters,
) -> ParsedListing {
    match category {
        DeletionCategory::Comment => parse_comment_targets(references, counters),
        DeletionCategory::Reaction => parse_reaction_targets(references, counters),
    }
}

/// Comment references look like `.../wall<owner>_<post>?reply=<id>`.
///
/// A missing owner or reply id becomes an empty field; the remote API rejects
/// it and the attempt is logged like any other API failure.
pub fn parse_comment_targets(
    references: Vec<RawReference>,
    counters: &ProgressCounters,
) -> ParsedListing {
    counters.set_expected(DeletionCategory::Comment, references.len());

    let scanned = references.len();
    let items = references
        .into_iter()
        .map(|reference| WorkItem::Delete(DeletionTarget::Comment(comment_target(reference))))
        .collect();

    debug!("Parsed {} comment references", scanned);
    ParsedListing { scanned, items }
}

fn comment_target(reference: RawReference) -> CommentTarget {
    let href = reference.as_str();
    let owner_id = first_group(&COMMENT_OWNER, href);
    let item_id = first_group(&COMMENT_REPLY, href);
    if owner_id.is_empty() || item_id.is_empty() {
        debug!("Comment reference without owner or reply id: {}", href);
    }

    CommentTarget {
        owner_id,
        item_id,
        source_reference: reference.into_inner(),
    }
}

fn first_group(pattern: &Regex, haystack: &str) -> String {
    pattern
        .captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Reaction references look like `.../<kind><owner>_<item>`, e.g. `/wall-1_2`
/// or `/photo15_456`.
pub fn parse_reaction_targets(
    references: Vec<RawReference>,
    counters: &ProgressCounters,
) -> ParsedListing {
    counters.set_expected(DeletionCategory::Reaction, references.len());

    let scanned = references.len();
    let items: Vec<WorkItem> = references
        .into_iter()
        .map(|reference| match reaction_target(&reference) {
            Some(target) => WorkItem::Delete(DeletionTarget::Reaction(target)),
            None => {
                warn!("Unrecognised like reference: {}", reference);
                WorkItem::Unparseable {
                    category: DeletionCategory::Reaction,
                    reference,
                }
            }
        })
        .collect();

    debug!("Parsed {} like references", scanned);
    ParsedListing { scanned, items }
}

fn reaction_target(reference: &RawReference) -> Option<ReactionTarget> {
    let caps = REACTION_OBJECT.captures(reference.as_str())?;
    let kind = match &caps[1] {
        WALL_KIND => POST_KIND.to_string(),
        other => other.to_string(),
    };

    Some(ReactionTarget {
        kind,
        owner_id: caps[2].to_string(),
        item_id: caps[3].to_string(),
        source_reference: reference.to_string(),
    })
}
