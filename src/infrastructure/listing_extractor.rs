//! HTML extraction of deletable rows from exported listing pages
//!
//! The archive stores comments and likes as paged HTML files. Each deletable
//! object is a `div.item` row whose first anchor links to the object.

use std::fs;
use std::path::{Path, PathBuf};

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{ListingSource, PurgeError, PurgeResult, RawReference};

/// Text encoding of the exported pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportEncoding {
    /// ISO-8859-1. Every byte maps to a character, so decoding never fails.
    #[default]
    Latin1,
    Utf8,
}

impl ExportEncoding {
    fn decode(self, path: &Path, bytes: Vec<u8>) -> PurgeResult<String> {
        match self {
            Self::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
            Self::Utf8 => String::from_utf8(bytes)
                .map_err(|e| PurgeError::malformed_export(path, format!("invalid UTF-8: {e}"))),
        }
    }
}

/// CSS selectors for listing pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// One row per deletable object
    pub item_row: String,
    /// Link inside a row; the first match is used
    pub item_link: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            item_row: "div.item".to_string(),
            item_link: "a".to_string(),
        }
    }
}

pub struct HtmlListingExtractor {
    row_selector: Selector,
    link_selector: Selector,
    encoding: ExportEncoding,
}

impl HtmlListingExtractor {
    /// Extractor with the archive's default selectors
    pub fn new(encoding: ExportEncoding) -> PurgeResult<Self> {
        Self::with_selectors(&ListingSelectors::default(), encoding)
    }

    pub fn with_selectors(selectors: &ListingSelectors, encoding: ExportEncoding) -> PurgeResult<Self> {
        Ok(Self {
            row_selector: compile_selector("item_row", &selectors.item_row)?,
            link_selector: compile_selector("item_link", &selectors.item_link)?,
            encoding,
        })
    }

    /// References of one page in document order
    #[must_use]
    pub fn extract_from_html(&self, html: &str) -> Vec<RawReference> {
        let document = Html::parse_document(html);
        document
            .select(&self.row_selector)
            .filter_map(|row| {
                let href = row
                    .select(&self.link_selector)
                    .next()
                    .and_then(|link| link.value().attr("href"));
                if href.is_none() {
                    warn!("Listing row without a link: {}", row.text().collect::<String>().trim());
                }
                href.map(RawReference::new)
            })
            .collect()
    }

    fn extract_from_file(&self, path: &Path) -> PurgeResult<Vec<RawReference>> {
        let bytes = fs::read(path)
            .map_err(|e| PurgeError::malformed_export(path, format!("cannot read file: {e}")))?;
        let html = self.encoding.decode(path, bytes)?;
        let references = self.extract_from_html(&html);
        debug!("Extracted {} references from {}", references.len(), path.display());
        Ok(references)
    }
}

fn compile_selector(field: &str, selector: &str) -> PurgeResult<Selector> {
    Selector::parse(selector).map_err(|e| {
        PurgeError::configuration(field, format!("invalid CSS selector '{selector}': {e}"))
    })
}

/// Page files of an export directory, ordered by file name.
fn page_files(directory: &Path) -> PurgeResult<Vec<PathBuf>> {
    let entries = fs::read_dir(directory).map_err(|e| {
        PurgeError::malformed_export(directory, format!("cannot list directory: {e}"))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            PurgeError::malformed_export(directory, format!("cannot list directory: {e}"))
        })?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        } else {
            debug!("Skipping non-file entry {}", path.display());
        }
    }
    files.sort();
    Ok(files)
}

impl ListingSource for HtmlListingExtractor {
    fn extract(&self, directory: &Path) -> PurgeResult<Vec<RawReference>> {
        let mut references = Vec::new();
        for path in page_files(directory)? {
            references.extend(self.extract_from_file(&path)?);
        }
        Ok(references)
    }
}
