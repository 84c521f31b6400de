//! Merge token geometry into per-line bounding boxes.
//!
//! The boxes of all word tokens overlapping a span group are grouped by
//! `(top rounded to N decimals, page)`, which approximates "same text line",
//! and each group collapses to the box enclosing its members.

use indexmap::IndexMap;

use crate::config::BoxMergeConfig;
use crate::document::{Document, Layer};
use crate::error::{Error, Result};
use crate::geometry::{BoxGroup, PageBox};
use crate::span::SpanGroup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LineKey {
    top: i64,
    page: usize,
}

/// Reduces token boxes to one box per line per page.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxMerger {
    config: BoxMergeConfig,
}

impl BoxMerger {
    /// Create a merger with the given settings.
    pub fn new(config: BoxMergeConfig) -> Self {
        Self { config }
    }

    /// Compute the merged footprint of `group`.
    ///
    /// # Errors
    ///
    /// [`Error::MissingDocument`] if no document is supplied; the document is
    /// the only source of token geometry.
    pub fn merge(&self, group: &SpanGroup, document: Option<&Document>) -> Result<BoxGroup> {
        let document = document.ok_or(Error::MissingDocument)?;
        let boxes = token_boxes(group, document);
        Ok(BoxGroup::new(self.merge_lines(&boxes), group.kind))
    }

    /// Collapse boxes sharing a line key, keeping first-seen line order.
    ///
    /// Tops round half to even, so `0.125` keys as `0.12` at two digits.
    pub fn merge_lines(&self, boxes: &[PageBox]) -> Vec<PageBox> {
        let scale = 10f64.powi(self.config.digits as i32);
        let mut lines: IndexMap<LineKey, PageBox> = IndexMap::new();

        for b in boxes {
            let key = LineKey {
                top: (b.top as f64 * scale).round_ties_even() as i64,
                page: b.page,
            };
            lines
                .entry(key)
                .and_modify(|merged| *merged = merged.union(b))
                .or_insert(*b);
        }

        lines.into_values().collect()
    }
}

/// Glyph boxes of every word overlapping `group`. A word without per-span
/// boxes contributes its own box group instead.
fn token_boxes(group: &SpanGroup, document: &Document) -> Vec<PageBox> {
    let mut boxes = Vec::new();
    for word in document.find_overlapping(group, Layer::Words) {
        let before = boxes.len();
        boxes.extend(word.spans.iter().filter_map(|s| s.bbox));
        if boxes.len() == before {
            if let Some(bg) = &word.box_group {
                boxes.extend(bg.boxes.iter().copied());
            }
        }
    }
    boxes
}

/// Merge boxes for `group` with default settings.
pub fn merge_boxes(group: &SpanGroup, document: Option<&Document>) -> Result<BoxGroup> {
    BoxMerger::default().merge(group, document)
}
