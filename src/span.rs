//! Character-offset spans and the span groups built from them.
//!
//! All offsets live in one global integer space shared by the whole document
//! text. Spans are half-open `[start, end)` intervals; a [`SpanGroup`] is one
//! logical unit (word, sentence, block) that may be physically discontiguous.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{BoxGroup, PageBox};

/// Semantic type of a block or sentence.
///
/// This is the closed label set shared by `typed_blocks` and `typed_sents`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanType {
    /// Body text
    Text,
    /// List items
    List,
    /// Section or document title
    Title,
    /// Table content
    Table,
    /// Figure content
    Figure,
    /// Anything not covered by a block
    Other,
    /// Reference list and everything after it
    ReferencesAppendix,
    /// Abstract body
    Abstract,
    /// Front matter before the abstract
    Preamble,
    /// Table or figure caption
    Caption,
}

impl SpanType {
    /// All labels, in declaration order.
    pub const ALL: [SpanType; 10] = [
        SpanType::Text,
        SpanType::List,
        SpanType::Title,
        SpanType::Table,
        SpanType::Figure,
        SpanType::Other,
        SpanType::ReferencesAppendix,
        SpanType::Abstract,
        SpanType::Preamble,
        SpanType::Caption,
    ];

    /// The label string used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanType::Text => "Text",
            SpanType::List => "List",
            SpanType::Title => "Title",
            SpanType::Table => "Table",
            SpanType::Figure => "Figure",
            SpanType::Other => "Other",
            SpanType::ReferencesAppendix => "ReferencesAppendix",
            SpanType::Abstract => "Abstract",
            SpanType::Preamble => "Preamble",
            SpanType::Caption => "Caption",
        }
    }

    /// Layout types are never treated as body text.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_sents::span::SpanType;
    ///
    /// assert!(SpanType::Figure.is_layout());
    /// assert!(!SpanType::Abstract.is_layout());
    /// assert!(!SpanType::Other.is_layout());
    /// ```
    pub fn is_layout(&self) -> bool {
        matches!(
            self,
            SpanType::Title | SpanType::Table | SpanType::Figure | SpanType::Preamble
        )
    }

    /// Content types are eligible for downstream text classification.
    ///
    /// `Other` is neither a content nor a layout type.
    pub fn is_content(&self) -> bool {
        matches!(
            self,
            SpanType::Text
                | SpanType::List
                | SpanType::Abstract
                | SpanType::Caption
                | SpanType::ReferencesAppendix
        )
    }
}

impl fmt::Display for SpanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpanType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SpanType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownSpanType(s.to_string()))
    }
}

/// A half-open `[start, end)` character-offset interval.
///
/// Word-level spans usually carry the box of the glyphs they cover; spans
/// produced by the interval algebra never do.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset
    pub start: usize,
    /// Exclusive end offset
    pub end: usize,
    /// Glyph geometry for token-level spans
    #[serde(rename = "box", default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<PageBox>,
}

impl Span {
    /// Create a span without geometry.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_sents::span::Span;
    ///
    /// let span = Span::new(3, 8);
    /// assert_eq!(span.len(), 5);
    /// ```
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "Span start must be <= end");
        Self {
            start,
            end,
            bbox: None,
        }
    }

    /// Create a span, rejecting `start > end`.
    pub fn try_new(start: usize, end: usize) -> Result<Self> {
        let span = Self {
            start,
            end,
            bbox: None,
        };
        span.validate()?;
        Ok(span)
    }

    /// Attach glyph geometry.
    pub fn with_box(mut self, bbox: PageBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Check the `start <= end` invariant.
    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(Error::InvalidSpan {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Number of offsets covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True for zero-length spans.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Strict overlap: the spans share at least one offset.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Inclusive overlap: spans that only touch at a boundary count too.
    pub fn touches(&self, other: &Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// True if `other` lies entirely inside this span.
    pub fn covers(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Identity of a raw sentence: its position in the document's sentence list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SentenceId(pub usize);

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sent#{}", self.0)
    }
}

/// An ordered sequence of spans forming one logical unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanGroup {
    /// Spans in document order
    pub spans: Vec<Span>,
    /// Semantic type, if assigned
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SpanType>,
    /// Geometric footprint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_group: Option<BoxGroup>,
    /// Cached text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Identifier unique within the owning collection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<usize>,
}

impl SpanGroup {
    /// Create an untyped group from spans.
    pub fn new(spans: Vec<Span>) -> Self {
        Self {
            spans,
            ..Default::default()
        }
    }

    /// Set the semantic type.
    pub fn with_kind(mut self, kind: SpanType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the identifier.
    pub fn with_id(mut self, id: usize) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the cached text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the geometric footprint.
    pub fn with_box_group(mut self, box_group: BoxGroup) -> Self {
        self.box_group = Some(box_group);
        self
    }

    /// Smallest start offset over all spans (0 for an empty group).
    pub fn start(&self) -> usize {
        self.spans.iter().map(|s| s.start).min().unwrap_or(0)
    }

    /// Largest end offset over all spans (0 for an empty group).
    pub fn end(&self) -> usize {
        self.spans.iter().map(|s| s.end).max().unwrap_or(0)
    }

    /// True if the group has no spans.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The label upstream layout detection gave this group.
    pub fn layout_type(&self) -> Option<SpanType> {
        self.box_group.as_ref().and_then(|bg| bg.kind)
    }

    /// True if any span of `self` strictly overlaps any span of `other`.
    pub fn overlaps(&self, other: &SpanGroup) -> bool {
        self.spans
            .iter()
            .any(|a| other.spans.iter().any(|b| a.overlaps(b)))
    }

    /// Validate every span; `what` names the group in the error.
    pub fn validate(&self, what: &str) -> Result<()> {
        if self.spans.is_empty() {
            return Err(Error::EmptySpanGroup(what.to_string()));
        }
        self.spans.iter().try_for_each(Span::validate)
    }
}

impl AsRef<[Span]> for SpanGroup {
    fn as_ref(&self) -> &[Span] {
        &self.spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_type_round_trip_strings() {
        for kind in SpanType::ALL {
            assert_eq!(kind.as_str().parse::<SpanType>().unwrap(), kind);
        }
        assert!("Paragraph".parse::<SpanType>().is_err());
    }

    #[test]
    fn test_layout_and_content_are_disjoint() {
        for kind in SpanType::ALL {
            assert!(!(kind.is_layout() && kind.is_content()), "{kind}");
        }
        assert!(!SpanType::Other.is_layout());
        assert!(!SpanType::Other.is_content());
    }

    #[test]
    fn test_span_type_serializes_to_label() {
        let json = serde_json::to_string(&SpanType::ReferencesAppendix).unwrap();
        assert_eq!(json, "\"ReferencesAppendix\"");
    }

    #[test]
    fn test_try_new_rejects_inverted_span() {
        assert!(Span::try_new(5, 5).is_ok());
        assert!(matches!(
            Span::try_new(6, 5),
            Err(Error::InvalidSpan { start: 6, end: 5 })
        ));
    }

    #[test]
    fn test_overlap_and_touch() {
        let a = Span::new(0, 5);
        let b = Span::new(5, 8);
        let c = Span::new(4, 6);

        assert!(!a.overlaps(&b));
        assert!(a.touches(&b));
        assert!(a.overlaps(&c));
        assert!(Span::new(0, 10).covers(&c));
        assert!(!c.covers(&a));
    }

    #[test]
    fn test_group_bounds() {
        let group = SpanGroup::new(vec![Span::new(20, 30), Span::new(5, 9)]);
        assert_eq!(group.start(), 5);
        assert_eq!(group.end(), 30);
        assert_eq!(SpanGroup::default().start(), 0);
    }

    #[test]
    fn test_group_validate() {
        assert!(SpanGroup::default().validate("block").is_err());
        let bad = SpanGroup::new(vec![Span::new(0, 2), Span { start: 9, end: 3, bbox: None }]);
        assert!(matches!(bad.validate("sentence"), Err(Error::InvalidSpan { .. })));
    }

    #[test]
    fn test_group_deserializes_type_field() {
        let json = r#"{"spans": [{"start": 0, "end": 4}], "type": "Title", "id": 7}"#;
        let group: SpanGroup = serde_json::from_str(json).unwrap();
        assert_eq!(group.kind, Some(SpanType::Title));
        assert_eq!(group.id, Some(7));
        assert!(group.text.is_none());
    }
}
