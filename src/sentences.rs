//! Sentence type assignment.
//!
//! Layout detection and sentence segmentation run independently, so a raw
//! sentence may straddle several typed blocks. This module walks the typed
//! blocks in order and, for every sentence each block overlaps, decides
//! whether to emit the whole sentence, emit only the part inside the block, or
//! emit nothing yet:
//!
//! ```text
//! block is Title/Table/Figure/Preamble      → emit sentence ∩ block
//! sentence starts before a content block    → emit sentence ∩ block, if every
//!                                             earlier block it touches is a
//!                                             layout block or it was already split
//! sentence starts inside the block          → emit the whole sentence once
//! after the walk, never-emitted sentences   → emit whole, typed Other
//! ```
//!
//! A [`Ledger`] remembers, per raw sentence, the furthest end offset emitted
//! so far. A new segment for a sentence is only emitted if it reaches further,
//! which keeps the segments of one sentence disjoint and ordered.

use std::collections::HashMap;

use crate::document::{Document, Layer};
use crate::error::{Error, Result};
use crate::geometry::BoxMerger;
use crate::intervals::intersect;
use crate::span::{SentenceId, Span, SpanGroup, SpanType};

/// Furthest emitted end offset per raw sentence.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    ends: HashMap<SentenceId, usize>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Furthest end emitted for `id`, if any segment was emitted.
    pub fn get(&self, id: SentenceId) -> Option<usize> {
        self.ends.get(&id).copied()
    }

    /// True if any segment of `id` was emitted.
    pub fn contains(&self, id: SentenceId) -> bool {
        self.ends.contains_key(&id)
    }

    /// True if a segment ending at `end` would extend `id` past its recorded end.
    pub fn extends(&self, id: SentenceId, end: usize) -> bool {
        self.get(id).map_or(true, |recorded| recorded < end)
    }

    /// Record an emitted segment end for `id`.
    pub fn record(&mut self, id: SentenceId, end: usize) {
        self.ends.insert(id, end);
    }

    /// Number of sentences with at least one emitted segment.
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    /// True if nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// All entries, ordered by sentence id.
    pub fn entries(&self) -> Vec<(SentenceId, usize)> {
        let mut entries: Vec<(SentenceId, usize)> =
            self.ends.iter().map(|(id, end)| (*id, *end)).collect();
        entries.sort_unstable();
        entries
    }
}

/// How many segments each rule emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseCounts {
    /// Sentence tightened to a layout block
    pub layout: usize,
    /// Sentence tightened to a content block it started before
    pub straddling: usize,
    /// Sentence emitted whole by the block it starts in
    pub starting: usize,
    /// Sentence never claimed by a block, typed `Other`
    pub leftover: usize,
}

impl CaseCounts {
    /// Total emitted segments.
    pub fn total(&self) -> usize {
        self.layout + self.straddling + self.starting + self.leftover
    }
}

/// Full result of a typing run.
#[derive(Debug, Clone, Default)]
pub struct SentenceAssignment {
    /// Typed sentence segments in emission order; ids are their positions
    pub sentences: Vec<SpanGroup>,
    /// Raw sentence each segment was cut from, parallel to `sentences`
    pub sources: Vec<SentenceId>,
    /// Final ledger state
    pub ledger: Ledger,
    /// Emissions per rule
    pub cases: CaseCounts,
}

impl SentenceAssignment {
    /// Emitted segments of one raw sentence, in emission order.
    pub fn segments_of(&self, id: SentenceId) -> Vec<&SpanGroup> {
        self.sources
            .iter()
            .zip(&self.sentences)
            .filter(|(source, _)| **source == id)
            .map(|(_, sentence)| sentence)
            .collect()
    }
}

/// Assigns every raw sentence a type from the typed blocks it falls in.
#[derive(Debug, Clone, Copy)]
pub struct SentenceTyper {
    merger: BoxMerger,
    add_text: bool,
}

impl Default for SentenceTyper {
    fn default() -> Self {
        Self::new(BoxMerger::default())
    }
}

impl SentenceTyper {
    /// Create a typer using `merger` for segment geometry.
    pub fn new(merger: BoxMerger) -> Self {
        Self {
            merger,
            add_text: true,
        }
    }

    /// Enable or disable text on emitted segments.
    pub fn with_text(mut self, enable: bool) -> Self {
        self.add_text = enable;
        self
    }

    /// Typed sentences of `document`, in emission order.
    ///
    /// # Errors
    ///
    /// [`Error::MissingLayer`] if sentences or typed blocks are not attached.
    pub fn assign(&self, document: &Document) -> Result<Vec<SpanGroup>> {
        Ok(self.assign_detailed(document)?.sentences)
    }

    /// Like [`assign`](Self::assign), also returning segment sources, the
    /// ledger and per-rule counts.
    pub fn assign_detailed(&self, document: &Document) -> Result<SentenceAssignment> {
        let blocks = document.require(Layer::TypedBlocks)?;
        let sentences = document.require(Layer::Sentences)?;
        let mut out = SentenceAssignment::default();

        for block in blocks {
            let kind = block.kind.unwrap_or(SpanType::Other);

            for index in document.overlapping_indices(block, Layer::Sentences) {
                let id = SentenceId(index);
                let sentence = &sentences[index];

                if kind.is_layout() {
                    let spans = intersect(block, sentence)?;
                    if out.ledger.extends(id, spans_end(&spans)) {
                        log::trace!("{} tightened to {} block at {}", id, kind, block.start());
                        self.emit(document, spans, kind, id, &mut out)?;
                        out.cases.layout += 1;
                    }
                } else if sentence.start() < block.start() {
                    if kind.is_content()
                        && (out.ledger.contains(id)
                            || earlier_blocks_are_layout(document, sentence, block))
                    {
                        let spans = intersect(block, sentence)?;
                        if out.ledger.extends(id, spans_end(&spans)) {
                            log::trace!("{} continued into {} block at {}", id, kind, block.start());
                            self.emit(document, spans, kind, id, &mut out)?;
                            out.cases.straddling += 1;
                        }
                    }
                } else if !out.ledger.contains(id) {
                    self.emit(document, sentence.spans.clone(), kind, id, &mut out)?;
                    out.cases.starting += 1;
                }
            }
        }

        for (index, sentence) in sentences.iter().enumerate() {
            let id = SentenceId(index);
            if !out.ledger.contains(id) {
                log::trace!("{} outside every block", id);
                self.emit(document, sentence.spans.clone(), SpanType::Other, id, &mut out)?;
                out.cases.leftover += 1;
            }
        }

        log::info!(
            "Typed {} sentence segments from {} sentences and {} blocks",
            out.sentences.len(),
            sentences.len(),
            blocks.len()
        );
        log::debug!("Emissions per rule: {:?}", out.cases);
        Ok(out)
    }

    fn emit(
        &self,
        document: &Document,
        spans: Vec<Span>,
        kind: SpanType,
        source: SentenceId,
        out: &mut SentenceAssignment,
    ) -> Result<()> {
        if spans.is_empty() {
            return Err(Error::EmptySpanGroup(source.to_string()));
        }

        let mut segment = SpanGroup::new(spans)
            .with_kind(kind)
            .with_id(out.sentences.len());
        segment.box_group = Some(self.merger.merge(&segment, Some(document))?);
        if self.add_text {
            segment.text = Some(document.words_text(&segment));
        }

        out.ledger.record(source, segment.end());
        out.sources.push(source);
        out.sentences.push(segment);
        Ok(())
    }
}

/// Type the sentences of `document` with default settings.
pub fn assign_types(document: &Document) -> Result<Vec<SpanGroup>> {
    SentenceTyper::default().assign(document)
}

fn spans_end(spans: &[Span]) -> usize {
    spans.iter().map(|s| s.end).max().unwrap_or(0)
}

/// True if every typed block overlapping `sentence` that starts before
/// `current` is a layout block.
fn earlier_blocks_are_layout(document: &Document, sentence: &SpanGroup, current: &SpanGroup) -> bool {
    document
        .find_overlapping(sentence, Layer::TypedBlocks)
        .into_iter()
        .filter(|b| b.start() < current.start())
        .all(|b| b.kind.map_or(false, |k| k.is_layout()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn group(start: usize, end: usize) -> SpanGroup {
        SpanGroup::new(vec![Span::new(start, end)])
    }

    fn block(start: usize, end: usize, kind: SpanType) -> SpanGroup {
        group(start, end).with_kind(kind)
    }

    fn doc(blocks: Vec<SpanGroup>, sentences: Vec<SpanGroup>) -> Document {
        Document::new("x".repeat(200))
            .with_layer(Layer::TypedBlocks, blocks)
            .with_layer(Layer::Sentences, sentences)
    }

    fn spans_and_kinds(sentences: &[SpanGroup]) -> Vec<(usize, usize, SpanType)> {
        sentences
            .iter()
            .map(|s| (s.start(), s.end(), s.kind.unwrap_or(SpanType::Other)))
            .collect()
    }

    #[test]
    fn test_ledger() {
        let mut ledger = Ledger::new();
        assert!(ledger.extends(SentenceId(0), 0));
        ledger.record(SentenceId(3), 40);
        ledger.record(SentenceId(1), 10);
        assert_eq!(ledger.get(SentenceId(3)), Some(40));
        assert!(!ledger.extends(SentenceId(3), 40));
        assert!(ledger.extends(SentenceId(3), 41));
        assert_eq!(ledger.entries(), vec![(SentenceId(1), 10), (SentenceId(3), 40)]);
    }

    #[test]
    fn test_figure_then_text_splits_sentence() {
        let document = doc(
            vec![block(100, 120, SpanType::Figure), block(120, 140, SpanType::Text)],
            vec![group(100, 140)],
        );
        let result = SentenceTyper::default().assign_detailed(&document).unwrap();

        assert_eq!(
            spans_and_kinds(&result.sentences),
            vec![(100, 120, SpanType::Figure), (120, 140, SpanType::Text)]
        );
        assert_eq!(result.sources, vec![SentenceId(0), SentenceId(0)]);
        assert_eq!(result.ledger.get(SentenceId(0)), Some(140));
        assert_eq!(result.cases.layout, 1);
        assert_eq!(result.cases.straddling, 1);
    }

    #[test]
    fn test_sentence_inside_block_emitted_whole_once() {
        let document = doc(
            vec![block(0, 50, SpanType::Text), block(50, 100, SpanType::Text)],
            vec![group(0, 20), group(40, 60), group(60, 90)],
        );
        let result = SentenceTyper::default().assign_detailed(&document).unwrap();

        // [40, 60) starts in the first block; the second block must not re-emit its tail
        assert_eq!(
            spans_and_kinds(&result.sentences),
            vec![
                (0, 20, SpanType::Text),
                (40, 60, SpanType::Text),
                (60, 90, SpanType::Text)
            ]
        );
        assert_eq!(result.cases.starting, 3);
        assert_eq!(result.cases.straddling, 0);
    }

    #[test]
    fn test_unclaimed_sentences_become_other() {
        let document = doc(
            vec![block(10, 50, SpanType::Other), block(50, 100, SpanType::Text)],
            vec![group(0, 60), group(150, 160)],
        );
        let result = SentenceTyper::default().assign_detailed(&document).unwrap();

        assert_eq!(
            spans_and_kinds(&result.sentences),
            vec![(0, 60, SpanType::Other), (150, 160, SpanType::Other)]
        );
        assert_eq!(result.cases.leftover, 2);
        assert_eq!(result.ledger.len(), 2);
    }

    #[test]
    fn test_title_tightens_sentence_bleeding_into_text() {
        let document = doc(
            vec![block(0, 12, SpanType::Title), block(12, 80, SpanType::Text)],
            vec![group(0, 40), group(40, 80)],
        );
        let result = SentenceTyper::default().assign_detailed(&document).unwrap();

        assert_eq!(
            spans_and_kinds(&result.sentences),
            vec![
                (0, 12, SpanType::Title),
                (12, 40, SpanType::Text),
                (40, 80, SpanType::Text)
            ]
        );
        let ids: Vec<Option<usize>> = result.sentences.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn test_text_attached_from_words() {
        let document = Document::new("Hello world. Bye.")
            .with_layer(
                Layer::Words,
                vec![
                    group(0, 5).with_text("Hello"),
                    group(6, 12).with_text("world."),
                    group(13, 17).with_text("Bye."),
                ],
            )
            .with_layer(Layer::TypedBlocks, vec![block(0, 17, SpanType::Text)])
            .with_layer(Layer::Sentences, vec![group(0, 12), group(13, 17)]);

        let sentences = assign_types(&document).unwrap();
        assert_eq!(sentences[0].text.as_deref(), Some("Hello world."));
        assert_eq!(sentences[1].text.as_deref(), Some("Bye."));

        let bare = SentenceTyper::default().with_text(false).assign(&document).unwrap();
        assert!(bare[0].text.is_none());
    }

    #[test]
    fn test_requires_typed_blocks() {
        let document = Document::new("").with_layer(Layer::Sentences, vec![]);
        assert!(matches!(
            assign_types(&document),
            Err(Error::MissingLayer(Layer::TypedBlocks))
        ));
    }
}
