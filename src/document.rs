//! Parsed document model and overlap queries.
//!
//! A [`Document`] owns the document text plus ordered span group collections
//! ("layers"): words, sentences, blocks and pages produced by the external
//! parser, and the `typed_blocks` / `typed_sents` layers this crate appends.
//! Every layer carries a [`SpanIndex`] so "which groups of layer X overlap
//! span group Y" is answered without scanning the whole collection.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::span::{Span, SpanGroup};

/// Named span group collections of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Word tokens, carrying glyph boxes
    Words,
    /// Raw, untyped sentences
    Sentences,
    /// Raw blocks from layout detection
    Blocks,
    /// Pages
    Pages,
    /// Blocks after tagging
    TypedBlocks,
    /// Sentences after type assignment
    TypedSentences,
}

impl Layer {
    /// Field name of the layer in serialized documents.
    pub fn name(&self) -> &'static str {
        match self {
            Layer::Words => "words",
            Layer::Sentences => "sents",
            Layer::Blocks => "blocks",
            Layer::Pages => "pages",
            Layer::TypedBlocks => "typed_blocks",
            Layer::TypedSentences => "typed_sents",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    start: usize,
    end: usize,
    group: usize,
}

/// Overlap index over one collection of span groups.
///
/// Entries (one per span) are sorted by start and read as an implicit
/// balanced tree: the root of `lo..hi` is the midpoint, and `max_end[mid]`
/// holds the largest end in that subtree. A query prunes every subtree whose
/// ends all fall at or before `query.start` and every right subtree starting
/// at or after `query.end`, so one long span never widens the search.
#[derive(Debug, Clone, Default)]
pub struct SpanIndex {
    entries: Vec<IndexEntry>,
    max_end: Vec<usize>,
}

impl SpanIndex {
    /// Build an index over `groups`.
    pub fn build(groups: &[SpanGroup]) -> Self {
        let mut entries: Vec<IndexEntry> = groups
            .iter()
            .enumerate()
            .flat_map(|(group, sg)| {
                sg.spans.iter().map(move |s| IndexEntry {
                    start: s.start,
                    end: s.end,
                    group,
                })
            })
            .collect();
        entries.sort_by_key(|e| (e.start, e.end, e.group));
        let mut max_end = vec![0; entries.len()];
        fill_max_end(&entries, &mut max_end, 0, entries.len());
        Self { entries, max_end }
    }

    /// Indices of groups with a span strictly overlapping `query`, in span start
    /// order. A group with several hits appears once per hit.
    pub fn overlapping(&self, query: &Span) -> Vec<usize> {
        let mut hits = Vec::new();
        if !query.is_empty() {
            self.search(0, self.entries.len(), query, &mut hits, &mut 0);
        }
        hits
    }

    /// In-order walk of the subtree rooted at the midpoint of `lo..hi`.
    fn search(
        &self,
        lo: usize,
        hi: usize,
        query: &Span,
        hits: &mut Vec<usize>,
        visited: &mut usize,
    ) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        *visited += 1;
        if self.max_end[mid] <= query.start {
            return;
        }
        self.search(lo, mid, query, hits, visited);

        let entry = &self.entries[mid];
        if entry.start >= query.end {
            return;
        }
        if entry.end > query.start && entry.start < entry.end {
            hits.push(entry.group);
        }
        self.search(mid + 1, hi, query, hits, visited);
    }

    /// Number of tree nodes a query touches.
    #[cfg(test)]
    fn visits(&self, query: &Span) -> usize {
        let mut visited = 0;
        self.search(0, self.entries.len(), query, &mut Vec::new(), &mut visited);
        visited
    }

    /// Indices of groups overlapping any span of `query`, ascending and unique.
    pub fn overlapping_group(&self, query: &SpanGroup) -> Vec<usize> {
        let mut hits: Vec<usize> = query
            .spans
            .iter()
            .flat_map(|s| self.overlapping(s))
            .collect();
        hits.sort_unstable();
        hits.dedup();
        hits
    }

    /// Number of indexed spans.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Store the largest end of every subtree of `lo..hi` at its midpoint and
/// return the largest end of the whole range.
fn fill_max_end(entries: &[IndexEntry], max_end: &mut [usize], lo: usize, hi: usize) -> usize {
    if lo >= hi {
        return 0;
    }
    let mid = lo + (hi - lo) / 2;
    let left = fill_max_end(entries, max_end, lo, mid);
    let right = fill_max_end(entries, max_end, mid + 1, hi);
    max_end[mid] = entries[mid].end.max(left).max(right);
    max_end[mid]
}

#[derive(Debug, Clone)]
struct Collection {
    groups: Vec<SpanGroup>,
    index: SpanIndex,
}

impl Collection {
    fn new(groups: Vec<SpanGroup>) -> Self {
        let index = SpanIndex::build(&groups);
        Self { groups, index }
    }
}

/// A parsed document: text plus indexed span group layers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "DocumentData", into = "DocumentData")]
pub struct Document {
    symbols: String,
    /// Byte offset of every char in `symbols`, plus the total length.
    char_offsets: Vec<usize>,
    layers: IndexMap<Layer, Collection>,
}

impl Document {
    /// Create a document over `symbols` with no layers attached.
    pub fn new(symbols: impl Into<String>) -> Self {
        let symbols = symbols.into();
        let char_offsets = symbols
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(symbols.len()))
            .collect();
        Self {
            symbols,
            char_offsets,
            layers: IndexMap::new(),
        }
    }

    /// Attach a layer, builder style.
    pub fn with_layer(mut self, layer: Layer, groups: Vec<SpanGroup>) -> Self {
        self.attach(layer, groups);
        self
    }

    /// Attach (or replace) a layer and rebuild its index.
    pub fn attach(&mut self, layer: Layer, groups: Vec<SpanGroup>) {
        log::debug!("Attaching {} groups to layer {}", groups.len(), layer);
        self.layers.insert(layer, Collection::new(groups));
    }

    /// The document text.
    pub fn symbols(&self) -> &str {
        &self.symbols
    }

    /// True if the layer has been attached.
    pub fn has_layer(&self, layer: Layer) -> bool {
        self.layers.contains_key(&layer)
    }

    /// Groups of a layer, if attached.
    pub fn layer(&self, layer: Layer) -> Option<&[SpanGroup]> {
        self.layers.get(&layer).map(|c| c.groups.as_slice())
    }

    /// Groups of a layer, or [`Error::MissingLayer`].
    pub fn require(&self, layer: Layer) -> Result<&[SpanGroup]> {
        self.layer(layer).ok_or(Error::MissingLayer(layer))
    }

    /// Word tokens (empty if not attached).
    pub fn words(&self) -> &[SpanGroup] {
        self.layer(Layer::Words).unwrap_or(&[])
    }

    /// Raw sentences (empty if not attached).
    pub fn sentences(&self) -> &[SpanGroup] {
        self.layer(Layer::Sentences).unwrap_or(&[])
    }

    /// Raw layout blocks (empty if not attached).
    pub fn blocks(&self) -> &[SpanGroup] {
        self.layer(Layer::Blocks).unwrap_or(&[])
    }

    /// Tagged blocks, once the block tagger has run.
    pub fn typed_blocks(&self) -> Option<&[SpanGroup]> {
        self.layer(Layer::TypedBlocks)
    }

    /// Typed sentences, once the sentence typer has run.
    pub fn typed_sents(&self) -> Option<&[SpanGroup]> {
        self.layer(Layer::TypedSentences)
    }

    /// Indices into `layer` of the groups overlapping `query`, in collection order.
    pub fn overlapping_indices(&self, query: &SpanGroup, layer: Layer) -> Vec<usize> {
        self.layers
            .get(&layer)
            .map(|c| c.index.overlapping_group(query))
            .unwrap_or_default()
    }

    /// Groups of `layer` overlapping `query`, in collection order.
    pub fn find_overlapping(&self, query: &SpanGroup, layer: Layer) -> Vec<&SpanGroup> {
        match self.layers.get(&layer) {
            Some(c) => c
                .index
                .overlapping_group(query)
                .into_iter()
                .map(|i| &c.groups[i])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Text covered by a span, by character offsets. Out-of-range offsets are
    /// clamped to the document text.
    pub fn slice(&self, span: &Span) -> &str {
        let last = self.char_offsets.len().saturating_sub(1);
        let start = self.char_offsets.get(span.start.min(last)).copied().unwrap_or(0);
        let end = self.char_offsets.get(span.end.min(last)).copied().unwrap_or(0);
        if start >= end {
            return "";
        }
        &self.symbols[start..end]
    }

    /// Text of a single group: its cached text, else its spans' text.
    pub fn text_of(&self, group: &SpanGroup) -> String {
        match &group.text {
            Some(text) => text.clone(),
            None => group
                .spans
                .iter()
                .map(|s| self.slice(s))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Text of the words overlapping `group`, joined by single spaces.
    pub fn words_text(&self, group: &SpanGroup) -> String {
        self.find_overlapping(group, Layer::Words)
            .into_iter()
            .map(|w| self.text_of(w))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Reject malformed input before any algorithm runs: every group in every
    /// layer must have at least one span and no span may be inverted.
    pub fn validate(&self) -> Result<()> {
        for (layer, collection) in &self.layers {
            for (i, group) in collection.groups.iter().enumerate() {
                group.validate(&format!("{}[{}]", layer, i))?;
            }
        }
        Ok(())
    }

    /// Load a document from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Dump the document, including any typed layers, as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Serialized form of a [`Document`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DocumentData {
    #[serde(default)]
    symbols: String,
    #[serde(default)]
    words: Vec<SpanGroup>,
    #[serde(default)]
    sents: Vec<SpanGroup>,
    #[serde(default)]
    blocks: Vec<SpanGroup>,
    #[serde(default)]
    pages: Vec<SpanGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typed_blocks: Option<Vec<SpanGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typed_sents: Option<Vec<SpanGroup>>,
}

impl From<DocumentData> for Document {
    fn from(data: DocumentData) -> Self {
        let mut doc = Document::new(data.symbols)
            .with_layer(Layer::Words, data.words)
            .with_layer(Layer::Sentences, data.sents)
            .with_layer(Layer::Blocks, data.blocks)
            .with_layer(Layer::Pages, data.pages);
        if let Some(typed_blocks) = data.typed_blocks {
            doc.attach(Layer::TypedBlocks, typed_blocks);
        }
        if let Some(typed_sents) = data.typed_sents {
            doc.attach(Layer::TypedSentences, typed_sents);
        }
        doc
    }
}

impl From<Document> for DocumentData {
    fn from(mut doc: Document) -> Self {
        let mut take = |layer: Layer| doc.layers.shift_remove(&layer).map(|c| c.groups);
        let words = take(Layer::Words).unwrap_or_default();
        let sents = take(Layer::Sentences).unwrap_or_default();
        let blocks = take(Layer::Blocks).unwrap_or_default();
        let pages = take(Layer::Pages).unwrap_or_default();
        let typed_blocks = take(Layer::TypedBlocks);
        let typed_sents = take(Layer::TypedSentences);
        DocumentData {
            symbols: doc.symbols,
            words,
            sents,
            blocks,
            pages,
            typed_blocks,
            typed_sents,
        }
    }
}
