//! Block tagging: assign a semantic type to every layout block.
//!
//! Raw blocks arrive pre-classified by layout detection (`Text`, `Title`,
//! `List`, `Table`, `Figure`, `Other`; the label lives on the block's box
//! group). Tagging runs in two stages:
//!
//! ```text
//! raw blocks
//!     ↓
//! [initial typing]   titles holding several full sentences become Text
//!     ↓
//! [AbstractPass]     Abstract / Preamble
//!     ↓
//! [ReferencesPass]   ReferencesAppendix
//!     ↓
//! [CaptionPass]      Caption
//!     ↓
//! typed blocks
//! ```
//!
//! Each pass consumes the block list and returns a relabeled one, so passes
//! compose in a fixed order and later passes override earlier labels.

mod abstract_section;
mod caption;
mod references;

pub use abstract_section::AbstractPass;
pub use caption::CaptionPass;
pub use references::ReferencesPass;

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::TaggerConfig;
use crate::document::{Document, Layer};
use crate::error::Result;
use crate::geometry::{BoxGroup, BoxMerger};
use crate::intervals::contains;
use crate::span::{SpanGroup, SpanType};

lazy_static! {
    /// Leading section numbers such as "1. ", "2.3 " or "4.1.2 "
    static ref RE_SECTION_NUMBER: Regex = Regex::new(r"^(\d|\.)+\s+").unwrap();
}

/// A relabeling pass over the ordered block list.
pub trait BlockPass: Send + Sync {
    /// Relabel blocks, returning the new list.
    ///
    /// A pass may insert blocks (the abstract pass synthesizes a preamble) but
    /// never reorders them.
    fn apply(&self, blocks: Vec<SpanGroup>, context: &PassContext<'_>) -> Result<Vec<SpanGroup>>;

    /// Return the name of this pass for debugging.
    fn name(&self) -> &'static str;
}

/// Read-only inputs shared by all passes.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    /// Document supplying words and geometry
    pub document: &'a Document,
    /// Heuristic thresholds
    pub config: &'a TaggerConfig,
    /// Geometry merger for synthesized blocks
    pub merger: BoxMerger,
}

impl<'a> PassContext<'a> {
    /// Create a context over a document.
    pub fn new(document: &'a Document, config: &'a TaggerConfig, merger: BoxMerger) -> Self {
        Self {
            document,
            config,
            merger,
        }
    }

    /// Block text, joined from the words it overlaps.
    pub fn block_text(&self, block: &SpanGroup) -> String {
        self.document.words_text(block)
    }

    /// Normalized heading prefix: section numbers stripped, lowercased, cut to
    /// the heading window.
    pub fn heading_prefix(&self, block: &SpanGroup) -> String {
        normalize_heading(&self.block_text(block), self.config.heading_window)
    }
}

/// Strip a leading section number, lowercase, and keep the first `window` chars.
///
/// # Examples
///
/// ```
/// use pdf_sents::tagging::normalize_heading;
///
/// assert_eq!(normalize_heading("2.1 Related Work", 20), "related work");
/// assert_eq!(normalize_heading("References and Notes", 10), "references");
/// ```
pub fn normalize_heading(text: &str, window: usize) -> String {
    RE_SECTION_NUMBER
        .replace(text, "")
        .to_lowercase()
        .chars()
        .take(window)
        .collect()
}

/// Create the default pass sequence for a configuration.
pub fn create_passes(config: &TaggerConfig) -> Result<Vec<Box<dyn BlockPass>>> {
    Ok(vec![
        Box::new(AbstractPass),
        Box::new(ReferencesPass),
        Box::new(CaptionPass::new(config)?),
    ])
}

/// Turn raw layout blocks into typed blocks.
///
/// Blocks without spans are dropped. The upstream label is kept on the box
/// group; the block's own type starts equal to it, except that a `Title`
/// block fully containing enough sentences is body text mislabeled by layout
/// detection and becomes `Text`.
pub fn initial_types(document: &Document, config: &TaggerConfig) -> Vec<SpanGroup> {
    let mut typed = Vec::with_capacity(document.blocks().len());

    for block in document.blocks() {
        if block.spans.is_empty() {
            continue;
        }
        let layout = block.layout_type().or(block.kind);
        let kind = match layout {
            Some(SpanType::Title) => {
                let contained = document
                    .find_overlapping(block, Layer::Sentences)
                    .into_iter()
                    .filter(|sent| contains(block, *sent))
                    .count();
                if contained >= config.min_contained_sentences {
                    log::trace!(
                        "Title block at {} holds {} sentences, typing as Text",
                        block.start(),
                        contained
                    );
                    SpanType::Text
                } else {
                    SpanType::Title
                }
            },
            Some(kind) => kind,
            None => SpanType::Other,
        };

        let boxes = block
            .box_group
            .as_ref()
            .map(|bg| bg.boxes.clone())
            .unwrap_or_default();

        typed.push(SpanGroup {
            spans: block.spans.clone(),
            kind: Some(kind),
            box_group: Some(BoxGroup::new(boxes, layout)),
            text: None,
            id: Some(typed.len()),
        });
    }

    typed
}

/// Runs initial typing and the relabeling passes in order.
pub struct BlockTagger {
    config: TaggerConfig,
    merger: BoxMerger,
    passes: Vec<Box<dyn BlockPass>>,
}

impl BlockTagger {
    /// Create a tagger with the default passes.
    ///
    /// # Errors
    ///
    /// Fails if a configured caption label does not compile to a pattern.
    pub fn new(config: TaggerConfig) -> Result<Self> {
        let passes = create_passes(&config)?;
        Ok(Self {
            config,
            merger: BoxMerger::default(),
            passes,
        })
    }

    /// Use a specific geometry merger for synthesized blocks.
    pub fn with_merger(mut self, merger: BoxMerger) -> Self {
        self.merger = merger;
        self
    }

    /// Replace the pass sequence.
    pub fn with_passes(mut self, passes: Vec<Box<dyn BlockPass>>) -> Self {
        self.passes = passes;
        self
    }

    /// Names of the configured passes, in run order.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Type the blocks of `document`.
    ///
    /// The document is only read; the caller attaches the result as
    /// `typed_blocks`. Ids are renumbered to match the final order.
    pub fn tag(&self, document: &Document) -> Result<Vec<SpanGroup>> {
        let context = PassContext::new(document, &self.config, self.merger);

        let mut blocks = initial_types(document, &self.config);
        for pass in &self.passes {
            blocks = pass.apply(blocks, &context)?;
            log::trace!("Pass {} done over {} blocks", pass.name(), blocks.len());
        }

        for (i, block) in blocks.iter_mut().enumerate() {
            block.id = Some(i);
        }

        log::info!(
            "Typed {} blocks ({} raw)",
            blocks.len(),
            document.blocks().len()
        );
        Ok(blocks)
    }
}
