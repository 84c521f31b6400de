//! Typed sentence segmentation pipeline.
//!
//! ```text
//! Document (words, sents, blocks)
//!     ↓
//! [validate]            reject empty groups and inverted spans
//!     ↓
//! [merge_small_caps]    repair split small-caps words (optional)
//!     ↓
//! [BlockTagger]         blocks → typed_blocks
//!     ↓
//! [SentenceTyper]       sents × typed_blocks → typed_sents
//!     ↓
//! Document (+ typed_blocks, typed_sents)
//! ```
//!
//! All settings live in one [`PipelineConfig`].

use crate::config::PipelineConfig;
use crate::document::{Document, Layer};
use crate::error::Result;
use crate::geometry::BoxMerger;
use crate::output::PaperSentences;
use crate::sentences::SentenceTyper;
use crate::span::SpanGroup;
use crate::tagging::BlockTagger;
use crate::words::merge_small_caps;

/// Orchestrates word repair, block tagging and sentence typing.
pub struct SentencePipeline {
    config: PipelineConfig,
    tagger: BlockTagger,
    typer: SentenceTyper,
}

impl SentencePipeline {
    /// Create a pipeline with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline with custom configuration.
    ///
    /// # Errors
    ///
    /// Fails if a configured caption label does not compile to a pattern.
    pub fn with_config(config: PipelineConfig) -> Result<Self> {
        let merger = BoxMerger::new(config.box_merge);
        let tagger = BlockTagger::new(config.tagger.clone())?.with_merger(merger);
        let typer = SentenceTyper::new(merger).with_text(config.add_text);
        Ok(Self {
            config,
            tagger,
            typer,
        })
    }

    /// Attach `typed_blocks` and `typed_sents` to `document`.
    ///
    /// The document must carry blocks and sentences; words are optional but
    /// supply all text and geometry. Re-running replaces the typed layers.
    ///
    /// If the small-caps repair merges any words, the words layer is replaced
    /// by the repaired words, each carrying its text and a renumbered id.
    /// Otherwise the words layer is left untouched.
    pub fn process(&self, document: &mut Document) -> Result<()> {
        document.require(Layer::Blocks)?;
        document.require(Layer::Sentences)?;
        document.validate()?;

        if self.config.merge_small_caps && document.has_layer(Layer::Words) {
            let words = merge_small_caps(with_word_text(document));
            if words.len() < document.words().len() {
                document.attach(Layer::Words, words);
            }
        }

        let typed_blocks = self.tagger.tag(document)?;
        document.attach(Layer::TypedBlocks, typed_blocks);

        let typed_sents = self.typer.assign(document)?;
        document.attach(Layer::TypedSentences, typed_sents);
        Ok(())
    }

    /// Process `document` and collect its sentence records.
    pub fn sentences(
        &self,
        document: &mut Document,
        docid: Option<String>,
    ) -> Result<PaperSentences> {
        self.process(document)?;
        PaperSentences::from_document(document, docid)
    }

    /// Get the current configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

/// Words with missing text filled from the document text.
fn with_word_text(document: &Document) -> Vec<SpanGroup> {
    document
        .words()
        .iter()
        .map(|word| {
            let mut word = word.clone();
            if word.text.is_none() {
                word.text = Some(document.text_of(&word));
            }
            word
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::geometry::{BoxGroup, PageBox};
    use crate::span::{Span, SpanType};

    fn word(start: usize, end: usize, height: f32) -> SpanGroup {
        SpanGroup::new(vec![
            Span::new(start, end).with_box(PageBox::new(0.1, 0.1, 0.05, height, 0))
        ])
    }

    fn paper() -> Document {
        // "ABSTRACT We win." with "ABSTRACT" split into "A" + "BSTRACT"
        Document::new("ABSTRACT We win.")
            .with_layer(
                Layer::Words,
                vec![
                    word(0, 1, 0.012),
                    word(1, 8, 0.009),
                    word(9, 11, 0.009),
                    word(12, 16, 0.009),
                ],
            )
            .with_layer(
                Layer::Blocks,
                vec![
                    SpanGroup::new(vec![Span::new(0, 8)])
                        .with_box_group(BoxGroup::new(vec![], Some(SpanType::Title))),
                    SpanGroup::new(vec![Span::new(9, 16)])
                        .with_box_group(BoxGroup::new(vec![], Some(SpanType::Text))),
                ],
            )
            .with_layer(
                Layer::Sentences,
                vec![
                    SpanGroup::new(vec![Span::new(0, 8)]),
                    SpanGroup::new(vec![Span::new(9, 16)]),
                ],
            )
    }

    #[test]
    fn test_process_attaches_typed_layers() {
        let mut doc = paper();
        SentencePipeline::new().unwrap().process(&mut doc).unwrap();

        assert_eq!(doc.words().len(), 3);
        assert_eq!(doc.words()[0].text.as_deref(), Some("ABSTRACT"));

        let blocks: Vec<Option<SpanType>> =
            doc.typed_blocks().unwrap().iter().map(|b| b.kind).collect();
        assert_eq!(blocks, vec![Some(SpanType::Title), Some(SpanType::Abstract)]);

        let sents = doc.typed_sents().unwrap();
        assert_eq!(sents.len(), 2);
        assert_eq!(sents[1].kind, Some(SpanType::Abstract));
        assert_eq!(sents[1].text.as_deref(), Some("We win."));
    }

    #[test]
    fn test_small_caps_merge_can_be_disabled() {
        let mut doc = paper();
        let config = PipelineConfig::default().with_small_caps_merge(false);
        SentencePipeline::with_config(config)
            .unwrap()
            .process(&mut doc)
            .unwrap();
        assert_eq!(doc.words().len(), 4);
    }

    #[test]
    fn test_words_untouched_without_small_caps_split() {
        let mut doc = paper();
        let words: Vec<SpanGroup> = doc
            .words()
            .iter()
            .map(|w| {
                let mut w = w.clone();
                w.spans[0].bbox = Some(PageBox::new(0.1, 0.1, 0.05, 0.009, 0));
                w
            })
            .collect();
        doc.attach(Layer::Words, words.clone());

        SentencePipeline::new().unwrap().process(&mut doc).unwrap();
        assert_eq!(doc.words(), words.as_slice());
        assert!(doc.words().iter().all(|w| w.text.is_none() && w.id.is_none()));
        assert_eq!(doc.typed_sents().unwrap()[1].text.as_deref(), Some("We win."));
    }

    #[test]
    fn test_missing_blocks() {
        let mut doc = Document::new("x").with_layer(Layer::Sentences, vec![]);
        let result = SentencePipeline::new().unwrap().process(&mut doc);
        assert!(matches!(result, Err(Error::MissingLayer(Layer::Blocks))));
    }

    #[test]
    fn test_sentences_record() {
        let mut doc = paper();
        let record = SentencePipeline::new()
            .unwrap()
            .sentences(&mut doc, Some("paper-1".into()))
            .unwrap();
        assert_eq!(record.docid, "paper-1");
        assert_eq!(record.types, vec![SpanType::Title, SpanType::Abstract]);
        assert_eq!(record.texts, vec!["ABSTRACT", "We win."]);
    }
}
