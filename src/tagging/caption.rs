//! Caption tagging.

use regex::Regex;

use crate::config::TaggerConfig;
use crate::error::Result;
use crate::span::{SpanGroup, SpanType};

use super::{BlockPass, PassContext};

/// Labels `Title`/`Text` blocks that open like "Figure 3:" or "Table 2b:" as
/// `Caption`.
///
/// Stateless: each block is judged on its own text prefix, so running the
/// pass twice gives the same labels.
pub struct CaptionPass {
    patterns: Vec<Regex>,
}

impl CaptionPass {
    /// Compile one anchored pattern per configured caption label.
    pub fn new(config: &TaggerConfig) -> Result<Self> {
        let patterns = config
            .caption_labels
            .iter()
            .map(|label| Regex::new(&caption_pattern(label)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// True if `prefix` opens with a caption label.
    pub fn is_caption(&self, prefix: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(prefix))
    }
}

/// Pattern for a caption label; only the leading letter is case-insensitive.
///
/// `"Table"` becomes `^[Tt]able\s\d+[a-z]?:`.
fn caption_pattern(label: &str) -> String {
    let mut chars = label.chars();
    let head = match chars.next() {
        Some(c) => format!(
            "[{}{}]",
            regex::escape(&c.to_uppercase().to_string()),
            regex::escape(&c.to_lowercase().to_string())
        ),
        None => String::new(),
    };
    format!(r"^{}{}\s\d+[a-z]?:", head, regex::escape(chars.as_str()))
}

impl BlockPass for CaptionPass {
    fn apply(
        &self,
        mut blocks: Vec<SpanGroup>,
        context: &PassContext<'_>,
    ) -> Result<Vec<SpanGroup>> {
        let window = context.config.caption_window;

        for block in blocks.iter_mut() {
            if !matches!(
                block.layout_type(),
                Some(SpanType::Title) | Some(SpanType::Text)
            ) {
                continue;
            }
            let prefix: String = context.block_text(block).chars().take(window).collect();
            if self.is_caption(&prefix) {
                log::trace!("Caption block at {}: {:?}", block.start(), prefix);
                block.kind = Some(SpanType::Caption);
            }
        }

        Ok(blocks)
    }

    fn name(&self) -> &'static str {
        "CaptionPass"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::geometry::BoxMerger;
    use crate::tagging::testing::{doc_with_blocks, kinds};

    fn run(doc: &Document, blocks: Vec<SpanGroup>, config: &TaggerConfig) -> Vec<SpanGroup> {
        let context = PassContext::new(doc, config, BoxMerger::default());
        CaptionPass::new(config).unwrap().apply(blocks, &context).unwrap()
    }

    #[test]
    fn test_caption_pattern() {
        assert_eq!(caption_pattern("Table"), r"^[Tt]able\s\d+[a-z]?:");
    }

    #[test]
    fn test_is_caption() {
        let pass = CaptionPass::new(&TaggerConfig::default()).unwrap();
        assert!(pass.is_caption("Figure 1: Overview"));
        assert!(pass.is_caption("table 12b: Results"));
        assert!(!pass.is_caption("FIGURE 1: Overview"));
        assert!(!pass.is_caption("Figure 1 shows"));
        assert!(!pass.is_caption("See Figure 1: left"));
        assert!(!pass.is_caption("Figure 1AB: x"));
    }

    #[test]
    fn test_relabels_title_and_text_only() {
        let (doc, blocks) = doc_with_blocks(
            0,
            &[
                ("Figure 1: A plot.", SpanType::Text),
                ("Table 2: Numbers.", SpanType::Title),
                ("Figure 3: Inside.", SpanType::Figure),
                ("Plain text.", SpanType::Text),
            ],
        );
        let config = TaggerConfig::default();
        let out = run(&doc, blocks, &config);
        assert_eq!(
            kinds(&out),
            vec![
                SpanType::Caption,
                SpanType::Caption,
                SpanType::Figure,
                SpanType::Text
            ]
        );
    }

    #[test]
    fn test_idempotent() {
        let (doc, blocks) = doc_with_blocks(
            0,
            &[
                ("Figure 1: A plot.", SpanType::Text),
                ("Body.", SpanType::Text),
            ],
        );
        let config = TaggerConfig::default();
        let once = run(&doc, blocks, &config);
        let twice = run(&doc, once.clone(), &config);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_labels() {
        let (doc, blocks) = doc_with_blocks(0, &[("Algorithm 1: Sweep.", SpanType::Text)]);
        let config = TaggerConfig::default().with_caption_labels(["Algorithm"]);
        let out = run(&doc, blocks, &config);
        assert_eq!(kinds(&out), vec![SpanType::Caption]);
    }
}
