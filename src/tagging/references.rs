//! References tagging.

use crate::error::Result;
use crate::span::{SpanGroup, SpanType};

use super::{BlockPass, PassContext};

/// Labels the reference list and everything after it `ReferencesAppendix`.
///
/// A `Title` or `List` block whose heading prefix mentions the references
/// keyword starts the section. Title headings keep their label; list-typed
/// headings are relabeled with the rest, since layout detection often
/// misreads a references heading as a list item. There is no end condition:
/// appendices and any trailing material are swept into the section.
pub struct ReferencesPass;

impl BlockPass for ReferencesPass {
    fn apply(
        &self,
        mut blocks: Vec<SpanGroup>,
        context: &PassContext<'_>,
    ) -> Result<Vec<SpanGroup>> {
        let keyword = context.config.references_keyword.as_str();
        let mut in_references = false;

        for (i, block) in blocks.iter_mut().enumerate() {
            let layout = block.layout_type();
            let mut is_heading = false;

            if matches!(layout, Some(SpanType::Title) | Some(SpanType::List))
                && context.heading_prefix(block).contains(keyword)
            {
                if !in_references {
                    log::debug!("References heading found at block {}", i);
                }
                in_references = true;
                is_heading = layout == Some(SpanType::Title);
            }

            if in_references && !is_heading {
                block.kind = Some(SpanType::ReferencesAppendix);
            }
        }

        Ok(blocks)
    }

    fn name(&self) -> &'static str {
        "ReferencesPass"
    }
}
