//! Abstract and preamble tagging.

use crate::error::Result;
use crate::span::{Span, SpanGroup, SpanType};

use super::{BlockPass, PassContext};

/// Labels the abstract body and everything before it.
///
/// The first title whose heading prefix mentions the abstract keyword opens
/// the abstract; the heading block itself keeps its label. Every following
/// block is `Abstract` until the next title block, which ends the scan.
/// Blocks before the heading become `Preamble`. When the heading is the first
/// block but does not start at offset 0, a `Preamble` block is synthesized for
/// the uncovered leading text.
pub struct AbstractPass;

impl BlockPass for AbstractPass {
    fn apply(
        &self,
        mut blocks: Vec<SpanGroup>,
        context: &PassContext<'_>,
    ) -> Result<Vec<SpanGroup>> {
        let keyword = context.config.abstract_keyword.as_str();
        let mut heading: Option<usize> = None;

        for i in 0..blocks.len() {
            let mut is_heading = false;

            if blocks[i].layout_type() == Some(SpanType::Title) {
                if heading.is_some() {
                    break;
                }
                if context.heading_prefix(&blocks[i]).contains(keyword) {
                    log::debug!("Abstract heading found at block {}", i);
                    heading = Some(i);
                    is_heading = true;
                }
            }

            if heading.is_some() && !is_heading {
                blocks[i].kind = Some(SpanType::Abstract);
            }
        }

        match heading {
            Some(pos) if pos > 0 => {
                for block in &mut blocks[..pos] {
                    block.kind = Some(SpanType::Preamble);
                }
            },
            Some(_) if blocks[0].start() > 0 => {
                let mut preamble = SpanGroup::new(vec![Span::new(0, blocks[0].start())])
                    .with_kind(SpanType::Preamble);
                let box_group = context.merger.merge(&preamble, Some(context.document))?;
                preamble.box_group = Some(box_group);
                log::debug!("Synthesized preamble block [0, {})", blocks[0].start());
                blocks.insert(0, preamble);
            },
            Some(_) => {},
            None => log::debug!("No abstract heading found"),
        }

        Ok(blocks)
    }

    fn name(&self) -> &'static str {
        "AbstractPass"
    }
}
