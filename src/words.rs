//! Small-caps word repair.
//!
//! Some PDFs render small capitals as a real capital followed by shrunken
//! capitals, and the tokenizer emits the two parts as separate words
//! (`"T"` + `"HE"`). Two adjacent all-caps words whose facing glyphs have
//! different heights are joined back into one word.

use lazy_static::lazy_static;
use regex::Regex;

use crate::geometry::BoxGroup;
use crate::span::SpanGroup;

lazy_static! {
    /// Leading part: optional opening punctuation, then capitals or hyphens
    static ref RE_CAPS_LEAD: Regex = Regex::new(r"^[\-\(\[]?[A-Z\-]+$").unwrap();

    /// Trailing part: capitals or hyphens, optional closing bracket and punctuation
    static ref RE_CAPS_TAIL: Regex =
        Regex::new(r"^[A-Z\-]+[\)\]]?[\-,\.\?!;:]?$").unwrap();
}

/// True if `lead` and `tail` look like one small-caps word split in two.
pub fn is_small_caps_split(lead: &SpanGroup, tail: &SpanGroup) -> bool {
    let (Some(lead_text), Some(tail_text)) = (lead.text.as_deref(), tail.text.as_deref()) else {
        return false;
    };
    if !RE_CAPS_LEAD.is_match(lead_text) || !RE_CAPS_TAIL.is_match(tail_text) {
        return false;
    }

    let lead_box = lead.spans.last().and_then(|s| s.bbox);
    let tail_box = tail.spans.first().and_then(|s| s.bbox);
    match (lead_box, tail_box) {
        (Some(a), Some(b)) => a.height != b.height,
        _ => false,
    }
}

/// Join two words; `lead` wins on type and box group label.
fn join(lead: SpanGroup, tail: SpanGroup) -> SpanGroup {
    let mut spans = lead.spans;
    spans.extend(tail.spans);

    let box_group = match (lead.box_group, tail.box_group) {
        (Some(a), Some(b)) => Some(BoxGroup::union(&a, &b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    };

    let text = format!(
        "{}{}",
        lead.text.unwrap_or_default(),
        tail.text.unwrap_or_default()
    );

    SpanGroup {
        spans,
        kind: lead.kind.or(tail.kind),
        box_group,
        text: (!text.is_empty()).then_some(text),
        id: lead.id,
    }
}

/// Single left-to-right pass merging small-caps splits.
///
/// A merged word is checked again against its new right neighbour, so a word
/// split into three parts collapses fully. Ids are renumbered to stay
/// contiguous.
pub fn merge_small_caps(words: Vec<SpanGroup>) -> Vec<SpanGroup> {
    let total = words.len();
    let mut merged: Vec<SpanGroup> = Vec::with_capacity(total);

    for word in words {
        if let Some(lead) = merged.last_mut() {
            if is_small_caps_split(lead, &word) {
                let joined = join(std::mem::take(lead), word);
                log::trace!("Merged small-caps word {:?} at {}", joined.text, joined.start());
                *lead = joined;
                continue;
            }
        }
        merged.push(word);
    }

    for (i, word) in merged.iter_mut().enumerate() {
        word.id = Some(i);
    }

    if merged.len() < total {
        log::debug!("Small-caps repair merged {} words", total - merged.len());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PageBox;
    use crate::span::{Span, SpanType};

    fn word(text: &str, start: usize, height: f32) -> SpanGroup {
        let end = start + text.chars().count();
        SpanGroup::new(vec![
            Span::new(start, end).with_box(PageBox::new(0.0, 0.1, 0.01, height, 0))
        ])
        .with_text(text)
    }

    #[test]
    fn test_detects_small_caps_split() {
        let lead = word("T", 0, 0.012);
        let tail = word("HE", 1, 0.009);
        assert!(is_small_caps_split(&lead, &tail));
    }

    #[test]
    fn test_same_height_is_not_split() {
        let lead = word("NASA", 0, 0.012);
        let tail = word("ESA", 5, 0.012);
        assert!(!is_small_caps_split(&lead, &tail));
    }

    #[test]
    fn test_lowercase_is_not_split() {
        assert!(!is_small_caps_split(&word("T", 0, 0.012), &word("he", 1, 0.009)));
        assert!(!is_small_caps_split(&word("the", 0, 0.012), &word("END", 4, 0.009)));
    }

    #[test]
    fn test_tail_punctuation_allowed() {
        assert!(is_small_caps_split(&word("(S", 0, 0.012), &word("UMMARY).", 2, 0.009)));
        assert!(!is_small_caps_split(&word("S", 0, 0.012), &word("UMMARY...", 1, 0.009)));
    }

    #[test]
    fn test_missing_text_or_boxes_never_merge() {
        let no_text = SpanGroup::new(vec![Span::new(0, 1)]);
        assert!(!is_small_caps_split(&no_text, &word("HE", 1, 0.009)));

        let no_box = SpanGroup::new(vec![Span::new(0, 1)]).with_text("T");
        assert!(!is_small_caps_split(&no_box, &word("HE", 1, 0.009)));
    }

    #[test]
    fn test_merge_renumbers_ids() {
        let words = vec![
            word("T", 0, 0.012).with_id(0),
            word("HE", 1, 0.009).with_id(1),
            word("model", 4, 0.012).with_id(2),
            word("works", 10, 0.012).with_id(3),
        ];
        let merged = merge_small_caps(words);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].text.as_deref(), Some("THE"));
        assert_eq!(merged[0].spans.len(), 2);
        assert_eq!(merged[0].start(), 0);
        assert_eq!(merged[0].end(), 3);
        let ids: Vec<Option<usize>> = merged.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn test_merged_word_rechecked_against_next() {
        // the merged word's last glyph comes from the tail, so a third part of a
        // different height joins as well
        let words = vec![
            word("A", 0, 0.012),
            word("B", 1, 0.009),
            word("C", 2, 0.012),
        ];
        let merged = merge_small_caps(words);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text.as_deref(), Some("ABC"));
    }

    #[test]
    fn test_join_box_groups_and_type() {
        let lead = word("T", 0, 0.012)
            .with_box_group(BoxGroup::new(vec![PageBox::new(0.0, 0.1, 0.01, 0.012, 0)], None))
            .with_kind(SpanType::Title);
        let tail = word("HE", 1, 0.009).with_box_group(BoxGroup::new(
            vec![PageBox::new(0.01, 0.1, 0.02, 0.009, 0)],
            Some(SpanType::Text),
        ));

        let joined = join(lead, tail);
        assert_eq!(joined.kind, Some(SpanType::Title));
        let bg = joined.box_group.unwrap();
        assert_eq!(bg.boxes.len(), 2);
        assert_eq!(bg.kind, Some(SpanType::Text));
    }
}
