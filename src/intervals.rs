//! Interval algebra over sets of half-open spans.
//!
//! [`decompose`] sweeps the boundaries of two span sets and splits the covered
//! range into maximal runs with the same membership (source only, destination
//! only, both, neither). [`intersect`] and [`contains`] are the pairwise
//! helpers the sentence typer uses to tighten a sentence to one block.
//!
//! All functions accept anything that exposes a span slice: `&[Span]`,
//! `Vec<Span>`, or a [`SpanGroup`](crate::span::SpanGroup).

use crate::error::Result;
use crate::span::Span;

/// Membership of a segment produced by [`decompose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentTag {
    /// Covered by neither input (a hole between covered runs)
    Neither,
    /// Covered by the source only
    SrcOnly,
    /// Covered by the destination only
    DstOnly,
    /// Covered by both inputs
    Both,
}

impl SegmentTag {
    /// Tag for a point covered `src` times by the source and `dst` times by the
    /// destination.
    pub fn from_coverage(src: i64, dst: i64) -> Self {
        match (src > 0, dst > 0) {
            (false, false) => SegmentTag::Neither,
            (true, false) => SegmentTag::SrcOnly,
            (false, true) => SegmentTag::DstOnly,
            (true, true) => SegmentTag::Both,
        }
    }
}

/// The four buckets of a decomposition. Spans within a bucket are in
/// document order and never overlap spans of any bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segments {
    /// Portions covered by the source only
    pub src_only: Vec<Span>,
    /// Portions covered by the destination only
    pub dst_only: Vec<Span>,
    /// Portions covered by both
    pub both: Vec<Span>,
    /// Holes inside the overall range covered by neither
    pub neither: Vec<Span>,
}

impl Segments {
    /// The bucket holding segments with the given tag.
    pub fn bucket(&self, tag: SegmentTag) -> &[Span] {
        match tag {
            SegmentTag::Neither => &self.neither,
            SegmentTag::SrcOnly => &self.src_only,
            SegmentTag::DstOnly => &self.dst_only,
            SegmentTag::Both => &self.both,
        }
    }

    fn bucket_mut(&mut self, tag: SegmentTag) -> &mut Vec<Span> {
        match tag {
            SegmentTag::Neither => &mut self.neither,
            SegmentTag::SrcOnly => &mut self.src_only,
            SegmentTag::DstOnly => &mut self.dst_only,
            SegmentTag::Both => &mut self.both,
        }
    }

    /// All segments with their tags, sorted by start offset.
    pub fn tagged(&self) -> Vec<(SegmentTag, Span)> {
        let mut all: Vec<(SegmentTag, Span)> = [
            SegmentTag::Neither,
            SegmentTag::SrcOnly,
            SegmentTag::DstOnly,
            SegmentTag::Both,
        ]
        .iter()
        .flat_map(|&tag| self.bucket(tag).iter().map(move |s| (tag, *s)))
        .collect();
        all.sort_by_key(|(_, s)| s.start);
        all
    }
}

/// Split two span sets into maximal same-membership runs.
///
/// Every distinct start/end offset becomes a sweep boundary. Each elementary
/// gap between consecutive boundaries is tagged by whether source and/or
/// destination spans cover it, and adjacent gaps with the same tag are merged.
///
/// # Errors
///
/// Returns [`Error::InvalidSpan`](crate::error::Error::InvalidSpan) if any input
/// span has `start > end`.
///
/// # Examples
///
/// ```
/// use pdf_sents::intervals::decompose;
/// use pdf_sents::span::Span;
///
/// let segments = decompose(&[Span::new(0, 5)], &[Span::new(3, 8)]).unwrap();
/// assert_eq!(segments.src_only, vec![Span::new(0, 3)]);
/// assert_eq!(segments.both, vec![Span::new(3, 5)]);
/// assert_eq!(segments.dst_only, vec![Span::new(5, 8)]);
/// assert!(segments.neither.is_empty());
/// ```
pub fn decompose<S, D>(src: &S, dst: &D) -> Result<Segments>
where
    S: AsRef<[Span]> + ?Sized,
    D: AsRef<[Span]> + ?Sized,
{
    let src = src.as_ref();
    let dst = dst.as_ref();
    validate_all(src)?;
    validate_all(dst)?;

    let mut boundaries: Vec<usize> = src
        .iter()
        .chain(dst.iter())
        .flat_map(|s| [s.start, s.end])
        .collect();
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut segments = Segments::default();
    if boundaries.len() < 2 {
        return Ok(segments);
    }

    // gap k covers [boundaries[k], boundaries[k + 1])
    let gaps = boundaries.len() - 1;
    let src_cover = coverage(src, &boundaries);
    let dst_cover = coverage(dst, &boundaries);
    let tags: Vec<SegmentTag> = (0..gaps)
        .map(|k| SegmentTag::from_coverage(src_cover[k], dst_cover[k]))
        .collect();

    let mut i = 0;
    while i < gaps {
        let mut j = i;
        while j < gaps && tags[j] == tags[i] {
            j += 1;
        }
        // j <= gaps, so the final run closes on the last boundary
        let run = Span::new(boundaries[i], boundaries[j]);
        segments.bucket_mut(tags[i]).push(run);
        i = j;
    }

    Ok(segments)
}

/// Per-gap coverage counts for one span set, via a difference array.
fn coverage(spans: &[Span], boundaries: &[usize]) -> Vec<i64> {
    let mut delta = vec![0i64; boundaries.len()];
    for span in spans.iter().filter(|s| !s.is_empty()) {
        let first = boundaries.partition_point(|&b| b < span.start);
        let last = boundaries.partition_point(|&b| b < span.end);
        delta[first] += 1;
        delta[last] -= 1;
    }

    let mut running = 0;
    delta
        .iter()
        .map(|d| {
            running += d;
            running
        })
        .collect()
}

fn validate_all(spans: &[Span]) -> Result<()> {
    spans.iter().try_for_each(Span::validate)
}

/// True iff every span of `candidate` lies entirely inside a single span of
/// `container`. Coverage spliced from two adjacent container spans does not
/// count.
///
/// # Examples
///
/// ```
/// use pdf_sents::intervals::contains;
/// use pdf_sents::span::Span;
///
/// let block = [Span::new(0, 10), Span::new(10, 20)];
/// assert!(contains(&block, &[Span::new(2, 8)]));
/// assert!(!contains(&block, &[Span::new(5, 15)]));
/// ```
pub fn contains<C, M>(container: &C, candidate: &M) -> bool
where
    C: AsRef<[Span]> + ?Sized,
    M: AsRef<[Span]> + ?Sized,
{
    let container = container.as_ref();
    candidate
        .as_ref()
        .iter()
        .all(|c| container.iter().any(|outer| outer.covers(c)))
}

/// Pairwise intersection of two span sets.
///
/// Every pair of spans that overlaps or merely touches emits
/// `[max(starts), min(ends))`. Touching pairs therefore produce zero-length
/// spans; callers downstream rely on that boundary behavior.
///
/// # Examples
///
/// ```
/// use pdf_sents::intervals::intersect;
/// use pdf_sents::span::Span;
///
/// let block = [Span::new(100, 120)];
/// let sentence = [Span::new(110, 140)];
/// assert_eq!(intersect(&block, &sentence).unwrap(), vec![Span::new(110, 120)]);
/// ```
pub fn intersect<A, B>(a: &A, b: &B) -> Result<Vec<Span>>
where
    A: AsRef<[Span]> + ?Sized,
    B: AsRef<[Span]> + ?Sized,
{
    let a = a.as_ref();
    let b = b.as_ref();
    validate_all(a)?;
    validate_all(b)?;

    let mut out = Vec::new();
    for sa in a {
        for sb in b {
            if sa.touches(sb) {
                out.push(Span::new(sa.start.max(sb.start), sa.end.min(sb.end)));
            }
        }
    }
    Ok(out)
}

/// Portions of `a` not covered by `b`.
pub fn difference<A, B>(a: &A, b: &B) -> Result<Vec<Span>>
where
    A: AsRef<[Span]> + ?Sized,
    B: AsRef<[Span]> + ?Sized,
{
    Ok(decompose(a, b)?.src_only)
}
