//! Configuration for block tagging and sentence typing.
//!
//! Every heuristic threshold the pipeline uses is enumerated here once, so
//! callers (and test suites) can override them in one place.

/// Block tagger heuristics.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggerConfig {
    /// Number of leading characters of a heading searched for a keyword.
    pub heading_window: usize,

    /// Number of leading characters of a block matched against caption patterns.
    pub caption_window: usize,

    /// Keyword marking the abstract heading (lowercase).
    pub abstract_keyword: String,

    /// Keyword marking the references heading (lowercase).
    pub references_keyword: String,

    /// Caption labels, e.g. "Table" matches `Table 3:` and `table 3b:`.
    pub caption_labels: Vec<String>,

    /// A title block fully containing at least this many sentences is body text.
    pub min_contained_sentences: usize,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TaggerConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            heading_window: 20,
            caption_window: 20,
            abstract_keyword: "abstract".to_string(),
            references_keyword: "references".to_string(),
            caption_labels: vec!["Table".to_string(), "Figure".to_string()],
            min_contained_sentences: 2,
        }
    }

    /// Set the heading keyword window.
    pub fn with_heading_window(mut self, chars: usize) -> Self {
        self.heading_window = chars;
        self
    }

    /// Set the caption window.
    pub fn with_caption_window(mut self, chars: usize) -> Self {
        self.caption_window = chars;
        self
    }

    /// Set the abstract heading keyword.
    pub fn with_abstract_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.abstract_keyword = keyword.into().to_lowercase();
        self
    }

    /// Set the references heading keyword.
    pub fn with_references_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.references_keyword = keyword.into().to_lowercase();
        self
    }

    /// Replace the caption labels.
    pub fn with_caption_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.caption_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Set the contained-sentence threshold for demoting titles to text.
    pub fn with_min_contained_sentences(mut self, count: usize) -> Self {
        self.min_contained_sentences = count;
        self
    }
}

/// Geometry merge settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxMergeConfig {
    /// Decimal places of the top coordinate used to group boxes into lines.
    pub digits: u32,
}

impl Default for BoxMergeConfig {
    fn default() -> Self {
        Self { digits: 2 }
    }
}

impl BoxMergeConfig {
    /// Set the rounding precision.
    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }
}

/// Full pipeline configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Block tagger heuristics.
    pub tagger: TaggerConfig,

    /// Geometry merge settings.
    pub box_merge: BoxMergeConfig,

    /// Repair small-caps word splits before tagging.
    pub merge_small_caps: bool,

    /// Attach text (joined from words) to emitted sentences.
    pub add_text: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            tagger: TaggerConfig::default(),
            box_merge: BoxMergeConfig::default(),
            merge_small_caps: true,
            add_text: true,
        }
    }

    /// Replace the tagger configuration.
    pub fn with_tagger(mut self, tagger: TaggerConfig) -> Self {
        self.tagger = tagger;
        self
    }

    /// Replace the geometry merge settings.
    pub fn with_box_merge(mut self, box_merge: BoxMergeConfig) -> Self {
        self.box_merge = box_merge;
        self
    }

    /// Enable or disable the small-caps word repair.
    pub fn with_small_caps_merge(mut self, enable: bool) -> Self {
        self.merge_small_caps = enable;
        self
    }

    /// Enable or disable sentence text.
    pub fn with_text(mut self, enable: bool) -> Self {
        self.add_text = enable;
        self
    }
}
