//! Per-document sentence records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::{Document, Layer};
use crate::error::Result;
use crate::span::SpanType;

/// The typed sentences of one document as parallel columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperSentences {
    /// Document identifier
    pub docid: String,
    /// Sentence texts
    #[serde(default)]
    pub texts: Vec<String>,
    /// Sentence types
    #[serde(default)]
    pub types: Vec<SpanType>,
    /// Sentence ids (emission order)
    #[serde(default)]
    pub senid: Vec<usize>,
}

impl PaperSentences {
    /// Create an empty record.
    pub fn new(docid: impl Into<String>) -> Self {
        Self {
            docid: docid.into(),
            ..Default::default()
        }
    }

    /// Append one sentence.
    pub fn add_sentence(&mut self, text: impl Into<String>, kind: SpanType, senid: usize) {
        self.texts.push(text.into());
        self.types.push(kind);
        self.senid.push(senid);
    }

    /// Collect the typed sentences of `document`.
    ///
    /// Without a `docid` a random UUID (32 hex digits) is used. Sentences
    /// without cached text take the document text under their spans.
    ///
    /// # Errors
    ///
    /// [`Error::MissingLayer`](crate::Error::MissingLayer) if the document has
    /// no typed sentences yet.
    pub fn from_document(document: &Document, docid: Option<String>) -> Result<Self> {
        let docid = docid.unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        let mut record = Self::new(docid);

        for (i, sentence) in document.require(Layer::TypedSentences)?.iter().enumerate() {
            record.add_sentence(
                document.text_of(sentence),
                sentence.kind.unwrap_or(SpanType::Other),
                sentence.id.unwrap_or(i),
            );
        }
        Ok(record)
    }

    /// Number of sentences.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// True if there are no sentences.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// One-line JSON form, suitable for a `.jsonl` file.
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the one-line JSON form.
    pub fn from_json_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}
