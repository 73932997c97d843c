//! Data model for compiled citation tables.
//!
//! A [`FieldSet`] is one extracted paper: exactly [`FIELD_COUNT`] string
//! values in the fixed [`HEADERS`] order. Generation responses are parsed
//! into a `FieldSet` by splitting on [`DELIMITER`] and trimming each piece.

use crate::error::{CiteError, Result};
use serde::{Deserialize, Serialize};

/// Number of bibliographic fields per paper
pub const FIELD_COUNT: usize = 14;

/// Delimiter the generation service is instructed to place between fields
pub const DELIMITER: &str = "|||";

/// Sentinel the generation service substitutes for unavailable fields
pub const NOT_AVAILABLE: &str = "NA";

/// Column headers for the Excel export and HTML table, in fixed order
pub const HEADERS: [&str; FIELD_COUNT] = [
    "LINKS OF THE PAPER",
    "TITLE OF THE PAPER",
    "AUTHOR",
    "YEAR OF PAPER",
    "JOURNAL NAME",
    "IMPACT FACTOR",
    "PURPOSE OF THE PAPER",
    "TECHNIQUES USED AND PROPOSED IN THE PAPER",
    "DATASET USED",
    "ACCURACY OF THE TECHNIQUES",
    "ADVANTAGES OVER OTHER TECHNIQUES",
    "DRAWBACK OF PROPOSED TECHNIQUES",
    "CONCLUSION OF PAPER",
    "FUTURE WORK",
];

/// One paper's extracted fields, in [`HEADERS`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSet([String; FIELD_COUNT]);

impl FieldSet {
    /// Parse a raw generation response into a `FieldSet`.
    ///
    /// Splits on [`DELIMITER`] and trims surrounding whitespace from each
    /// piece. Returns [`CiteError::ShapeMismatch`] when the split does not
    /// produce exactly [`FIELD_COUNT`] pieces; the caller decides the
    /// degraded-row policy.
    pub fn parse(raw: &str) -> Result<Self> {
        let pieces: Vec<String> = raw
            .trim()
            .split(DELIMITER)
            .map(|field| field.trim().to_string())
            .collect();

        let got = pieces.len();
        let values: [String; FIELD_COUNT] = pieces
            .try_into()
            .map_err(|_| CiteError::ShapeMismatch {
                expected: FIELD_COUNT,
                got,
            })?;

        Ok(Self(values))
    }

    /// Degraded row: only the link populated, remaining fields blank.
    ///
    /// Used when extraction fails shape validation or the generation call
    /// itself fails, so one bad extraction never aborts a batch.
    pub fn degraded(link: &str) -> Self {
        let mut values: [String; FIELD_COUNT] = Default::default();
        values[0] = link.to_string();
        Self(values)
    }

    /// The link column (first field)
    pub fn link(&self) -> &str {
        &self.0[0]
    }

    /// All field values in header order
    pub fn values(&self) -> &[String] {
        &self.0
    }
}

impl From<[String; FIELD_COUNT]> for FieldSet {
    fn from(values: [String; FIELD_COUNT]) -> Self {
        Self(values)
    }
}

/// One user-submitted (link, text) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperInput {
    pub link: String,
    pub text: String,
}

impl PaperInput {
    pub fn new(link: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            text: text.into(),
        }
    }

    /// A pair blank in both fields is discarded before processing.
    pub fn is_blank(&self) -> bool {
        self.link.trim().is_empty() && self.text.trim().is_empty()
    }
}
