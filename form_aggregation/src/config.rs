// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The declared type of a question, drawn from a closed set of tags.
///
/// The canonical wire tags are the SCREAMING_SNAKE_CASE strings
/// (`SHORT_TEXT`, `NUMBER`, ...). Any other tag is carried through the
/// [`Unknown`](QuestionKind::Unknown) fallback so that reports can echo it
/// unchanged instead of failing.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum QuestionKind {
    /// One-line free text.
    ShortText,
    /// Multi-line free text. Aggregated the same way as short text.
    LongText,
    Number,
    /// Numeric scale (stars, 1-10, ...). Aggregated like `Number`.
    Rating,
    SingleChoice,
    Dropdown,
    /// Several options may be selected. The raw answer value is a
    /// JSON-encoded array of the selected option strings.
    MultipleChoice,
    /// The raw answer value is the literal string `"true"` or `"false"`.
    Boolean,
    /// A tag outside the closed set, kept verbatim.
    Unknown(String),
}

impl QuestionKind {
    /// Maps a wire tag to its kind. The match is exact: the uppercase tags
    /// are the sole contract, and anything else (including lowercase
    /// spellings) is `Unknown`.
    pub fn from_tag(tag: &str) -> QuestionKind {
        match tag {
            "SHORT_TEXT" => QuestionKind::ShortText,
            "LONG_TEXT" => QuestionKind::LongText,
            "NUMBER" => QuestionKind::Number,
            "RATING" => QuestionKind::Rating,
            "SINGLE_CHOICE" => QuestionKind::SingleChoice,
            "DROPDOWN" => QuestionKind::Dropdown,
            "MULTIPLE_CHOICE" => QuestionKind::MultipleChoice,
            "BOOLEAN" => QuestionKind::Boolean,
            _ => QuestionKind::Unknown(tag.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            QuestionKind::ShortText => "SHORT_TEXT",
            QuestionKind::LongText => "LONG_TEXT",
            QuestionKind::Number => "NUMBER",
            QuestionKind::Rating => "RATING",
            QuestionKind::SingleChoice => "SINGLE_CHOICE",
            QuestionKind::Dropdown => "DROPDOWN",
            QuestionKind::MultipleChoice => "MULTIPLE_CHOICE",
            QuestionKind::Boolean => "BOOLEAN",
            QuestionKind::Unknown(tag) => tag.as_str(),
        }
    }
}

/// One question of a form template.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Question {
    /// Opaque identifier, unique within a catalog.
    pub id: String,
    /// Display label.
    pub text: String,
    pub kind: QuestionKind,
    /// The declared choices in display order. Empty for kinds that do not
    /// carry options.
    pub options: Vec<String>,
}

/// One submitted answer: the raw value recorded for a question.
///
/// Values are always strings. Structured values are string-encoded
/// (JSON array for multi-select, `"true"`/`"false"` for booleans); the
/// engine decodes them and silently excludes what does not parse.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Answer {
    pub question_id: String,
    pub value: String,
}

// ******** Output data structures *********

/// Summary of the parseable numeric answers to one question.
#[derive(PartialEq, Debug, Clone)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    /// Arithmetic mean, rounded to 2 decimal places (half up).
    pub average: f64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BooleanStats {
    pub true_count: u64,
    pub false_count: u64,
}

/// The kind-specific statistics of an aggregated question.
#[derive(PartialEq, Debug, Clone)]
pub enum QuestionStats {
    /// `NUMBER` and `RATING`. `None` when no answer could be parsed as a
    /// number: the absence of the summary signals "no numeric data", which
    /// is distinct from a summary of zeros.
    Numeric(Option<NumericStats>),
    /// Free-text and single-select kinds: the most popular answers as
    /// (answer, count) pairs, descending by count. Equal counts keep the
    /// order in which the answers were first seen.
    Frequency(Vec<(String, u64)>),
    Boolean(BooleanStats),
    /// Unknown question kinds carry no statistics.
    Unavailable,
}

/// The aggregation result for one question. Common fields are echoed from
/// the input question; `total_answers` counts every raw answer received,
/// independent of whether it contributed to the statistics.
#[derive(PartialEq, Debug, Clone)]
pub struct AggregatedQuestion {
    pub question_id: String,
    pub text: String,
    pub kind: QuestionKind,
    pub options: Vec<String>,
    pub total_answers: u64,
    pub stats: QuestionStats,
}

/// Errors raised while assembling an aggregation input.
///
/// The aggregation itself never fails: malformed values degrade to
/// exclusion from the relevant statistic.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AggregationErrors {
    DuplicateQuestionId(String),
}

impl Error for AggregationErrors {}

impl Display for AggregationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregationErrors::DuplicateQuestionId(id) => {
                write!(f, "duplicate question id in catalog: {}", id)
            }
        }
    }
}

// ********* Configuration **********

/// The options that govern report shaping.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReportOptions {
    /// Number of entries kept in the popular-answer rankings.
    pub popular_answer_limit: usize,
}

impl ReportOptions {
    pub const DEFAULT_OPTIONS: ReportOptions = ReportOptions {
        popular_answer_limit: 5,
    };
}
