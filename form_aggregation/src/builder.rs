use std::collections::HashSet;

pub use crate::config::*;

/// A builder for collecting responses incrementally.
///
/// Use it when the answers arrive response by response instead of as one
/// flat list.
///
/// ```
/// pub use form_aggregation::builder::Builder;
/// pub use form_aggregation::{Question, QuestionKind, ReportOptions};
/// # use form_aggregation::AggregationErrors;
///
/// let questions = vec![Question {
///     id: "q1".to_string(),
///     text: "How did you hear about us?".to_string(),
///     kind: QuestionKind::ShortText,
///     options: vec![],
/// }];
///
/// let mut builder = Builder::new(&ReportOptions::DEFAULT_OPTIONS)?
///     .questions(&questions)?;
///
/// builder.add_response(&[("q1".to_string(), "a friend".to_string())])?;
/// builder.add_response(&[("q1".to_string(), "a friend".to_string())])?;
///
/// let report = builder.summarize();
/// assert_eq!(report[0].total_answers, 2);
///
/// # Ok::<(), AggregationErrors>(())
/// ```
pub struct Builder {
    pub(crate) _options: ReportOptions,
    pub(crate) _questions: Vec<Question>,
    pub(crate) _answers: Vec<Answer>,
}

impl Builder {
    pub fn new(options: &ReportOptions) -> Result<Builder, AggregationErrors> {
        Ok(Builder {
            _options: options.clone(),
            _questions: Vec::new(),
            _answers: Vec::new(),
        })
    }

    /// Declares the question catalog. Question ids must be unique.
    pub fn questions(self, questions: &[Question]) -> Result<Builder, AggregationErrors> {
        let mut seen: HashSet<&str> = HashSet::new();
        for q in questions.iter() {
            if !seen.insert(q.id.as_str()) {
                return Err(AggregationErrors::DuplicateQuestionId(q.id.clone()));
            }
        }
        Ok(Builder {
            _options: self._options,
            _questions: questions.to_vec(),
            _answers: Vec::new(),
        })
    }

    /// Adds one submitted response: the (question id, raw value) pairs of
    /// a single submission.
    ///
    /// The pairs do not need to cover the catalog. Pairs whose id has no
    /// matching question are dropped at summary time.
    pub fn add_response(&mut self, values: &[(String, String)]) -> Result<(), AggregationErrors> {
        for (question_id, value) in values.iter() {
            self.add_answer(&Answer {
                question_id: question_id.clone(),
                value: value.clone(),
            })?;
        }
        Ok(())
    }

    pub fn add_answer(&mut self, answer: &Answer) -> Result<(), AggregationErrors> {
        self._answers.push(answer.clone());
        Ok(())
    }

    /// Aggregates everything collected so far. The builder is left
    /// untouched and can keep accumulating.
    pub fn summarize(&self) -> Vec<AggregatedQuestion> {
        crate::aggregate(&self._questions, &self._answers, &self._options)
    }
}
