mod config;
pub mod builder;
pub mod manual;
pub mod quick_start;

use log::{debug, info};

use std::collections::HashMap;

pub use crate::config::*;

// **** Private structures ****

/// Frequency table that remembers the order in which distinct values were
/// first seen. The ranking step relies on that order to break ties.
#[derive(Debug, Clone, Default)]
struct FrequencyTable {
    // Slot of each distinct value in `entries`.
    slots: HashMap<String, usize>,
    entries: Vec<(String, u64)>,
}

impl FrequencyTable {
    fn record(&mut self, value: &str) {
        match self.slots.get(value) {
            Some(&idx) => {
                self.entries[idx].1 += 1;
            }
            None => {
                self.slots.insert(value.to_string(), self.entries.len());
                self.entries.push((value.to_string(), 1));
            }
        }
    }

    /// The top entries by count, at most `limit` of them.
    ///
    /// The sort is required to be stable: entries with equal counts stay in
    /// first-seen order, which keeps the ranking deterministic.
    fn into_ranked(mut self, limit: usize) -> Vec<(String, u64)> {
        self.entries
            .sort_by_key(|(_, count)| std::cmp::Reverse(*count));
        self.entries.truncate(limit);
        self.entries
    }
}

// **** Decoding of the raw string values ****
// All the string-encoded formats are decoded here, before any statistic is
// computed. `None` marks a value as unparseable; the summarizers decide what
// exclusion means for their statistic.

/// Decodes a raw value of a numeric question. Values are trimmed first;
/// empty strings and non-finite parses do not count as numbers.
fn parse_numeric_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|x| x.is_finite())
}

/// Decodes a raw multi-select value: a JSON-encoded array of selections.
/// Returns `None` when the value is not valid JSON or not an array.
/// Non-string elements are kept under their compact JSON rendering.
fn parse_selection_list(raw: &str) -> Option<Vec<String>> {
    let items: Vec<serde_json::Value> = serde_json::from_str(raw).ok()?;
    Some(
        items
            .iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    )
}

/// Decodes a raw boolean value. The match is exact: anything but the
/// literal strings `"true"` and `"false"` is unparseable.
fn parse_boolean_value(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Rounds to 2 decimal places, half up.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// **** Per-kind summarizers ****

fn summarize_numeric(raw_values: &[&str]) -> Option<NumericStats> {
    let parsed: Vec<f64> = raw_values
        .iter()
        .filter_map(|v| parse_numeric_value(v))
        .collect();
    let first = *parsed.first()?;
    let mut min = first;
    let mut max = first;
    let mut sum = 0.0;
    for &x in parsed.iter() {
        if x < min {
            min = x;
        }
        if x > max {
            max = x;
        }
        sum += x;
    }
    Some(NumericStats {
        min,
        max,
        average: round2(sum / parsed.len() as f64),
    })
}

fn summarize_frequency(raw_values: &[&str], limit: usize) -> Vec<(String, u64)> {
    let mut table = FrequencyTable::default();
    for v in raw_values.iter() {
        table.record(v);
    }
    table.into_ranked(limit)
}

fn summarize_selections(raw_values: &[&str], limit: usize) -> Vec<(String, u64)> {
    let mut table = FrequencyTable::default();
    for raw in raw_values.iter() {
        match parse_selection_list(raw) {
            Some(selections) => {
                for s in selections.iter() {
                    table.record(s);
                }
            }
            None => {
                // The whole answer is skipped for counting. It still counted
                // as a received answer.
                debug!(
                    "summarize_selections: skipping unparseable value {:?}",
                    raw
                );
            }
        }
    }
    table.into_ranked(limit)
}

fn summarize_boolean(raw_values: &[&str]) -> BooleanStats {
    let mut stats = BooleanStats {
        true_count: 0,
        false_count: 0,
    };
    for raw in raw_values.iter() {
        match parse_boolean_value(raw) {
            Some(true) => stats.true_count += 1,
            Some(false) => stats.false_count += 1,
            None => {
                debug!("summarize_boolean: skipping unparseable value {:?}", raw);
            }
        }
    }
    stats
}

// **** Public entry points ****

/// Aggregates one question against the raw values collected for it.
///
/// `raw_values` is expected in encounter order: the ranking of equally
/// popular answers follows the order in which distinct values first appear.
/// This is the entry point for callers that already hold the answers
/// grouped by question; [`aggregate`] does the grouping for flat answer
/// lists.
pub fn aggregate_question(
    question: &Question,
    raw_values: &[&str],
    options: &ReportOptions,
) -> AggregatedQuestion {
    let stats = match &question.kind {
        QuestionKind::Number | QuestionKind::Rating => {
            QuestionStats::Numeric(summarize_numeric(raw_values))
        }
        QuestionKind::ShortText
        | QuestionKind::LongText
        | QuestionKind::SingleChoice
        | QuestionKind::Dropdown => QuestionStats::Frequency(summarize_frequency(
            raw_values,
            options.popular_answer_limit,
        )),
        QuestionKind::MultipleChoice => QuestionStats::Frequency(summarize_selections(
            raw_values,
            options.popular_answer_limit,
        )),
        QuestionKind::Boolean => QuestionStats::Boolean(summarize_boolean(raw_values)),
        QuestionKind::Unknown(_) => QuestionStats::Unavailable,
    };
    AggregatedQuestion {
        question_id: question.id.clone(),
        text: question.text.clone(),
        kind: question.kind.clone(),
        options: question.options.clone(),
        total_answers: raw_values.len() as u64,
        stats,
    }
}

/// Runs the aggregation over a full template.
///
/// Arguments:
/// * `questions` the catalog, in display order
/// * `answers` the flattened answers of every response for the template
/// * `options` the shaping options (see [`ReportOptions::DEFAULT_OPTIONS`])
///
/// Produces exactly one [`AggregatedQuestion`] per input question, in the
/// input order. The relative order of the answers of one question drives
/// the tie-break of its popular-answer ranking; order across questions is
/// irrelevant. Answers pointing at a question id absent from the catalog
/// are dropped.
///
/// This function never fails, mutates nothing and has no side effect
/// beyond logging. A question without answers still produces a result with
/// `total_answers = 0`.
pub fn aggregate(
    questions: &[Question],
    answers: &[Answer],
    options: &ReportOptions,
) -> Vec<AggregatedQuestion> {
    info!(
        "aggregate: processing {:?} answers over {:?} questions",
        answers.len(),
        questions.len()
    );

    let slots: HashMap<&str, usize> = questions
        .iter()
        .enumerate()
        .map(|(idx, q)| (q.id.as_str(), idx))
        .collect();

    let mut grouped: Vec<Vec<&str>> = vec![Vec::new(); questions.len()];
    let mut dropped: u64 = 0;
    for a in answers.iter() {
        match slots.get(a.question_id.as_str()) {
            Some(&idx) => grouped[idx].push(a.value.as_str()),
            None => {
                debug!(
                    "aggregate: no question {:?} in catalog, dropping answer",
                    a.question_id
                );
                dropped += 1;
            }
        }
    }
    if dropped > 0 {
        info!(
            "aggregate: dropped {:?} answers without a matching question",
            dropped
        );
    }

    questions
        .iter()
        .zip(grouped.iter())
        .map(|(q, values)| {
            let agg = aggregate_question(q, values, options);
            debug!("aggregate: question {:?}: {:?}", q.id, agg.stats);
            agg
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, kind: QuestionKind) -> Question {
        Question {
            id: id.to_string(),
            text: format!("Question {}", id),
            kind,
            options: Vec::new(),
        }
    }

    fn answers(question_id: &str, values: &[&str]) -> Vec<Answer> {
        values
            .iter()
            .map(|v| Answer {
                question_id: question_id.to_string(),
                value: v.to_string(),
            })
            .collect()
    }

    #[test]
    fn numeric_stats_cover_the_parsed_subset_only() {
        let qs = vec![question("q1", QuestionKind::Number)];
        let ans = answers("q1", &["3", "5", "x", "7"]);
        let res = aggregate(&qs, &ans, &ReportOptions::DEFAULT_OPTIONS);
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].total_answers, 4);
        assert_eq!(
            res[0].stats,
            QuestionStats::Numeric(Some(NumericStats {
                min: 3.0,
                max: 7.0,
                average: 5.0
            }))
        );
    }

    #[test]
    fn numeric_stats_absent_when_nothing_parses() {
        let qs = vec![question("q1", QuestionKind::Number)];
        let ans = answers("q1", &["abc", "xyz"]);
        let res = aggregate(&qs, &ans, &ReportOptions::DEFAULT_OPTIONS);
        assert_eq!(res[0].total_answers, 2);
        assert_eq!(res[0].stats, QuestionStats::Numeric(None));
    }

    #[test]
    fn rating_aggregates_like_number() {
        let qs = vec![question("stars", QuestionKind::Rating)];
        let ans = answers("stars", &["4", "5", "", "  3 "]);
        let res = aggregate(&qs, &ans, &ReportOptions::DEFAULT_OPTIONS);
        assert_eq!(res[0].total_answers, 4);
        assert_eq!(
            res[0].stats,
            QuestionStats::Numeric(Some(NumericStats {
                min: 3.0,
                max: 5.0,
                average: 4.0
            }))
        );
    }

    #[test]
    fn average_rounds_half_up() {
        let qs = vec![question("q1", QuestionKind::Number)];
        // 0.125 has an exact binary representation, so the midpoint is hit
        // exactly and must round up to 0.13.
        let ans = answers("q1", &["0", "0.25"]);
        let res = aggregate(&qs, &ans, &ReportOptions::DEFAULT_OPTIONS);
        assert_eq!(
            res[0].stats,
            QuestionStats::Numeric(Some(NumericStats {
                min: 0.0,
                max: 0.25,
                average: 0.13
            }))
        );
    }

    #[test]
    fn frequency_ranking_breaks_ties_in_first_seen_order() {
        let qs = vec![question("color", QuestionKind::ShortText)];
        let ans = answers("color", &["red", "blue", "red", "green", "blue", "red"]);
        let res = aggregate(&qs, &ans, &ReportOptions::DEFAULT_OPTIONS);
        assert_eq!(res[0].total_answers, 6);
        assert_eq!(
            res[0].stats,
            QuestionStats::Frequency(vec![
                ("red".to_string(), 3),
                ("blue".to_string(), 2),
                ("green".to_string(), 1)
            ])
        );
    }

    #[test]
    fn frequency_values_are_not_normalized() {
        let qs = vec![question("q1", QuestionKind::Dropdown)];
        let ans = answers("q1", &["Yes", "yes", "Yes ", "Yes"]);
        let res = aggregate(&qs, &ans, &ReportOptions::DEFAULT_OPTIONS);
        assert_eq!(
            res[0].stats,
            QuestionStats::Frequency(vec![
                ("Yes".to_string(), 2),
                ("yes".to_string(), 1),
                ("Yes ".to_string(), 1)
            ])
        );
    }

    #[test]
    fn frequency_ranking_is_truncated_to_the_limit() {
        let qs = vec![question("q1", QuestionKind::ShortText)];
        let ans = answers("q1", &["a", "b", "c", "b", "d", "e", "f"]);
        let limited = ReportOptions {
            popular_answer_limit: 3,
        };
        let res = aggregate(&qs, &ans, &limited);
        // b leads, then the singletons in first-seen order, cut at 3.
        assert_eq!(
            res[0].stats,
            QuestionStats::Frequency(vec![
                ("b".to_string(), 2),
                ("a".to_string(), 1),
                ("c".to_string(), 1)
            ])
        );
    }

    #[test]
    fn multiple_choice_counts_every_selected_option() {
        let qs = vec![question("langs", QuestionKind::MultipleChoice)];
        let ans = answers("langs", &[r#"["a","b"]"#, r#"["a"]"#, "not-json"]);
        let res = aggregate(&qs, &ans, &ReportOptions::DEFAULT_OPTIONS);
        assert_eq!(res[0].total_answers, 3);
        assert_eq!(
            res[0].stats,
            QuestionStats::Frequency(vec![("a".to_string(), 2), ("b".to_string(), 1)])
        );
    }

    #[test]
    fn multiple_choice_skips_non_array_json() {
        let qs = vec![question("q1", QuestionKind::MultipleChoice)];
        let ans = answers("q1", &[r#""a""#, r#"{"a":1}"#, "3", r#"["a"]"#]);
        let res = aggregate(&qs, &ans, &ReportOptions::DEFAULT_OPTIONS);
        assert_eq!(res[0].total_answers, 4);
        assert_eq!(
            res[0].stats,
            QuestionStats::Frequency(vec![("a".to_string(), 1)])
        );
    }

    #[test]
    fn multiple_choice_renders_non_string_selections() {
        let qs = vec![question("q1", QuestionKind::MultipleChoice)];
        let ans = answers("q1", &["[1, true, \"x\"]"]);
        let res = aggregate(&qs, &ans, &ReportOptions::DEFAULT_OPTIONS);
        assert_eq!(
            res[0].stats,
            QuestionStats::Frequency(vec![
                ("1".to_string(), 1),
                ("true".to_string(), 1),
                ("x".to_string(), 1)
            ])
        );
    }

    #[test]
    fn boolean_counts_exclude_unparseable_values() {
        let qs = vec![question("optin", QuestionKind::Boolean)];
        let ans = answers("optin", &["true", "false", "true", "maybe"]);
        let res = aggregate(&qs, &ans, &ReportOptions::DEFAULT_OPTIONS);
        assert_eq!(res[0].total_answers, 4);
        assert_eq!(
            res[0].stats,
            QuestionStats::Boolean(BooleanStats {
                true_count: 2,
                false_count: 1
            })
        );
    }

    #[test]
    fn unknown_kinds_carry_no_statistics() {
        let qs = vec![question("q1", QuestionKind::from_tag("PHONE"))];
        let ans = answers("q1", &["555-0100", "555-0101"]);
        let res = aggregate(&qs, &ans, &ReportOptions::DEFAULT_OPTIONS);
        assert_eq!(res[0].total_answers, 2);
        assert_eq!(res[0].stats, QuestionStats::Unavailable);
        assert_eq!(res[0].kind.as_str(), "PHONE");
    }

    #[test]
    fn output_follows_catalog_order_even_without_answers() {
        let qs = vec![
            question("q1", QuestionKind::ShortText),
            question("q2", QuestionKind::ShortText),
            question("q3", QuestionKind::Number),
        ];
        let mut ans = answers("q3", &["1"]);
        ans.extend(answers("q1", &["hello"]));
        let res = aggregate(&qs, &ans, &ReportOptions::DEFAULT_OPTIONS);
        let ids: Vec<&str> = res.iter().map(|r| r.question_id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
        assert_eq!(res[1].total_answers, 0);
        assert_eq!(res[1].stats, QuestionStats::Frequency(vec![]));
    }

    #[test]
    fn answers_without_a_question_are_dropped() {
        let qs = vec![question("q1", QuestionKind::ShortText)];
        let mut ans = answers("q1", &["a"]);
        ans.extend(answers("zz", &["b", "c"]));
        let res = aggregate(&qs, &ans, &ReportOptions::DEFAULT_OPTIONS);
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].total_answers, 1);
    }

    #[test]
    fn zero_questions_produce_an_empty_report() {
        let res = aggregate(
            &[],
            &answers("q1", &["a"]),
            &ReportOptions::DEFAULT_OPTIONS,
        );
        assert!(res.is_empty());
    }

    #[test]
    fn pre_grouped_values_aggregate_identically() {
        let q = question("q1", QuestionKind::ShortText);
        let values = ["a", "b", "a"];
        let direct = aggregate_question(&q, &values, &ReportOptions::DEFAULT_OPTIONS);
        let through = aggregate(
            &[q.clone()],
            &answers("q1", &values),
            &ReportOptions::DEFAULT_OPTIONS,
        );
        assert_eq!(through, vec![direct]);
    }

    #[test]
    fn repeated_runs_produce_identical_reports() {
        let _ = env_logger::builder().is_test(true).try_init();
        let qs = vec![
            question("q1", QuestionKind::ShortText),
            question("q2", QuestionKind::Number),
            question("q3", QuestionKind::MultipleChoice),
            question("q4", QuestionKind::Boolean),
        ];
        let mut ans = answers("q1", &["x", "y", "x", "z", "y"]);
        ans.extend(answers("q2", &["1", "2", "oops", "4"]));
        ans.extend(answers("q3", &[r#"["a","b"]"#, r#"["b"]"#]));
        ans.extend(answers("q4", &["true", "false"]));
        let first = aggregate(&qs, &ans, &ReportOptions::DEFAULT_OPTIONS);
        let second = aggregate(&qs, &ans, &ReportOptions::DEFAULT_OPTIONS);
        assert_eq!(first, second);
    }
}
