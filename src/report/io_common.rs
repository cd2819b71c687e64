use std::collections::HashMap;
use std::path::Path;

use log::debug;
use snafu::prelude::*;

use form_aggregation::Question;

use crate::report::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn make_default_id_lineno(path: &String) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path.as_str());
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}

/// Given the header of a file (names of each of the columns) and the question
/// catalog, finds the column holding each question's answers. Columns are
/// matched by question text first, then by question id.
pub fn map_questions_to_columns(
    questions: &[Question],
    header: &[Option<String>],
) -> BReportResult<Vec<(usize, String)>> {
    let col_names: HashMap<String, usize> = header
        .iter()
        .enumerate()
        .filter_map(|(idx, x)| x.as_ref().map(|s| (s.clone(), idx)))
        .collect();

    debug!("map_questions_to_columns: col_names: {:?}", col_names);

    let mut col_indexes: Vec<(usize, String)> = Vec::new();
    for q in questions.iter() {
        let idx = col_names
            .get(&q.text)
            .or_else(|| col_names.get(&q.id))
            .context(HeaderMissingQuestionSnafu { question: &q.id })?;
        col_indexes.push((*idx, q.id.clone()));
    }
    Ok(col_indexes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_aggregation::QuestionKind;

    fn question(id: &str, text: &str) -> Question {
        Question {
            id: id.to_string(),
            text: text.to_string(),
            kind: QuestionKind::ShortText,
            options: vec![],
        }
    }

    fn header(labels: &[&str]) -> Vec<Option<String>> {
        labels.iter().map(|s| Some(s.to_string())).collect()
    }

    #[test]
    fn questions_are_matched_by_text_then_id() {
        let questions = vec![question("q_role", "Role"), question("q2", "ignored")];
        let header = header(&["Respondent", "Role", "q2"]);
        let mapping = map_questions_to_columns(&questions, &header).unwrap();
        assert_eq!(
            mapping,
            vec![(1, "q_role".to_string()), (2, "q2".to_string())]
        );
    }

    #[test]
    fn missing_questions_are_an_error() {
        let questions = vec![question("q_role", "Role")];
        let header = header(&["Respondent", "City"]);
        assert!(map_questions_to_columns(&questions, &header).is_err());
    }

    #[test]
    fn default_ids_carry_the_file_name_and_line() {
        let default_id = make_default_id_lineno(&"/tmp/exports/responses.csv".to_string());
        assert_eq!(default_id(2), "responses.csv-00000002");
    }
}
