// Reader for response exports in the native JSON notation.

use std::collections::HashSet;
use std::fs;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::report::{io_common::make_default_id_lineno, *};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ExportAnswer {
    #[serde(rename = "questionId")]
    pub question_id: String,
    pub value: Option<JSValue>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub id: Option<String>,
    pub answers: Vec<ExportAnswer>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ResponsesExport {
    pub responses: Vec<ExportResponse>,
}

pub fn read_json_export(path: String, _cfs: &FileSource) -> BReportResult<Vec<ParsedResponse>> {
    let default_id = make_default_id_lineno(&path);
    let export = read_export(&path)?;

    let mut res: Vec<ParsedResponse> = Vec::new();
    for (idx, resp) in export.responses.iter().enumerate() {
        let mut answers: Vec<(String, String)> = Vec::new();
        for ans in resp.answers.iter() {
            match normalize_raw_value(&ans.value) {
                Some(v) => answers.push((ans.question_id.clone(), v)),
                None => {
                    debug!(
                        "read_json_export: response {:?}: skipped answer for {:?}",
                        idx, ans.question_id
                    );
                }
            }
        }
        res.push(ParsedResponse {
            id: Some(resp.id.clone().unwrap_or_else(|| default_id(idx + 1))),
            answers,
        });
    }
    Ok(res)
}

/// The distinct question ids seen in an export, in first-seen order.
pub fn list_question_ids(path: String) -> BReportResult<Vec<String>> {
    let export = read_export(&path)?;
    let mut seen: HashSet<String> = HashSet::new();
    let mut res: Vec<String> = Vec::new();
    for resp in export.responses.iter() {
        for ans in resp.answers.iter() {
            if seen.insert(ans.question_id.clone()) {
                res.push(ans.question_id.clone());
            }
        }
    }
    Ok(res)
}

fn read_export(path: &String) -> BReportResult<ResponsesExport> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let export: ResponsesExport =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!(
        "read_export: {:?}: {:?} responses",
        path,
        export.responses.len()
    );
    Ok(export)
}

/// String view of an exported value. Strings pass through, booleans and
/// numbers keep their JSON rendering, structured values are re-encoded.
/// `null` (or a missing value) marks a skipped answer.
pub fn normalize_raw_value(value: &Option<JSValue>) -> Option<String> {
    match value {
        None | Some(JSValue::Null) => None,
        Some(JSValue::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn values_are_normalized_to_strings() {
        assert_eq!(
            normalize_raw_value(&Some(json!("hello"))),
            Some("hello".to_string())
        );
        assert_eq!(normalize_raw_value(&Some(json!(4))), Some("4".to_string()));
        assert_eq!(
            normalize_raw_value(&Some(json!(4.5))),
            Some("4.5".to_string())
        );
        assert_eq!(
            normalize_raw_value(&Some(json!(true))),
            Some("true".to_string())
        );
        assert_eq!(
            normalize_raw_value(&Some(json!(["a", "b"]))),
            Some(r#"["a","b"]"#.to_string())
        );
        assert_eq!(normalize_raw_value(&Some(json!(null))), None);
        assert_eq!(normalize_raw_value(&None), None);
    }

    #[test]
    fn empty_strings_are_kept_as_answers() {
        // An empty string is a received answer, unlike null.
        assert_eq!(normalize_raw_value(&Some(json!(""))), Some("".to_string()));
    }
}
