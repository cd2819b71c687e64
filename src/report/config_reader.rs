use crate::report::*;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;
use std::fs;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "templateTitle")]
    pub template_title: String,
    #[serde(rename = "templateId")]
    pub template_id: Option<String>,
    #[serde(rename = "templateAuthor")]
    pub template_author: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

/// The template block of the summary output.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: Option<String>,
    pub title: String,
    pub author: Option<String>,
    #[serde(rename = "totalResponses")]
    pub total_responses: u64,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    /// Column positions of the questions, aligned with the catalog order.
    /// Entries are 1-based numbers or Excel column letters. When absent,
    /// the first row of the file is a header and columns are matched by
    /// question text or id.
    #[serde(rename = "questionColumns")]
    _question_columns: Option<Vec<JSValue>>,
    #[serde(rename = "firstResponseRowIndex")]
    _first_response_row_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl FileSource {
    /// A source built from command line arguments instead of a
    /// configuration file.
    pub fn single_file(
        provider: String,
        file_path: String,
        excel_worksheet_name: Option<String>,
    ) -> FileSource {
        FileSource {
            provider,
            file_path,
            _question_columns: None,
            _first_response_row_index: None,
            excel_worksheet_name,
        }
    }

    /// The declared column of each question, as 0-based indexes.
    pub fn question_columns(&self) -> ReportResult<Option<Vec<usize>>> {
        match &self._question_columns {
            None => Ok(None),
            Some(cols) => {
                let mut res: Vec<usize> = Vec::new();
                for c in cols.iter() {
                    let x = read_js_int(&Some(c.clone()))?;
                    if x == 0 {
                        whatever!("entries of questionColumns are 1-based: {}", c);
                    }
                    res.push(x - 1);
                }
                Ok(Some(res))
            }
        }
    }

    /// The 1-based row at which the responses start.
    pub fn first_response_row_index(&self) -> ReportResult<Option<usize>> {
        match &self._first_response_row_index {
            None => Ok(None),
            Some(_) => read_js_int(&self._first_response_row_index).map(Some),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReportQuestion {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: String,
    pub options: Option<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReportOptionsConfig {
    #[serde(rename = "popularAnswerLimit")]
    _popular_answer_limit: Option<JSValue>,
}

impl ReportOptionsConfig {
    pub fn popular_answer_limit(&self) -> ReportResult<Option<usize>> {
        match &self._popular_answer_limit {
            None => Ok(None),
            Some(_) => read_js_int(&self._popular_answer_limit).map(Some),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "responseFileSources")]
    pub response_file_sources: Vec<FileSource>,
    pub questions: Vec<ReportQuestion>,
    #[serde(rename = "reportOptions")]
    pub report_options: Option<ReportOptionsConfig>,
}

pub fn read_summary(path: String) -> BReportResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!(
        "read_summary: results: {:?}",
        js["results"].as_array().map(|l| l.len())
    );
    Ok(js)
}

fn read_js_int(x: &Option<JSValue>) -> ReportResult<usize> {
    match x {
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {}),
        // Parsing the Excel-style column letters. The result is 1-based,
        // like the plain numbers.
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            let mut acc: usize = 0;
            for c in s.to_lowercase().chars() {
                acc = acc * 26 + ((c as usize) - ('a' as usize) + 1);
            }
            Ok(acc)
        }
        Some(JSValue::String(s)) => s.parse::<usize>().ok().context(ParsingJsonNumberSnafu {}),
        _ => None.context(ParsingJsonNumberSnafu {}),
    }
}
