// Primitives for reading CSV files.

use log::debug;
use snafu::{prelude::*, FromString};

use form_aggregation::Question;

use crate::report::{
    io_common::{make_default_id_lineno, map_questions_to_columns},
    *,
};

pub fn read_csv_export(
    path: String,
    cfs: &FileSource,
    questions: &[Question],
) -> BReportResult<Vec<ParsedResponse>> {
    let default_id = make_default_id_lineno(&path);

    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path.clone())
        .context(CsvOpenSnafu {})?;
    let mut records = rdr.into_records();

    // Rows consumed before the responses start.
    let mut consumed: usize = 0;
    let column_mapping: Vec<(usize, String)> = match cfs.question_columns()? {
        Some(cols) => {
            if cols.len() != questions.len() {
                return Err(Box::new(ReportError::without_source(format!(
                    "questionColumns lists {} columns for {} questions",
                    cols.len(),
                    questions.len()
                ))));
            }
            questions
                .iter()
                .zip(cols.iter())
                .map(|(q, col)| (*col, q.id.clone()))
                .collect()
        }
        None => {
            // The first row is a header.
            let header_r = records.next().context(CsvMissingHeaderSnafu {})?;
            let header = header_r.context(CsvLineParseSnafu {})?;
            consumed += 1;
            let cells: Vec<Option<String>> = header.iter().map(|s| Some(s.to_string())).collect();
            map_questions_to_columns(questions, &cells)?
        }
    };
    debug!("read_csv_export: column_mapping: {:?}", column_mapping);

    if let Some(first_row) = cfs.first_response_row_index()? {
        // The index starts at 1 to respect most conventions in the Excel world.
        while consumed + 1 < first_row {
            _ = records.next();
            consumed += 1;
        }
    }

    let mut res: Vec<ParsedResponse> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = consumed + idx + 1;
        let line = line_r.context(CsvLineParseSnafu {})?;
        debug!("read_csv_export: lineno: {:?} row: {:?}", lineno, line);

        let mut answers: Vec<(String, String)> = Vec::new();
        for (col, question_id) in column_mapping.iter() {
            match line.get(*col) {
                // Empty cells are skipped answers, as are cells past the end
                // of a short row.
                Some("") | None => {}
                Some(s) => answers.push((question_id.clone(), s.to_string())),
            }
        }
        res.push(ParsedResponse {
            id: Some(default_id(lineno)),
            answers,
        });
    }
    Ok(res)
}

/// The labels of the header row, used to infer a question catalog.
pub fn list_header_labels(path: String, _cfs: &FileSource) -> BReportResult<Vec<String>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .context(CsvOpenSnafu {})?;
    let mut records = rdr.into_records();
    let header_r = records.next().context(CsvMissingHeaderSnafu {})?;
    let header = header_r.context(CsvLineParseSnafu {})?;
    Ok(header
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect())
}
