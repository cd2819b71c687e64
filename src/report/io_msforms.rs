// Reader for response spreadsheets from Microsoft Forms and Google Forms
// products.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use log::debug;
use snafu::{prelude::*, FromString};

use form_aggregation::Question;

use crate::report::{
    io_common::{make_default_id_lineno, map_questions_to_columns},
    *,
};

pub fn read_msforms_export(
    path: String,
    cfs: &FileSource,
    questions: &[Question],
) -> BReportResult<Vec<ParsedResponse>> {
    let default_id = make_default_id_lineno(&path);
    let wrange = get_range(&path, cfs)?;

    let header = wrange.rows().next().context(EmptyExcelSnafu {})?;
    debug!("read_msforms_export: header: {:?}", header);

    let remapped: Vec<Option<String>> = header
        .iter()
        .map(|dt| match dt {
            DataType::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect();
    let column_mapping = map_questions_to_columns(questions, &remapped)?;
    debug!("read_msforms_export: column_mapping: {:?}", column_mapping);

    let mut iter = wrange.rows();
    iter.next();
    let mut res: Vec<ParsedResponse> = Vec::new();
    for (idx, row) in iter.enumerate() {
        debug!("read_msforms_export: idx: {:?} row: {:?}", idx, &row);

        let mut answers: Vec<(String, String)> = Vec::new();
        for (col_idx, question_id) in column_mapping.iter() {
            match row.get(*col_idx) {
                None => {
                    // Short row, the remaining cells are skipped answers.
                }
                Some(cell) => match render_cell(cell, idx as u64)? {
                    Some(s) => answers.push((question_id.clone(), s)),
                    None => {}
                },
            }
        }
        res.push(ParsedResponse {
            id: Some(default_id(idx + 1)),
            answers,
        });
    }
    Ok(res)
}

/// The labels of the header row, used to infer a question catalog.
pub fn list_header_labels(path: String, cfs: &FileSource) -> BReportResult<Vec<String>> {
    let wrange = get_range(&path, cfs)?;
    let header = wrange.rows().next().context(EmptyExcelSnafu {})?;
    Ok(header
        .iter()
        .filter_map(|dt| match dt {
            DataType::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
        .collect())
}

/// String view of a spreadsheet cell. Empty cells mark skipped answers.
/// Numbers and booleans are rendered the way the aggregation expects them,
/// so a rating column stays parseable and a yes/no column counts as a
/// boolean.
fn render_cell(cell: &DataType, lineno: u64) -> BReportResult<Option<String>> {
    match cell {
        DataType::String(s) if s.is_empty() => Ok(None),
        DataType::String(s) => Ok(Some(s.clone())),
        DataType::Float(f) => Ok(Some(format!("{}", f))),
        DataType::Int(i) => Ok(Some(format!("{}", i))),
        DataType::Bool(b) => Ok(Some(format!("{}", b))),
        DataType::Empty => Ok(None),
        _ => Err(Box::new(ReportError::ExcelWrongCellType {
            lineno,
            content: format!("{:?}", cell),
        })),
    }
}

fn get_range(path: &String, cfs: &FileSource) -> BReportResult<calamine::Range<DataType>> {
    let worksheet_name_o = cfs.excel_worksheet_name.clone();
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let p = path.clone();
    let mut workbook: Xlsx<_> =
        open_workbook(p).context(OpeningExcelSnafu { path: path.clone() })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path: path.clone() })?;

        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => Err(Box::new(ReportError::EmptyExcel {})),
            [(worksheet_name, wrange)] => {
                debug!(
                    "get_range: path: {:?} worksheet: {:?}",
                    &path, &worksheet_name
                );
                Ok(wrange.clone())
            }
            _ => Err(Box::new(ReportError::without_source(format!(
                "the workbook {:?} has several worksheets, provide excelWorksheetName",
                path
            )))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_rendered_for_the_aggregation() {
        assert_eq!(
            render_cell(&DataType::String("Lisbon".to_string()), 0).unwrap(),
            Some("Lisbon".to_string())
        );
        // Spreadsheets store ratings as floats. Whole values must not grow
        // a decimal point, or they would split the frequency counts.
        assert_eq!(
            render_cell(&DataType::Float(5.0), 0).unwrap(),
            Some("5".to_string())
        );
        assert_eq!(
            render_cell(&DataType::Float(4.5), 0).unwrap(),
            Some("4.5".to_string())
        );
        assert_eq!(
            render_cell(&DataType::Int(12), 0).unwrap(),
            Some("12".to_string())
        );
        assert_eq!(
            render_cell(&DataType::Bool(true), 0).unwrap(),
            Some("true".to_string())
        );
        assert_eq!(render_cell(&DataType::Empty, 0).unwrap(), None);
        assert_eq!(render_cell(&DataType::String("".to_string()), 0).unwrap(), None);
    }

    #[test]
    fn error_cells_are_rejected() {
        let cell = DataType::Error(calamine::CellErrorType::Div0);
        assert!(render_cell(&cell, 3).is_err());
    }
}
