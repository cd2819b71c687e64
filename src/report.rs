use log::{debug, info, warn};

use form_aggregation::*;
use snafu::{prelude::*, ErrorCompat, FromString, Snafu};

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::report::config_reader::*;
use crate::report::io_common::simplify_file_name;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_json;
pub mod io_msforms;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Excel file has no content"))]
    EmptyExcel {},
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error parsing a JSON number"))]
    ParsingJsonNumber {},
    #[snafu(display("Error opening CSV file"))]
    CsvOpen { source: csv::Error },
    #[snafu(display("Error parsing a CSV line"))]
    CsvLineParse { source: csv::Error },
    #[snafu(display("The CSV file has no header row"))]
    CsvMissingHeader {},
    #[snafu(display("Cell with unexpected type at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Cannot find question {question} in the file header"))]
    HeaderMissingQuestion { question: String },
    #[snafu(display("The configuration path has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Error writing summary file {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;
pub type BReportResult<T> = Result<T, Box<ReportError>>;

/// A response, as parsed by the readers.
/// The values are still raw strings at this point. Whatever does not parse
/// is sorted out during the aggregation, not here.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedResponse {
    pub id: Option<String>,
    /// (question id, raw value) pairs, one per answered question.
    pub answers: Vec<(String, String)>,
}

fn aggregated_to_json(results: &[AggregatedQuestion]) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for aq in results.iter() {
        let mut js_map: JSMap<String, JSValue> = JSMap::new();
        js_map.insert("questionId".to_string(), json!(aq.question_id));
        js_map.insert("text".to_string(), json!(aq.text));
        js_map.insert("type".to_string(), json!(aq.kind.as_str()));
        if !aq.options.is_empty() {
            js_map.insert("options".to_string(), json!(aq.options));
        }
        js_map.insert(
            "totalResponsesForQuestion".to_string(),
            json!(aq.total_answers),
        );
        match &aq.stats {
            QuestionStats::Numeric(Some(ns)) => {
                js_map.insert("min".to_string(), json!(ns.min));
                js_map.insert("max".to_string(), json!(ns.max));
                js_map.insert("average".to_string(), json!(ns.average));
            }
            QuestionStats::Numeric(None) => {
                // Nothing parsed as a number. The fields are left out, which
                // is not the same as a summary of zeros.
            }
            QuestionStats::Frequency(entries) => {
                let popular: Vec<JSValue> = entries
                    .iter()
                    .map(|(answer, count)| json!({"answer": answer, "count": count}))
                    .collect();
                js_map.insert("popularAnswers".to_string(), JSValue::Array(popular));
            }
            QuestionStats::Boolean(bs) => {
                js_map.insert("trueCount".to_string(), json!(bs.true_count));
                js_map.insert("falseCount".to_string(), json!(bs.false_count));
            }
            QuestionStats::Unavailable => {}
        }
        l.push(JSValue::Object(js_map));
    }
    l
}

fn build_summary_js(
    config: &ReportConfig,
    total_responses: u64,
    results: &[AggregatedQuestion],
) -> JSValue {
    let t = TemplateSummary {
        id: config.output_settings.template_id.clone(),
        title: config.output_settings.template_title.clone(),
        author: config.output_settings.template_author.clone(),
        total_responses,
    };
    json!({
        "template": t,
        "results": aggregated_to_json(results) })
}

// whatever! builds the plain error type, not the boxed alias, so the
// validation helpers return ReportResult and callers box through `?`.
fn validate_options(config_options: &Option<ReportOptionsConfig>) -> ReportResult<ReportOptions> {
    let mut options = ReportOptions::DEFAULT_OPTIONS;
    if let Some(oc) = config_options {
        if let Some(limit) = oc.popular_answer_limit()? {
            if limit == 0 {
                whatever!("popularAnswerLimit must be at least 1");
            }
            options.popular_answer_limit = limit;
        }
    }
    Ok(options)
}

fn validate_questions(config_questions: &[ReportQuestion]) -> ReportResult<Vec<Question>> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut res: Vec<Question> = Vec::new();
    for cq in config_questions.iter() {
        if !seen.insert(cq.id.as_str()) {
            whatever!("duplicate question id in the configuration: {}", cq.id);
        }
        let kind = QuestionKind::from_tag(cq.question_type.as_str());
        if let QuestionKind::Unknown(tag) = &kind {
            warn!(
                "validate_questions: question {:?} has unknown type {:?}, no statistics will be computed",
                cq.id, tag
            );
        }
        res.push(Question {
            id: cq.id.clone(),
            text: cq.text.clone(),
            kind,
            options: cq.options.clone().unwrap_or_default(),
        });
    }
    Ok(res)
}

fn read_response_data(
    root_path: String,
    cfs: &FileSource,
    questions: &[Question],
) -> BReportResult<Vec<ParsedResponse>> {
    let p: PathBuf = [root_path, cfs.file_path.clone()].iter().collect();
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read response file {:?}", p2);
    match cfs.provider.as_str() {
        "json" => io_json::read_json_export(p2, cfs),
        "csv" => io_csv::read_csv_export(p2, cfs, questions),
        "msforms" => io_msforms::read_msforms_export(p2, cfs, questions),
        x => Err(Box::new(ReportError::without_source(format!(
            "Provider not implemented {:?}",
            x
        )))),
    }
}

fn flatten_responses(responses: &[ParsedResponse]) -> Vec<Answer> {
    let mut res: Vec<Answer> = Vec::new();
    for pr in responses.iter() {
        debug!(
            "flatten_responses: response {:?}: {:?} answers",
            pr.id,
            pr.answers.len()
        );
        for (question_id, value) in pr.answers.iter() {
            res.push(Answer {
                question_id: question_id.clone(),
                value: value.clone(),
            });
        }
    }
    res
}

fn infer_question_labels(cfs: &FileSource) -> BReportResult<Vec<String>> {
    info!("infer_question_labels: inspecting {:?}", cfs.file_path);
    match cfs.provider.as_str() {
        "json" => io_json::list_question_ids(cfs.file_path.clone()),
        "csv" => io_csv::list_header_labels(cfs.file_path.clone(), cfs),
        "msforms" => io_msforms::list_header_labels(cfs.file_path.clone(), cfs),
        x => Err(Box::new(ReportError::without_source(format!(
            "Provider not implemented {:?}",
            x
        )))),
    }
}

/// Builds a configuration when only an input file is given: the catalog is
/// inferred from the labels found in the input and every question is
/// aggregated as free text.
fn assemble_quick_config(args: &Args, input: &String) -> BReportResult<ReportConfig> {
    let source = FileSource::single_file(
        args.input_type.clone().unwrap_or_else(|| "csv".to_string()),
        input.clone(),
        args.excel_worksheet_name.clone(),
    );
    let labels = match &args.questions {
        Some(qs) if !qs.is_empty() => qs.clone(),
        _ => infer_question_labels(&source)?,
    };
    if labels.is_empty() {
        return Err(Box::new(ReportError::without_source(format!(
            "no questions could be inferred from {:?}",
            input
        ))));
    }
    info!("assemble_quick_config: questions: {:?}", labels);
    let questions: Vec<ReportQuestion> = labels
        .iter()
        .map(|label| ReportQuestion {
            id: label.clone(),
            text: label.clone(),
            question_type: "SHORT_TEXT".to_string(),
            options: None,
        })
        .collect();
    Ok(ReportConfig {
        output_settings: OutputSettings {
            template_title: simplify_file_name(input.as_str()),
            template_id: None,
            template_author: None,
            output_directory: None,
        },
        response_file_sources: vec![source],
        questions,
        report_options: None,
    })
}

/// The configuration and the directory that file paths are relative to.
fn assemble_config(args: &Args) -> BReportResult<(ReportConfig, String)> {
    match (&args.config, &args.input) {
        (Some(config_path), input_o) => {
            let config_p = Path::new(config_path.as_str());
            let config_str = fs::read_to_string(config_path.clone()).context(OpeningJsonSnafu {
                path: config_path.clone(),
            })?;
            let mut config: ReportConfig =
                serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
            match input_o {
                Some(input) => {
                    // -i replaces the sources listed in the configuration.
                    // The path is taken relative to the working directory.
                    config.response_file_sources = vec![FileSource::single_file(
                        args.input_type.clone().unwrap_or_else(|| "csv".to_string()),
                        input.clone(),
                        args.excel_worksheet_name.clone(),
                    )];
                    Ok((config, ".".to_string()))
                }
                None => {
                    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;
                    Ok((config, root_p.display().to_string()))
                }
            }
        }
        (None, Some(input)) => {
            let config = assemble_quick_config(args, input)?;
            Ok((config, ".".to_string()))
        }
        (None, None) => Err(Box::new(ReportError::without_source(
            "provide a report configuration (--config) or an input file (--input)".to_string(),
        ))),
    }
}

fn write_summary(args: &Args, config: &ReportConfig, pretty_js_stats: &str) -> BReportResult<()> {
    let out = args.out.clone().or_else(|| {
        config.output_settings.output_directory.clone().map(|dir| {
            let p: PathBuf = [dir, "summary.json".to_string()].iter().collect();
            p.as_path().display().to_string()
        })
    });
    match out {
        Some(loc) if loc == "stdout" => {
            println!("{}", pretty_js_stats);
        }
        Some(loc) => {
            fs::write(loc.clone(), pretty_js_stats)
                .context(WritingSummarySnafu { path: loc.clone() })?;
            info!("Summary written to {:?}", loc);
        }
        None => {
            println!("summary:{}", pretty_js_stats);
        }
    }
    Ok(())
}

pub fn run_report(args: &Args) -> BReportResult<()> {
    let (config, root_path) = assemble_config(args)?;
    info!("config: {:?}", config);

    let options = validate_options(&config.report_options)?;
    let questions = validate_questions(&config.questions)?;

    if config.response_file_sources.is_empty() {
        return Err(Box::new(ReportError::without_source(
            "no response file sources provided".to_string(),
        )));
    }

    let mut responses: Vec<ParsedResponse> = Vec::new();
    for cfs in config.response_file_sources.iter() {
        let mut file_data = read_response_data(root_path.clone(), cfs, &questions)?;
        responses.append(&mut file_data);
    }

    let total_responses = responses.len() as u64;
    info!("run_report: processing {:?} responses", total_responses);

    let answers = flatten_responses(&responses);
    let results = aggregate(&questions, &answers, &options);

    // Assemble the final json
    let result_js = build_summary_js(&config, total_responses, &results);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    write_summary(args, &config, &pretty_js_stats)?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = args.reference.clone() {
        let summary_ref = read_summary(summary_p)?;
        debug!("summary: {:?}", summary_ref);
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return Err(Box::new(ReportError::without_source(
                "Difference detected between calculated summary and reference summary".to_string(),
            )));
        }
    }

    Ok(())
}

fn test_data_dir() -> String {
    option_env!("FORMSUM_TEST_DIR")
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("{}/tests/data", env!("CARGO_MANIFEST_DIR")))
}

fn run_report_test(test_name: &str, config_lpath: &str, summary_lpath: &str) {
    let test_dir = test_data_dir();
    info!("Running test {}", test_name);
    let args = Args {
        config: Some(format!("{}/{}/{}", test_dir, test_name, config_lpath)),
        reference: Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
        out: None,
        input: None,
        input_type: None,
        questions: None,
        excel_worksheet_name: None,
        verbose: false,
    };
    let res = run_report(&args);
    if let Err(e) = res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(e.as_ref()) {
            eprintln!("trace: {}", bt);
        } else {
            eprintln!("No trace found");
        }
        panic!("Test {} failed: {}", test_name, e);
    }
}

pub fn test_wrapper(test_name: &str) {
    run_report_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_summary() {
        test_wrapper("numeric_summary");
    }

    #[test]
    fn text_popular_answers() {
        test_wrapper("text_popular_answers");
    }

    #[test]
    fn multiple_choice_selections() {
        test_wrapper("multiple_choice_selections");
    }

    #[test]
    fn boolean_split() {
        test_wrapper("boolean_split");
    }

    #[test]
    fn unknown_question_type() {
        test_wrapper("unknown_question_type");
    }

    #[test]
    fn mixed_template() {
        test_wrapper("mixed_template");
    }

    #[test]
    fn csv_header_matching() {
        test_wrapper("csv_header_matching");
    }

    #[test]
    fn csv_question_columns() {
        test_wrapper("csv_question_columns");
    }

    #[test]
    fn no_responses() {
        test_wrapper("no_responses");
    }

    #[test]
    fn answer_limit() {
        test_wrapper("answer_limit");
    }

    #[test]
    #[ignore = "the xlsx export is not recorded in the test data"]
    fn msforms_export() {
        test_wrapper("msforms_export");
    }

    #[test]
    fn quick_mode_csv() {
        let test_dir = test_data_dir();
        let args = Args {
            config: None,
            reference: Some(format!(
                "{}/quick_csv/quick_csv_expected_summary.json",
                test_dir
            )),
            out: None,
            input: Some(format!("{}/quick_csv/responses.csv", test_dir)),
            input_type: Some("csv".to_string()),
            questions: None,
            excel_worksheet_name: None,
            verbose: false,
        };
        let res = run_report(&args);
        assert!(res.is_ok(), "{:?}", res.err());
    }

    #[test]
    fn options_are_echoed_only_when_declared() {
        let aq = AggregatedQuestion {
            question_id: "q1".to_string(),
            text: "Plan".to_string(),
            kind: QuestionKind::SingleChoice,
            options: vec!["Free".to_string(), "Pro".to_string()],
            total_answers: 2,
            stats: QuestionStats::Frequency(vec![("Pro".to_string(), 2)]),
        };
        let js = &aggregated_to_json(&[aq])[0];
        assert_eq!(js["options"], json!(["Free", "Pro"]));
        assert_eq!(js["popularAnswers"], json!([{"answer": "Pro", "count": 2}]));

        let aq2 = AggregatedQuestion {
            question_id: "q2".to_string(),
            text: "Comment".to_string(),
            kind: QuestionKind::ShortText,
            options: vec![],
            total_answers: 0,
            stats: QuestionStats::Frequency(vec![]),
        };
        let js2 = &aggregated_to_json(&[aq2])[0];
        assert!(js2.get("options").is_none());
        assert_eq!(js2["popularAnswers"], json!([]));
    }

    #[test]
    fn numeric_fields_absent_without_numeric_data() {
        let aq = AggregatedQuestion {
            question_id: "q1".to_string(),
            text: "Age".to_string(),
            kind: QuestionKind::Number,
            options: vec![],
            total_answers: 3,
            stats: QuestionStats::Numeric(None),
        };
        let js = &aggregated_to_json(&[aq])[0];
        assert_eq!(js["totalResponsesForQuestion"], json!(3));
        assert!(js.get("min").is_none());
        assert!(js.get("max").is_none());
        assert!(js.get("average").is_none());
    }

    #[test]
    fn default_options_used_without_config_section() {
        let options = validate_options(&None).unwrap();
        assert_eq!(options, ReportOptions::DEFAULT_OPTIONS);
    }

    #[test]
    fn zero_answer_limit_is_rejected() {
        let oc: ReportOptionsConfig =
            serde_json::from_str(r#"{"popularAnswerLimit": 0}"#).unwrap();
        assert!(validate_options(&Some(oc)).is_err());
    }

    #[test]
    fn duplicate_config_questions_are_rejected() {
        let qs = vec![
            ReportQuestion {
                id: "q1".to_string(),
                text: "A".to_string(),
                question_type: "SHORT_TEXT".to_string(),
                options: None,
            },
            ReportQuestion {
                id: "q1".to_string(),
                text: "B".to_string(),
                question_type: "NUMBER".to_string(),
                options: None,
            },
        ];
        assert!(validate_questions(&qs).is_err());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let source =
            FileSource::single_file("xml".to_string(), "responses.xml".to_string(), None);
        let res = read_response_data(".".to_string(), &source, &[]);
        assert!(res.is_err());
    }
}
