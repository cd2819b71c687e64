use clap::Parser;

/// This is a form response aggregation program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file describing the report: template metadata, question catalog and
    /// response sources. (Only JSON report descriptions are currently supported)
    /// For more information about the file format, read the documentation.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the summary of a report in JSON format. If provided, formsum will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the report will be written in JSON format to the given
    /// location. Setting this option overrides the output directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, the responses are read from this file instead of the sources listed in the
    /// configuration. Without --config, a question catalog is inferred from the input and every question
    /// is aggregated as free text.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input. See documentation for all the input types.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (list of labels or not specified) If specified, restricts the inferred question catalog to these labels.
    /// Each label should correspond to an entry in the first row of the input. This flag can be repeated.
    #[clap(long, value_parser)]
    pub questions: Option<Vec<String>>,

    /// (optional) When using an Excel file, indicates the name of the worksheet to use.
    /// Without this flag, the workbook is expected to contain a single worksheet.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
