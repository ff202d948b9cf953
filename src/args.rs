use clap::Parser;

/// Tabulates ranked ballots with Borda counts, instant-runoff voting and ranked pairs.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the election: contest, ballot source and rules.
    /// Relative paths inside the file are resolved against its directory.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the outcome of an election in JSON format. If provided, rtally will
    /// check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path or 'stdout') If specified, the summary of the election will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The ballot table. Overrides the ballot source of the --config file.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx) The type of the input. By default, guessed from the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (comma-separated list of irv, borda, rpv) The methods to run. All of them by default.
    #[clap(long, value_parser, use_value_delimiter = true)]
    pub methods: Option<Vec<String>>,

    /// (comma-separated list of BC, 0-BC, Dowdall, Dowdall-AR, Power) The Borda variants to compute.
    #[clap(long, value_parser, use_value_delimiter = true)]
    pub scoring_systems: Option<Vec<String>>,

    /// Fails the ranked pairs tabulation instead of flagging pairs that cannot be ordered.
    #[clap(long, takes_value = false)]
    pub strict_pairs: bool,

    /// (default 1) The value of the most preferred rank in the input.
    #[clap(long, value_parser)]
    pub rank_base: Option<i64>,

    /// When using an Excel file, indicates the name of the worksheet to use. The first one by default.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// Only checks the ballots and lists the spoiled ones.
    #[clap(long, takes_value = false)]
    pub check_ballots: bool,

    /// (two candidate names) Prints the head-to-head count between two candidates instead of tabulating.
    #[clap(long, value_parser)]
    pub pair: Option<Vec<String>>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
