use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "samplekeeper",
    version,
    about = "sample curation and analysis report tool",
    long_about = "samplekeeper curates the per-field sample values of the validation service and turns rendered analysis results into a plain-text report.\n\nExamples:\n  samplekeeper search -l 12 -f NCM -q 1001 --page-url 'http://host/history_ia?token=abc'\n  samplekeeper delete -l 12 -f NCM --value 10011000 -k abc\n  samplekeeper delete -l 12 -f NCM -k abc --yes\n  samplekeeper report -i resultado.json --clipboard\n\nTip: Use --config to persist the service URL and token."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv, -vvv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        global = true,
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.samplekeeper/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'u',
        long = "bu",
        visible_alias = "base-url",
        value_name = "URL",
        global = true,
        help_heading = "Service",
        help = "Base URL of the validation service."
    )]
    pub base_url: Option<String>,

    #[arg(
        long = "pu",
        visible_alias = "page-url",
        value_name = "URL",
        global = true,
        help_heading = "Service",
        help = "Page URL whose query string carries the token."
    )]
    pub page_url: Option<String>,

    #[arg(
        short = 'k',
        long = "tk",
        visible_alias = "token",
        value_name = "TOKEN",
        global = true,
        help_heading = "Service",
        help = "Service token (used when no --page-url is given)."
    )]
    pub token: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        global = true,
        help_heading = "HTTP",
        help = "Per-request timeout in seconds (default: none)."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'p',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        global = true,
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Search a field's samples and show the resulting list.
    Search(SearchArgs),
    /// Delete one sample, or every sample of a field, after confirmation.
    Delete(DeleteArgs),
    /// Build the analysis report from a results snapshot.
    Report(ReportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct FieldArgs {
    #[arg(short = 'l', long = "layout", value_name = "ID", help = "Layout identifier.")]
    pub layout: String,

    #[arg(
        short = 'f',
        long = "field",
        visible_alias = "campo",
        value_name = "NAME",
        help = "Field name."
    )]
    pub field: String,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub target: FieldArgs,

    #[arg(
        short = 'q',
        long = "term",
        visible_alias = "termo",
        value_name = "TEXT",
        default_value = "",
        help = "Search term (empty lists every sample)."
    )]
    pub term: String,

    #[arg(long = "html", help = "Print the list as page markup.")]
    pub html: bool,

    #[arg(
        long = "ds",
        visible_alias = "discard-stale",
        help = "Drop responses that answer an older query for the same field."
    )]
    pub discard_stale: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub target: FieldArgs,

    #[arg(
        long = "value",
        visible_alias = "valor",
        value_name = "VALUE",
        help = "Sample to delete; without it the whole field is cleared."
    )]
    pub value: Option<String>,

    #[arg(short = 'y', long = "yes", help = "Confirm without prompting.")]
    pub yes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[arg(
        short = 'i',
        long = "input",
        value_name = "FILE",
        help = "Results snapshot (JSON or YAML list of cards)."
    )]
    pub input: String,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help = "Write the report to a file."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'A',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help = "Output format (text or json)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'c',
        long = "clipboard",
        help = "Copy the report to the system clipboard."
    )]
    pub clipboard: bool,
}
