use std::path::PathBuf;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::args::{CliArgs, Command, DeleteArgs, ReportArgs, SearchArgs};
use crate::cli::prompt::{self, TerminalModal};
use crate::cli::validation;
use crate::clipboard::{self, CopyOutcome, FileSink, ReportSink, StdoutSink, SystemClipboard};
use crate::config::{self, ConfigFile};
use crate::controller::{
    ControllerOptions, DeleteOutcome, SampleCurationController, SearchOrdering, SearchOutcome,
};
use crate::logging;
use crate::notify::{ConsoleNotifier, DEFAULT_NOTICE_DURATION};
use crate::output::{self, markup, OutputFormat};
use crate::report::snapshot;
use crate::service::{ClientOptions, HttpSampleService, PageLocation};
use crate::view::{ElementRef, FieldKey, SamplePage};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[derive(Clone, Debug)]
struct RunConfig {
    verbose: u8,
    no_color: bool,
    client: ClientOptions,
    page_href: String,
    has_token: bool,
    notice_duration: Duration,
    discard_stale_searches: bool,
    output_format: Option<String>,
    command: Command,
}

fn resolve_page_href(
    base_url: &str,
    page_url: Option<String>,
    token: Option<String>,
) -> (String, bool) {
    if let Some(page_url) = page_url.filter(|p| !p.trim().is_empty()) {
        let has_token = PageLocation::new(page_url.as_str()).token().is_some();
        return (page_url, has_token);
    }
    match token.filter(|t| !t.is_empty()) {
        Some(token) => {
            let page = format!("{}/history_ia", base_url.trim_end_matches('/'));
            (PageLocation::with_token(&page, &token).href(), true)
        }
        None => (base_url.to_string(), false),
    }
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let command = args
        .command
        .ok_or_else(|| "a subcommand is required (search, delete or report)".to_string())?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);
    let base_url = args
        .base_url
        .or(cfg.base_url)
        .map(|u| u.trim().to_string())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    reqwest::Url::parse(&base_url).map_err(|e| format!("invalid base_url '{base_url}': {e}"))?;

    let timeout = args.timeout.or(cfg.timeout).filter(|t| *t > 0);
    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());

    let (page_href, has_token) =
        resolve_page_href(&base_url, args.page_url.or(cfg.page_url), args.token.or(cfg.token));

    let notice_duration = cfg
        .notice_duration_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_NOTICE_DURATION);

    let discard_stale_searches = match &command {
        Command::Search(search) => search.discard_stale,
        _ => false,
    } || cfg.discard_stale_searches.unwrap_or(false);

    let output_format = cfg.output_format;
    if let Some(raw) = output_format.as_deref() {
        match OutputFormat::parse(raw) {
            Some(OutputFormat::Text) | Some(OutputFormat::Json) => {}
            _ => {
                return Err(format!(
                    "invalid output_format '{raw}' in config, expected text or json"
                ))
            }
        }
    }

    Ok(RunConfig {
        verbose: args.verbose,
        no_color,
        client: ClientOptions {
            base_url,
            timeout_seconds: timeout,
            proxy,
        },
        page_href,
        has_token,
        notice_duration,
        discard_stale_searches,
        output_format,
        command,
    })
}

fn controller_options(run: &RunConfig) -> ControllerOptions {
    ControllerOptions {
        notice_duration: run.notice_duration,
        search_ordering: if run.discard_stale_searches {
            SearchOrdering::DiscardStale
        } else {
            SearchOrdering::Arrival
        },
    }
}

fn build_service(run: &RunConfig) -> Result<HttpSampleService, String> {
    if !run.has_token {
        tracing::warn!("no token configured; requests will carry an empty token");
    }
    HttpSampleService::new(&run.client).map_err(|e| e.to_string())
}

async fn run_search(run: &RunConfig, args: &SearchArgs) -> Result<(), String> {
    let service = build_service(run)?;
    let key = FieldKey::new(args.target.layout.trim(), args.target.field.trim());
    let mut page = SamplePage::new();
    page.add_field(key.clone(), &[]);
    page.set_search_text(&key, &args.term);

    let mut ctl = SampleCurationController::with_options(
        service,
        TerminalModal::default(),
        ConsoleNotifier,
        PageLocation::new(run.page_href.as_str()),
        controller_options(run),
    );

    let pb = spinner(format!(
        "{} {}",
        "searching ::".bold().white(),
        key.field.bold().blue()
    ));
    let outcome = ctl
        .on_search_gesture(&mut page, &ElementRef::SearchInput(key.clone()))
        .await
        .map_err(|e| e.to_string())?;
    pb.finish_and_clear();

    let field = page
        .field(&key)
        .ok_or_else(|| format!("field {} vanished from the page", key.field))?;
    if args.html {
        print!("{}", markup::render_sample_list(field));
    } else {
        print!("{}", markup::render_sample_lines(field));
    }

    match outcome {
        SearchOutcome::Failed => Err("sample search failed".to_string()),
        SearchOutcome::Rendered { count } => {
            tracing::info!(count, "samples listed");
            Ok(())
        }
        SearchOutcome::Empty | SearchOutcome::Stale => Ok(()),
    }
}

async fn run_delete(run: &RunConfig, args: &DeleteArgs) -> Result<(), String> {
    let service = build_service(run)?;
    let key = FieldKey::new(args.target.layout.trim(), args.target.field.trim());
    let mut page = SamplePage::new();
    let seeded: Vec<String> = args.value.iter().cloned().collect();
    page.add_field(key.clone(), &seeded);

    let target = match args.value.as_deref() {
        Some(value) => page
            .find_item(&key, value)
            .ok_or_else(|| format!("value {value} is not listed"))?,
        None => ElementRef::ClearButton(key.clone()),
    };

    let mut ctl = SampleCurationController::with_options(
        service,
        TerminalModal::default(),
        ConsoleNotifier,
        PageLocation::new(run.page_href.as_str()),
        controller_options(run),
    );
    ctl.on_delete_gesture(&page, &target)
        .map_err(|e| e.to_string())?;

    let confirmed = if args.yes {
        true
    } else {
        prompt::read_confirmation().await?
    };
    if !confirmed {
        ctl.on_cancel();
        eprintln!("{}", ":: cancelled ::".bold().white());
        return Ok(());
    }

    let pb = spinner(format!(
        "{} {}",
        "deleting ::".bold().white(),
        key.field.bold().blue()
    ));
    let outcome = ctl.on_confirm(&mut page).await;
    pb.finish_and_clear();

    match outcome {
        Some(DeleteOutcome::Applied { .. }) => Ok(()),
        Some(DeleteOutcome::Rejected { message }) | Some(DeleteOutcome::Transport { message }) => {
            Err(format!("deletion not applied: {message}"))
        }
        None => Err("nothing to confirm".to_string()),
    }
}

/// Picks the report format from `--output-format`, then the output file's
/// extension, then the config. The report only exists as text or json.
fn report_format(args: &ReportArgs, configured: Option<&str>) -> Result<OutputFormat, String> {
    let format = args
        .output_format
        .as_deref()
        .and_then(OutputFormat::parse)
        .or_else(|| args.output.as_deref().and_then(output::infer_format_from_path))
        .or_else(|| configured.and_then(OutputFormat::parse))
        .unwrap_or(OutputFormat::Text);
    match format {
        OutputFormat::Html => Err(format!(
            "the report cannot be written as html{}, use text or json",
            args.output
                .as_deref()
                .map(|p| format!(" ({p})"))
                .unwrap_or_default()
        )),
        other => Ok(other),
    }
}

fn run_report(run: &RunConfig, args: &ReportArgs) -> Result<(), String> {
    let cards = snapshot::load_cards(&config::expand_tilde(&args.input))
        .map_err(|e| e.to_string())?;
    tracing::info!(cards = cards.len(), input = %args.input, "snapshot loaded");

    let format = report_format(args, run.output_format.as_deref())?;

    if args.clipboard {
        if format == OutputFormat::Json {
            return Err("the clipboard only takes the text report".to_string());
        }
        let mut sink = SystemClipboard;
        let mut notifier = ConsoleNotifier;
        return match clipboard::copy_report(&cards, &mut sink, &mut notifier) {
            CopyOutcome::Copied { bytes } => {
                tracing::info!(bytes, "report on clipboard");
                Ok(())
            }
            CopyOutcome::Nothing => {
                tracing::warn!("snapshot has no result cards; nothing copied");
                Ok(())
            }
            CopyOutcome::Failed { reason } => Err(reason),
        };
    }

    let bytes = match format {
        OutputFormat::Json => output::render_json(&cards),
        OutputFormat::Text => output::render_text(&cards),
        OutputFormat::Html => return Err("the report has no html form".to_string()),
    };
    let text = String::from_utf8_lossy(&bytes);
    match args.output.as_deref() {
        Some(path) => {
            let path = config::expand_tilde(path);
            let mut sink = FileSink { path: path.clone() };
            sink.write_text(&text).map_err(|e| e.to_string())?;
            format_kv_line("Output", &path.display().to_string());
            Ok(())
        }
        None => StdoutSink.write_text(&text).map_err(|e| e.to_string()),
    }
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    if run.verbose > 0 {
        format_kv_line("Service", &run.client.base_url);
        format_kv_line("Token", if run.has_token { "set" } else { "missing" });
    }

    match &run.command {
        Command::Search(args) => run_search(&run, args).await,
        Command::Delete(args) => run_delete(&run, args).await,
        Command::Report(args) => run_report(&run, args),
    }
}

fn config_path(args: &CliArgs) -> Option<PathBuf> {
    match args.config.as_deref() {
        Some(p) => Some(config::expand_tilde(p)),
        None => config::default_config_path(),
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    if args.init_config {
        let path = config_path(&args).ok_or_else(|| "no home directory for config".to_string())?;
        if config::ensure_default_config_file(&path)? {
            format_kv_line("Config", &format!("written to {}", path.display()));
        } else {
            format_kv_line("Config", &format!("{} already exists", path.display()));
        }
        return Ok(());
    }

    let cfg = match (args.config.as_deref(), config_path(&args)) {
        (Some(_), Some(path)) => config::load_config(&path, false)?,
        (None, Some(path)) => config::load_config(&path, true)?,
        (_, None) => ConfigFile::default(),
    };

    if args.command.is_none() {
        let mut cmd = CliArgs::command();
        print!("{}", cmd.render_help());
        return Ok(());
    }

    let run = build_run_config(args, cfg)?;
    logging::init(run.verbose, !run.no_color).map_err(|e| e.to_string())?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn token_flag_builds_page_url() {
        let args = CliArgs::parse_from([
            "samplekeeper",
            "-u",
            "http://svc.local:5000/",
            "-k",
            "abc",
            "search",
            "-l",
            "1",
            "-f",
            "NCM",
        ]);
        let run = build_run_config(args, ConfigFile::default()).unwrap();
        assert!(run.has_token);
        assert_eq!(
            PageLocation::new(run.page_href.as_str()).token().as_deref(),
            Some("abc")
        );
        assert!(run.page_href.starts_with("http://svc.local:5000/history_ia"));
    }

    #[test]
    fn page_url_wins_over_config_token() {
        let args = CliArgs::parse_from([
            "samplekeeper",
            "--page-url",
            "http://svc.local/history_ia?token=from-page",
            "delete",
            "-l",
            "1",
            "-f",
            "NCM",
        ]);
        let cfg = ConfigFile {
            token: Some("from-config".to_string()),
            ..ConfigFile::default()
        };
        let run = build_run_config(args, cfg).unwrap();
        assert_eq!(
            PageLocation::new(run.page_href.as_str()).token().as_deref(),
            Some("from-page")
        );
    }

    #[test]
    fn config_enables_stale_guard_and_notice_duration() {
        let args = CliArgs::parse_from(["samplekeeper", "search", "-l", "1", "-f", "NCM"]);
        let cfg = ConfigFile {
            discard_stale_searches: Some(true),
            notice_duration_ms: Some(1500),
            ..ConfigFile::default()
        };
        let run = build_run_config(args, cfg).unwrap();
        let options = controller_options(&run);
        assert_eq!(options.search_ordering, SearchOrdering::DiscardStale);
        assert_eq!(options.notice_duration, Duration::from_millis(1500));
        assert!(!run.has_token);
    }

    #[test]
    fn missing_subcommand_is_an_error() {
        let args = CliArgs::parse_from(["samplekeeper"]);
        assert!(build_run_config(args, ConfigFile::default()).is_err());
    }

    fn report_args(argv: &[&str]) -> ReportArgs {
        match CliArgs::parse_from(argv).command {
            Some(Command::Report(report)) => report,
            other => panic!("expected report command, got {other:?}"),
        }
    }

    #[test]
    fn report_refuses_html_from_every_source() {
        let by_path = report_args(&["samplekeeper", "report", "-i", "r.json", "-o", "out.html"]);
        assert!(report_format(&by_path, None).unwrap_err().contains("out.html"));

        let plain = report_args(&["samplekeeper", "report", "-i", "r.json"]);
        assert!(report_format(&plain, Some("html")).is_err());
        assert_eq!(report_format(&plain, Some("json")).unwrap(), OutputFormat::Json);
        assert_eq!(report_format(&plain, None).unwrap(), OutputFormat::Text);

        let args = CliArgs::parse_from(["samplekeeper", "report", "-i", "r.json"]);
        let cfg = ConfigFile {
            output_format: Some("html".to_string()),
            ..ConfigFile::default()
        };
        assert!(build_run_config(args, cfg).unwrap_err().contains("expected text or json"));
    }
}
