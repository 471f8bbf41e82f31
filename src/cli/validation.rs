use crate::cli::args::{CliArgs, Command, FieldArgs};
use crate::output::OutputFormat;

fn validate_target(target: &FieldArgs) -> Result<(), String> {
    if target.layout.trim().is_empty() {
        return Err("invalid --layout, expected a non-empty identifier".to_string());
    }
    if target.field.trim().is_empty() {
        return Err("invalid --field, expected a non-empty name".to_string());
    }
    Ok(())
}

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive number of seconds".to_string());
        }
    }
    if let Some(raw) = args.base_url.as_deref() {
        reqwest::Url::parse(raw.trim()).map_err(|e| format!("invalid --base-url '{raw}': {e}"))?;
    }
    if let Some(raw) = args.page_url.as_deref() {
        reqwest::Url::parse(raw.trim()).map_err(|e| format!("invalid --page-url '{raw}': {e}"))?;
    }
    match args.command.as_ref() {
        Some(Command::Search(search)) => validate_target(&search.target)?,
        Some(Command::Delete(delete)) => {
            validate_target(&delete.target)?;
            // an empty value would silently turn into "clear the whole field"
            if delete.value.as_deref().is_some_and(|v| v.is_empty()) {
                return Err(
                    "invalid --value, expected a non-empty sample (omit it to clear the field)"
                        .to_string(),
                );
            }
        }
        Some(Command::Report(report)) => {
            if report.input.trim().is_empty() {
                return Err("invalid --input, expected a snapshot file".to_string());
            }
            if let Some(raw) = report.output_format.as_deref() {
                match OutputFormat::parse(raw) {
                    Some(OutputFormat::Text) | Some(OutputFormat::Json) => {}
                    _ => return Err(format!("invalid --output-format '{raw}', expected text or json")),
                }
            }
            if report.clipboard && report.output.is_some() {
                return Err("use either --clipboard or --output, not both".to_string());
            }
        }
        None => {}
    }
    Ok(())
}
