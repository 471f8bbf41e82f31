use std::io::Write;

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::gate::ModalPresenter;

/// Confirmation modal drawn on the terminal. While it is up, the only input
/// read is the answer line, so no other gesture can reach the gate.
#[derive(Clone, Debug, Default)]
pub struct TerminalModal {
    visible: bool,
}

impl TerminalModal {
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl ModalPresenter for TerminalModal {
    fn show(&mut self, message: &str) {
        self.visible = true;
        println!("{} {}", "??".bold().yellow(), message.bold());
    }

    fn hide(&mut self) {
        self.visible = false;
        tracing::debug!("confirmation closed");
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "sim"
    )
}

/// Reads one answer line from stdin. End of input counts as "no".
pub async fn read_confirmation() -> Result<bool, String> {
    print!("{} ", "[s/N]".bold());
    std::io::stdout()
        .flush()
        .map_err(|e| format!("failed to flush stdout: {e}"))?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    match lines.next_line().await {
        Ok(Some(line)) => Ok(is_affirmative(&line)),
        Ok(None) => Ok(false),
        Err(e) => Err(format!("failed to read confirmation: {e}")),
    }
}
