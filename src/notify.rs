use std::time::Duration;

use colored::Colorize;

/// How long a notice stays on screen unless configured otherwise.
pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_millis(3000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

impl NoticeKind {
    pub fn label(self) -> &'static str {
        match self {
            NoticeKind::Info => "info",
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    pub duration: Duration,
}

/// Fire-and-forget sink for user-visible messages.
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&mut self, notice: Notice) {
        (**self).notify(notice)
    }
}

// prints notices to the terminal, colored by kind
#[derive(Clone, Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, notice: Notice) {
        match notice.kind {
            NoticeKind::Success => {
                tracing::info!(message = %notice.message, "notice");
                println!("{} {}", "::".bold().green(), notice.message.green());
            }
            NoticeKind::Error => {
                tracing::warn!(message = %notice.message, "notice");
                println!("{} {}", "::".bold().red(), notice.message.red());
            }
            NoticeKind::Info => {
                tracing::info!(message = %notice.message, "notice");
                println!("{} {}", "::".bold().cyan(), notice.message.cyan());
            }
        }
    }
}

/// Keeps every notice it receives, in order.
#[derive(Clone, Debug, Default)]
pub struct MemoryNotifier {
    pub notices: Vec<Notice>,
}

impl MemoryNotifier {
    pub fn last(&self) -> Option<&Notice> {
        self.notices.last()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}
