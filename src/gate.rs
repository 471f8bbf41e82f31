use crate::view::ElementRef;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    DeleteValue,
    ClearField,
}

impl ActionKind {
    /// The `acao` value the service expects.
    pub fn wire_name(self) -> &'static str {
        match self {
            ActionKind::DeleteValue => "delvalor",
            ActionKind::ClearField => "delcampo",
        }
    }
}

/// A delete intent waiting for the user's answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingAction {
    pub layout: String,
    pub field: String,
    pub value: Option<String>,
    pub target: ElementRef,
}

impl PendingAction {
    pub fn kind(&self) -> ActionKind {
        match self.value.as_deref() {
            Some(v) if !v.is_empty() => ActionKind::DeleteValue,
            _ => ActionKind::ClearField,
        }
    }

    pub fn confirmation_message(&self) -> String {
        match (self.kind(), self.value.as_deref()) {
            (ActionKind::DeleteValue, Some(value)) => format!(
                "Tem certeza que deseja excluir o valor \"{}\" do campo \"{}\"?",
                value, self.field
            ),
            _ => format!(
                "Tem certeza que deseja limpar TODAS as amostras do campo \"{}\"? Esta ação não pode ser desfeita.",
                self.field
            ),
        }
    }
}

/// Presentation side of the confirmation modal.
///
/// While shown, the presenter must keep every other gesture from reaching
/// the gate; the gate relies on that and does not re-check it.
pub trait ModalPresenter {
    fn show(&mut self, message: &str);
    fn hide(&mut self);
}

/// Single-slot holder for the pending action plus the modal it drives.
///
/// A new request replaces whatever was pending (last write wins, nothing is
/// queued).
#[derive(Debug)]
pub struct ConfirmationGate<P> {
    presenter: P,
    pending: Option<PendingAction>,
    message: String,
    open: bool,
}

impl<P: ModalPresenter> ConfirmationGate<P> {
    pub fn new(presenter: P) -> Self {
        Self {
            presenter,
            pending: None,
            message: String::new(),
            open: false,
        }
    }

    pub fn request_confirmation(&mut self, action: PendingAction, message: String) {
        if let Some(previous) = self.pending.replace(action) {
            tracing::debug!(field = %previous.field, "pending action replaced");
        }
        self.presenter.show(&message);
        self.message = message;
        self.open = true;
    }

    /// Hands out the action that was live when the modal was shown. The modal
    /// stays open until [`ConfirmationGate::dismiss`].
    pub fn confirm(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.dismiss();
    }

    pub fn dismiss(&mut self) {
        self.pending = None;
        self.message.clear();
        if self.open {
            self.open = false;
            self.presenter.hide();
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }
}

/// Presenter that only remembers what it was asked to do. Useful when the
/// decision comes from somewhere other than a visible modal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeadlessModal {
    pub visible: bool,
    pub shown: Vec<String>,
    pub hide_count: usize,
}

impl ModalPresenter for HeadlessModal {
    fn show(&mut self, message: &str) {
        self.visible = true;
        self.shown.push(message.to_string());
    }

    fn hide(&mut self) {
        self.visible = false;
        self.hide_count += 1;
    }
}
