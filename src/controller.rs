//! Turns page gestures into service calls and applies the answers.
//!
//! Every handler reads what it needs from the page before the first await.
//! The page may look different by the time a response arrives; patches are
//! applied against the element captured at gesture time.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use crate::gate::{ActionKind, ConfirmationGate, ModalPresenter, PendingAction};
use crate::notify::{Notice, NoticeKind, Notifier, DEFAULT_NOTICE_DURATION};
use crate::service::{
    MutationRequest, MutationResponse, PageLocation, SampleService, SearchRequest, ServiceError,
};
use crate::view::{
    ElementRef, FieldKey, PlaceholderTone, SamplePage, EMPTY_SEARCH_TEXT, SEARCH_ERROR_TEXT,
};

pub const DELETE_FALLBACK_MESSAGE: &str = "Erro ao excluir.";
pub const CONNECTION_ERROR_MESSAGE: &str = "Erro de conexão.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GestureError {
    #[error("element is not a delete affordance")]
    NotDeletable,

    #[error("element is not a search input")]
    NotSearchInput,
}

/// How responses to overlapping searches on one field are applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchOrdering {
    /// Whatever arrives last is rendered, even if it answers an older query.
    #[default]
    Arrival,
    /// Responses older than the latest issued search for the field are dropped.
    DiscardStale,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Applied { kind: ActionKind, message: String },
    Rejected { message: String },
    Transport { message: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Rendered { count: usize },
    Empty,
    Failed,
    Stale,
}

/// A search that has been issued but not yet applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchTicket {
    pub key: FieldKey,
    pub seq: u64,
    pub request: SearchRequest,
}

#[derive(Clone, Debug)]
pub struct ControllerOptions {
    pub notice_duration: Duration,
    pub search_ordering: SearchOrdering,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            notice_duration: DEFAULT_NOTICE_DURATION,
            search_ordering: SearchOrdering::Arrival,
        }
    }
}

pub struct SampleCurationController<S, P, N> {
    service: S,
    gate: ConfirmationGate<P>,
    notifier: N,
    location: PageLocation,
    options: ControllerOptions,
    issued: HashMap<FieldKey, u64>,
}

impl<S, P, N> SampleCurationController<S, P, N>
where
    S: SampleService,
    P: ModalPresenter,
    N: Notifier,
{
    pub fn new(service: S, presenter: P, notifier: N, location: PageLocation) -> Self {
        Self::with_options(
            service,
            presenter,
            notifier,
            location,
            ControllerOptions::default(),
        )
    }

    pub fn with_options(
        service: S,
        presenter: P,
        notifier: N,
        location: PageLocation,
        options: ControllerOptions,
    ) -> Self {
        Self {
            service,
            gate: ConfirmationGate::new(presenter),
            notifier,
            location,
            options,
            issued: HashMap::new(),
        }
    }

    pub fn gate(&self) -> &ConfirmationGate<P> {
        &self.gate
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn location(&self) -> &PageLocation {
        &self.location
    }

    /// Shows the backend's page-load message, if the page carries one.
    pub fn announce_backend_message(&mut self, page: &SamplePage) {
        if let Some(message) = page.backend_message() {
            self.emit(message.to_string(), NoticeKind::Info);
        }
    }

    pub fn on_delete_gesture(
        &mut self,
        page: &SamplePage,
        target: &ElementRef,
    ) -> Result<(), GestureError> {
        let attrs = page
            .delete_attrs(target)
            .ok_or(GestureError::NotDeletable)?;
        let action = PendingAction {
            layout: attrs.layout,
            field: attrs.field,
            value: attrs.value,
            target: target.clone(),
        };
        let message = action.confirmation_message();
        tracing::debug!(
            layout = %action.layout,
            field = %action.field,
            kind = action.kind().wire_name(),
            "delete requested"
        );
        self.gate.request_confirmation(action, message);
        Ok(())
    }

    pub fn on_cancel(&mut self) {
        self.gate.cancel();
    }

    /// Sends the pending deletion and settles it. The modal is dismissed once,
    /// after the outcome is known.
    pub async fn on_confirm(&mut self, page: &mut SamplePage) -> Option<DeleteOutcome> {
        let Some(action) = self.gate.confirm() else {
            self.gate.dismiss();
            return None;
        };
        let kind = action.kind();
        let request = MutationRequest {
            token: self.location.token().unwrap_or_default(),
            layout: action.layout.clone(),
            field: action.field.clone(),
            value: action.value.clone().unwrap_or_default(),
            action: kind.wire_name().to_string(),
        };

        let result = self.service.mutate(request).await;
        let outcome = self.settle_delete(page, &action, result);
        self.gate.dismiss();
        Some(outcome)
    }

    fn settle_delete(
        &mut self,
        page: &mut SamplePage,
        action: &PendingAction,
        result: Result<MutationResponse, ServiceError>,
    ) -> DeleteOutcome {
        match result {
            Ok(resp) if resp.success => {
                let kind = action.kind();
                let patched = match kind {
                    ActionKind::DeleteValue => page.remove_item(&action.target),
                    ActionKind::ClearField => page.clear_field(&action.target),
                };
                if !patched {
                    tracing::warn!(field = %action.field, "deleted element no longer on page");
                }
                let message = resp.message.unwrap_or_default();
                self.emit(message.clone(), NoticeKind::Success);
                DeleteOutcome::Applied { kind, message }
            }
            Ok(resp) => {
                let message = resp
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| DELETE_FALLBACK_MESSAGE.to_string());
                self.emit(message.clone(), NoticeKind::Error);
                DeleteOutcome::Rejected { message }
            }
            Err(e) => {
                tracing::warn!(error = %e, "delete request failed");
                self.emit(CONNECTION_ERROR_MESSAGE.to_string(), NoticeKind::Error);
                DeleteOutcome::Transport {
                    message: CONNECTION_ERROR_MESSAGE.to_string(),
                }
            }
        }
    }

    /// Search button click.
    pub async fn on_search_gesture(
        &mut self,
        page: &mut SamplePage,
        input: &ElementRef,
    ) -> Result<SearchOutcome, GestureError> {
        let ticket = self.begin_search(page, input)?;
        let result = self.service.search(ticket.request.clone()).await;
        Ok(self.apply_search(page, &ticket, result))
    }

    /// Key release inside the search input; only Enter searches.
    pub async fn on_search_key(
        &mut self,
        page: &mut SamplePage,
        input: &ElementRef,
        key: &str,
    ) -> Option<Result<SearchOutcome, GestureError>> {
        if key != "Enter" {
            return None;
        }
        Some(self.on_search_gesture(page, input).await)
    }

    /// Reads the query off the input and numbers it. Nothing is sent yet.
    pub fn begin_search(
        &mut self,
        page: &SamplePage,
        input: &ElementRef,
    ) -> Result<SearchTicket, GestureError> {
        let (key, term) = page
            .search_input(input)
            .ok_or(GestureError::NotSearchInput)?;
        let seq = self.issued.entry(key.clone()).or_insert(0);
        *seq += 1;
        let request = SearchRequest {
            token: self.location.token().unwrap_or_default(),
            layout: key.layout.clone(),
            field: key.field.clone(),
            term,
        };
        tracing::debug!(field = %key.field, seq = *seq, term = %request.term, "search issued");
        Ok(SearchTicket {
            seq: *seq,
            key,
            request,
        })
    }

    pub fn apply_search(
        &mut self,
        page: &mut SamplePage,
        ticket: &SearchTicket,
        result: Result<Vec<String>, ServiceError>,
    ) -> SearchOutcome {
        if self.options.search_ordering == SearchOrdering::DiscardStale {
            let latest = self.issued.get(&ticket.key).copied().unwrap_or(0);
            if ticket.seq < latest {
                tracing::debug!(field = %ticket.key.field, seq = ticket.seq, latest, "stale search dropped");
                return SearchOutcome::Stale;
            }
        }
        match result {
            Ok(values) if !values.is_empty() => {
                page.replace_samples(&ticket.key, &values);
                SearchOutcome::Rendered {
                    count: values.len(),
                }
            }
            Ok(_) => {
                page.show_placeholder(&ticket.key, EMPTY_SEARCH_TEXT, PlaceholderTone::Muted);
                SearchOutcome::Empty
            }
            Err(e) => {
                tracing::warn!(error = %e, field = %ticket.key.field, "search failed");
                page.show_placeholder(&ticket.key, SEARCH_ERROR_TEXT, PlaceholderTone::Danger);
                SearchOutcome::Failed
            }
        }
    }

    fn emit(&mut self, message: String, kind: NoticeKind) {
        self.notifier.notify(Notice {
            message,
            kind,
            duration: self.options.notice_duration,
        });
    }
}
