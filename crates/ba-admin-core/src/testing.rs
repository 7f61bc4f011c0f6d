//! In-memory doubles for the session's collaborators.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::clock::Clock;
use crate::config_store::{ConfigPayload, StoredConfig};
use crate::error::{AdminError, Result};
use crate::gateway_cache::DomainDisplay;
use crate::transport::{ApiRequest, ApiResponse, ApiTransport};
use crate::view::{
    Action, AdminView, Field, FormOutcome, Notifier, ServerOptionsView, ToastLevel,
};

#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Response(ApiResponse),
    Network(String),
    Timeout,
}

#[derive(Debug, Clone)]
struct Scripted {
    reply: Reply,
    delay: Option<Duration>,
}

/// Replies per path in FIFO order. The last scripted reply for a path is
/// repeated once the queue is down to it.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: RefCell<HashMap<&'static str, VecDeque<Scripted>>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, path: &'static str, reply: Reply, delay: Option<Duration>) {
        self.replies
            .borrow_mut()
            .entry(path)
            .or_default()
            .push_back(Scripted { reply, delay });
    }

    pub fn respond(&self, path: &'static str, response: ApiResponse) {
        self.push(path, Reply::Response(response), None);
    }

    /// Reply only after `delay` has elapsed on the tokio clock.
    pub fn respond_after(&self, path: &'static str, delay: Duration, response: ApiResponse) {
        self.push(path, Reply::Response(response), Some(delay));
    }

    pub fn fail_network(&self, path: &'static str, reason: &str) {
        self.push(path, Reply::Network(reason.to_owned()), None);
    }

    pub fn fail_timeout(&self, path: &'static str) {
        self.push(path, Reply::Timeout, None);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    fn next(&self, path: &str) -> Option<Scripted> {
        let mut replies = self.replies.borrow_mut();
        let queue = replies.get_mut(path)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait(?Send)]
impl ApiTransport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let path = request.path;
        self.requests.borrow_mut().push(request);
        let Some(scripted) = self.next(path) else {
            return Err(AdminError::Network(format!("nothing scripted for {path}")));
        };
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        match scripted.reply {
            Reply::Response(response) => Ok(response),
            Reply::Network(reason) => Err(AdminError::Network(reason)),
            Reply::Timeout => Err(AdminError::Timeout),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    ConfigStatus(String),
    Domain(DomainDisplay),
    Outcome(FormOutcome),
    ServerOptions(ServerOptionsView),
    ModalOpened(Option<ConfigPayload>),
    ModalClosed,
    PasswordCleared,
    InvalidField(Field),
    Busy(Action, bool),
}

#[derive(Debug, Default)]
pub struct RecordingView {
    events: RefCell<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.borrow().clone()
    }

    pub fn domains(&self) -> Vec<DomainDisplay> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Domain(d) => Some(d.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_domain(&self) -> Option<DomainDisplay> {
        self.domains().pop()
    }

    pub fn outcomes(&self) -> Vec<FormOutcome> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Outcome(o) => Some(o.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_outcome(&self) -> Option<FormOutcome> {
        self.outcomes().pop()
    }

    pub fn last_server_options(&self) -> Option<ServerOptionsView> {
        self.events.borrow().iter().rev().find_map(|e| match e {
            ViewEvent::ServerOptions(o) => Some(o.clone()),
            _ => None,
        })
    }

    /// Busy state most recently shown for `action`.
    pub fn last_busy(&self, action: Action) -> Option<bool> {
        self.events.borrow().iter().rev().find_map(|e| match e {
            ViewEvent::Busy(a, busy) if *a == action => Some(*busy),
            _ => None,
        })
    }

    pub fn last_config_status(&self) -> Option<String> {
        self.events.borrow().iter().rev().find_map(|e| match e {
            ViewEvent::ConfigStatus(s) => Some(s.clone()),
            _ => None,
        })
    }

    pub fn contains(&self, event: &ViewEvent) -> bool {
        self.events.borrow().contains(event)
    }

    fn record(&self, event: ViewEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl AdminView for RecordingView {
    fn show_config_status(&self, config: &StoredConfig) {
        self.record(ViewEvent::ConfigStatus(config.status_text()));
    }

    fn show_domain(&self, display: &DomainDisplay) {
        self.record(ViewEvent::Domain(display.clone()));
    }

    fn show_outcome(&self, outcome: &FormOutcome) {
        self.record(ViewEvent::Outcome(outcome.clone()));
    }

    fn show_server_options(&self, options: &ServerOptionsView) {
        self.record(ViewEvent::ServerOptions(options.clone()));
    }

    fn open_config_modal(&self, current: Option<&ConfigPayload>) {
        self.record(ViewEvent::ModalOpened(current.cloned()));
    }

    fn close_config_modal(&self) {
        self.record(ViewEvent::ModalClosed);
    }

    fn clear_password_input(&self) {
        self.record(ViewEvent::PasswordCleared);
    }

    fn flag_invalid_field(&self, field: Field) {
        self.record(ViewEvent::InvalidField(field));
    }

    fn set_busy(&self, action: Action, busy: bool) {
        self.record(ViewEvent::Busy(action, busy));
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: RefCell<Vec<(ToastLevel, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<(ToastLevel, String)> {
        self.toasts.borrow().clone()
    }

    pub fn last(&self) -> Option<(ToastLevel, String)> {
        self.toasts.borrow().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn toast(&self, level: ToastLevel, message: &str) {
        self.toasts.borrow_mut().push((level, message.to_owned()));
    }
}
