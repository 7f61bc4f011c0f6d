//! Page session.
//!
//! [`AdminSession`] owns the config store, gateway cache, resolver and API
//! client for one page load, together with the injected view, notifier and
//! clock. Every user action is a method here; none of them returns a failure
//! except [`AdminError::SessionClosed`], the rest is rendered.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use ba_storage::SlotStore;
use tracing::{debug, info, warn};

use crate::api::AdminApi;
use crate::clock::Clock;
use crate::config_store::{ConfigKind, ConfigPayload, ConfigStore, StoredConfig};
use crate::controllers::{self, ConfigForm, Rejection};
use crate::error::{AdminError, Result};
use crate::gateway_cache::{DomainDisplay, GatewayCache};
use crate::generation::{Delivery, RequestGenerations, Slot, Ticket};
use crate::messages::{NACOS_NOT_CONFIGURED, friendly_message, transport_message};
use crate::resolver::GatewayResolver;
use crate::server_options::{contains_address, prepare_options};
use crate::transport::ApiTransport;
use crate::view::{
    Action, AdminView, Field, FormOutcome, Notifier, OutcomeStatus, ResultArea, ServerOptionsView,
    ToastLevel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Running,
    Closed,
}

/// Collaborators a session is built from.
pub struct SessionDeps {
    pub slots: Rc<dyn SlotStore>,
    pub transport: Rc<dyn ApiTransport>,
    pub view: Rc<dyn AdminView>,
    pub notifier: Rc<dyn Notifier>,
    pub clock: Rc<dyn Clock>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSaveOutcome {
    Saved {
        config: StoredConfig,
        /// The address was unknown to the backend and was registered first.
        registered: bool,
    },
    Rejected(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnvironmentOutcome {
    Switched(StoredConfig),
    Rejected(String),
    Failed(String),
}

pub struct AdminSession {
    state: Cell<SessionState>,
    config: ConfigStore,
    cache: GatewayCache,
    api: AdminApi,
    resolver: GatewayResolver,
    generations: Rc<RequestGenerations>,
    /// In-flight requests per action, superseded ones included.
    pending: RefCell<HashMap<Action, usize>>,
    view: Rc<dyn AdminView>,
    notifier: Rc<dyn Notifier>,
}

impl AdminSession {
    pub fn new(deps: SessionDeps) -> Self {
        let config = ConfigStore::new(deps.slots.clone(), deps.clock.clone());
        let cache = GatewayCache::new(deps.slots, deps.clock);
        let api = AdminApi::new(deps.transport);
        let generations = Rc::new(RequestGenerations::new());
        let resolver = GatewayResolver::new(
            config.clone(),
            cache.clone(),
            api.clone(),
            generations.clone(),
            deps.view.clone(),
        );
        Self {
            state: Cell::new(SessionState::Created),
            config,
            cache,
            api,
            resolver,
            generations,
            pending: RefCell::new(HashMap::new()),
            view: deps.view,
            notifier: deps.notifier,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.config
    }

    pub fn gateway_cache(&self) -> &GatewayCache {
        &self.cache
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state.get() == SessionState::Closed {
            return Err(AdminError::SessionClosed);
        }
        Ok(())
    }

    // ── Lifecycle ──

    /// Repair and show the stored config, then resolve the gateway and load
    /// the server list. A second call on a running session is a no-op.
    pub async fn init(&self) -> Result<()> {
        match self.state.get() {
            SessionState::Closed => return Err(AdminError::SessionClosed),
            SessionState::Running => return Ok(()),
            SessionState::Created => self.state.set(SessionState::Running),
        }

        let config = match self.config.load_and_repair() {
            Some(loaded) => {
                if loaded.repaired {
                    info!("stored config repaired");
                }
                loaded.config
            }
            None => {
                debug!("no stored config, saving an empty nacos config");
                match self.config.save(ConfigKind::Nacos, ConfigPayload::default()) {
                    Ok(saved) => saved,
                    Err(err) => {
                        warn!(error = %err, "failed to save default config");
                        StoredConfig {
                            kind: ConfigKind::Nacos,
                            data: ConfigPayload::default(),
                            timestamp: 0,
                        }
                    }
                }
            }
        };
        self.view.show_config_status(&config);

        self.resolver.resolve().await;
        self.load_server_options().await?;
        info!("session started");
        Ok(())
    }

    /// Drop every in-flight response and refuse further actions.
    pub fn teardown(&self) {
        if self.state.replace(SessionState::Closed) != SessionState::Closed {
            self.generations.invalidate_all();
            info!("session closed");
        }
    }

    // ── Config ──

    /// Persist a config, show its status and re-resolve the gateway.
    pub async fn save_config(&self, kind: ConfigKind, payload: ConfigPayload) -> Result<StoredConfig> {
        self.ensure_open()?;
        let saved = self.config.save(kind, payload)?;
        self.view.show_config_status(&saved);
        self.resolver.resolve().await;
        Ok(saved)
    }

    /// Show the config modal prefilled from storage and refresh the server list.
    pub async fn open_config(&self) -> Result<()> {
        self.ensure_open()?;
        let current = self.config.load();
        self.view.open_config_modal(current.as_ref().map(|c| &c.data));
        self.load_server_options().await?;
        Ok(())
    }

    pub async fn save_config_form(&self, form: ConfigForm) -> Result<Delivery<ConfigSaveOutcome>> {
        self.ensure_open()?;
        let ticket = self.generations.issue(Slot::ConfigSave);

        let payload = match controllers::config_payload(&form) {
            Ok(payload) => payload,
            Err(rejection) => {
                let message = self.reject(None, rejection);
                return Ok(Delivery::Applied(ConfigSaveOutcome::Rejected(message)));
            }
        };

        self.begin(Action::SaveConfig);
        let registered = self.register_server(&payload).await;
        self.finish(Action::SaveConfig);
        if !self.generations.is_current(ticket) {
            debug!("config save superseded");
            let outcome = match registered {
                Ok(registered) => ConfigSaveOutcome::Saved {
                    config: StoredConfig {
                        kind: ConfigKind::Nacos,
                        data: payload,
                        timestamp: 0,
                    },
                    registered,
                },
                Err(message) => ConfigSaveOutcome::Failed(message),
            };
            return Ok(Delivery::Superseded(outcome));
        }

        let registered = match registered {
            Ok(registered) => registered,
            Err(message) => {
                self.notifier.toast(ToastLevel::Error, &message);
                return Ok(Delivery::Applied(ConfigSaveOutcome::Failed(message)));
            }
        };

        let saved = match self.save_config(ConfigKind::Nacos, payload).await {
            Ok(saved) => saved,
            Err(AdminError::SessionClosed) => return Err(AdminError::SessionClosed),
            Err(err) => {
                warn!(error = %err, "failed to store config");
                let message = transport_message(&err);
                self.notifier.toast(ToastLevel::Error, &message);
                return Ok(Delivery::Applied(ConfigSaveOutcome::Failed(message)));
            }
        };

        self.view.close_config_modal();
        let toast = if registered {
            "Nacos config saved and connected"
        } else {
            "Connected to Nacos"
        };
        self.notifier.toast(ToastLevel::Success, toast);
        self.load_server_options().await?;

        Ok(Delivery::Applied(ConfigSaveOutcome::Saved {
            config: saved,
            registered,
        }))
    }

    /// Register the address with the backend unless it is already known.
    /// Returns whether it was registered, or the message to show.
    async fn register_server(&self, payload: &ConfigPayload) -> std::result::Result<bool, String> {
        let address = payload.server_address().unwrap_or_default();
        let known = self.api.get_nacos_configs().await.map_err(|err| {
            warn!(error = %err, "failed to list known servers");
            transport_message(&err)
        })?;
        if contains_address(&prepare_options(known), address) {
            debug!(%address, "server already known");
            return Ok(false);
        }

        info!(%address, "registering new nacos server");
        let envelope = self
            .api
            .save_nacos_config(&payload.to_save_request())
            .await
            .map_err(|err| {
                warn!(error = %err, "failed to register server");
                transport_message(&err)
            })?;
        if !envelope.success {
            let raw = envelope.message.as_deref().unwrap_or("Failed to save config");
            return Err(friendly_message(raw));
        }
        Ok(true)
    }

    pub async fn load_server_options(&self) -> Result<Delivery<ServerOptionsView>> {
        self.ensure_open()?;
        let ticket = self.generations.issue(Slot::ServerOptions);
        self.view.show_server_options(&ServerOptionsView::Loading);

        let shown = match self.api.get_nacos_configs().await {
            Ok(options) => {
                let options = prepare_options(options);
                if options.is_empty() {
                    ServerOptionsView::Empty
                } else {
                    ServerOptionsView::Items(options)
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to load server options");
                ServerOptionsView::Failed(transport_message(&err))
            }
        };

        if !self.generations.is_current(ticket) {
            return Ok(Delivery::Superseded(shown));
        }
        self.view.show_server_options(&shown);
        Ok(Delivery::Applied(shown))
    }

    pub async fn resolve_gateway(&self) -> Result<Delivery<DomainDisplay>> {
        self.ensure_open()?;
        Ok(self.resolver.resolve().await)
    }

    pub async fn switch_environment(&self, environment: &str) -> Result<Delivery<EnvironmentOutcome>> {
        self.ensure_open()?;
        let ticket = self.generations.issue(Slot::Environment);

        let environment = match crate::validation::require(environment, "Select an environment") {
            Ok(env) => env,
            Err(err) => {
                let message = self.reject(
                    None,
                    Rejection::Invalid {
                        field: Field::Environment,
                        message: err.to_string(),
                    },
                );
                return Ok(Delivery::Applied(EnvironmentOutcome::Rejected(message)));
            }
        };

        self.begin(Action::SwitchEnvironment);
        let result = self.api.set_environment(&environment).await;
        self.finish(Action::SwitchEnvironment);
        if !self.generations.is_current(ticket) {
            let outcome = match result {
                Ok(resp) if resp.success => EnvironmentOutcome::Switched(StoredConfig {
                    kind: ConfigKind::Environment,
                    data: environment_payload(resp.environment.unwrap_or(environment)),
                    timestamp: 0,
                }),
                Ok(resp) => EnvironmentOutcome::Failed(resp.message.unwrap_or_default()),
                Err(err) => EnvironmentOutcome::Failed(transport_message(&err)),
            };
            return Ok(Delivery::Superseded(outcome));
        }

        let failure = match result {
            Ok(resp) if resp.success => {
                let name = resp.environment.unwrap_or(environment);
                return match self
                    .save_config(ConfigKind::Environment, environment_payload(name.clone()))
                    .await
                {
                    Ok(saved) => {
                        info!(environment = %name, "environment switched");
                        let message = resp
                            .message
                            .filter(|m| !m.is_empty())
                            .unwrap_or_else(|| format!("Switched to {name}"));
                        self.notifier.toast(ToastLevel::Success, &message);
                        Ok(Delivery::Applied(EnvironmentOutcome::Switched(saved)))
                    }
                    Err(AdminError::SessionClosed) => Err(AdminError::SessionClosed),
                    Err(err) => {
                        let message = transport_message(&err);
                        self.notifier.toast(ToastLevel::Error, &message);
                        Ok(Delivery::Applied(EnvironmentOutcome::Failed(message)))
                    }
                };
            }
            Ok(resp) => friendly_message(
                resp.message
                    .as_deref()
                    .unwrap_or("Failed to switch environment"),
            ),
            Err(err) => transport_message(&err),
        };
        self.notifier.toast(ToastLevel::Error, &failure);
        Ok(Delivery::Applied(EnvironmentOutcome::Failed(failure)))
    }

    // ── Forms ──

    pub async fn query_balance(&self, phone: &str) -> Result<Delivery<FormOutcome>> {
        self.ensure_open()?;
        let ticket = self.generations.issue(Slot::BalanceResult);
        let config = self.config.load();
        let req = match controllers::balance_query(phone, config.as_ref()) {
            Ok(req) => req,
            Err(rejection) => return Ok(self.rejected_form(ResultArea::Balance, rejection)),
        };
        Ok(self
            .submit(Action::QueryBalance, ticket, self.api.get_balance(&req), controllers::balance_queried)
            .await)
    }

    pub async fn update_balance(&self, phone: &str, balance: &str) -> Result<Delivery<FormOutcome>> {
        self.ensure_open()?;
        let ticket = self.generations.issue(Slot::BalanceResult);
        let config = self.config.load();
        let req = match controllers::balance_update(phone, balance, config.as_ref()) {
            Ok(req) => req,
            Err(rejection) => return Ok(self.rejected_form(ResultArea::Balance, rejection)),
        };
        let delivery = self
            .submit(
                Action::UpdateBalance,
                ticket,
                self.api.update_balance(&req),
                controllers::balance_updated,
            )
            .await;
        if delivery.is_applied() && delivery.value().is_success() {
            self.resolver.resolve().await;
        }
        Ok(delivery)
    }

    pub async fn verify_password(&self, phone: &str, password: &str) -> Result<Delivery<FormOutcome>> {
        self.ensure_open()?;
        let ticket = self.generations.issue(Slot::PasswordResult);
        let config = self.config.load();
        let req = match controllers::password_verify(phone, password, config.as_ref()) {
            Ok(req) => req,
            Err(rejection) => return Ok(self.rejected_form(ResultArea::Password, rejection)),
        };
        Ok(self
            .submit(
                Action::VerifyPassword,
                ticket,
                self.api.verify_password(&req),
                controllers::password_verified,
            )
            .await)
    }

    pub async fn update_password(&self, phone: &str, new_password: &str) -> Result<Delivery<FormOutcome>> {
        self.ensure_open()?;
        let ticket = self.generations.issue(Slot::PasswordResult);
        let config = self.config.load();
        let req = match controllers::password_update(phone, new_password, config.as_ref()) {
            Ok(req) => req,
            Err(rejection) => return Ok(self.rejected_form(ResultArea::Password, rejection)),
        };
        let delivery = self
            .submit(
                Action::UpdatePassword,
                ticket,
                self.api.update_password(&req),
                controllers::password_updated,
            )
            .await;
        if delivery.is_applied() && delivery.value().is_success() {
            self.view.clear_password_input();
        }
        Ok(delivery)
    }

    // ── Helpers ──

    /// Await one form request and render it, unless a newer request for the
    /// same slot was issued meanwhile.
    async fn submit<T, F>(
        &self,
        action: Action,
        ticket: Ticket,
        call: impl Future<Output = Result<T>>,
        render: F,
    ) -> Delivery<FormOutcome>
    where
        F: FnOnce(T) -> FormOutcome,
    {
        let area = action.area().unwrap_or(ResultArea::Balance);
        self.begin(action);
        let outcome = match call.await {
            Ok(response) => render(response),
            Err(err) => {
                warn!(?action, error = %err, "request failed");
                controllers::failed(area, &err)
            }
        };
        self.finish(action);

        if !self.generations.is_current(ticket) {
            debug!(?action, generation = ticket.generation, "stale response dropped");
            return Delivery::Superseded(outcome);
        }
        self.view.show_outcome(&outcome);
        let level = match outcome.status {
            OutcomeStatus::Success => ToastLevel::Success,
            OutcomeStatus::ValidationFailed => ToastLevel::Warning,
            OutcomeStatus::TransportFailed | OutcomeStatus::ApplicationFailed => ToastLevel::Error,
        };
        self.notifier.toast(level, &outcome.message);
        Delivery::Applied(outcome)
    }

    fn begin(&self, action: Action) {
        *self.pending.borrow_mut().entry(action).or_default() += 1;
        self.view.set_busy(action, true);
    }

    /// Clear the busy indicator once the last in-flight request for `action`
    /// has returned, whether or not its response was applied.
    fn finish(&self, action: Action) {
        let remaining = {
            let mut pending = self.pending.borrow_mut();
            let count = pending.entry(action).or_default();
            *count = count.saturating_sub(1);
            *count
        };
        if remaining == 0 {
            self.view.set_busy(action, false);
        }
    }

    /// Flag the field (or open the config modal) and toast. Returns the message shown.
    fn reject(&self, area: Option<ResultArea>, rejection: Rejection) -> String {
        let message = match rejection {
            Rejection::Invalid { field, message } => {
                self.view.flag_invalid_field(field);
                message
            }
            Rejection::NacosNotConfigured => {
                let current = self.config.load();
                self.view.open_config_modal(current.as_ref().map(|c| &c.data));
                NACOS_NOT_CONFIGURED.to_owned()
            }
        };
        debug!(?area, %message, "form rejected");
        self.notifier.toast(ToastLevel::Warning, &message);
        message
    }

    fn rejected_form(&self, area: ResultArea, rejection: Rejection) -> Delivery<FormOutcome> {
        let message = self.reject(Some(area), rejection);
        let outcome = controllers::rejected(area, &message);
        self.view.show_outcome(&outcome);
        Delivery::Applied(outcome)
    }
}

fn environment_payload(name: String) -> ConfigPayload {
    ConfigPayload {
        env_name: Some(name),
        ..Default::default()
    }
}
