//! Gateway URL resolution.
//!
//! One lookup per call against `GET /get_gateway_url`, with the cached domain
//! painted while the request is in flight and used as the fallback when it
//! fails.

use std::rc::Rc;

use ba_api_types::GatewayLookupRequest;
use tracing::{debug, info, warn};

use crate::api::AdminApi;
use crate::config_store::{ConfigStore, StoredConfig};
use crate::gateway_cache::{DomainDisplay, GatewayCache, UnconfiguredReason, domain_display};
use crate::generation::{Delivery, RequestGenerations, Slot};
use crate::view::AdminView;

#[derive(Clone)]
pub struct GatewayResolver {
    config: ConfigStore,
    cache: GatewayCache,
    api: AdminApi,
    generations: Rc<RequestGenerations>,
    view: Rc<dyn AdminView>,
}

/// Lookup parameters, or why there are none. Uses the stored values as-is:
/// no defaults are applied here.
pub fn lookup_request(
    config: Option<&StoredConfig>,
) -> Result<GatewayLookupRequest, UnconfiguredReason> {
    let config = config
        .filter(|c| c.is_nacos())
        .ok_or(UnconfiguredReason::Missing)?;
    match (config.data.server_address(), config.data.namespace()) {
        (Some(server), Some(namespace)) => Ok(GatewayLookupRequest {
            server_address: server.to_owned(),
            namespace: namespace.to_owned(),
        }),
        _ => Err(UnconfiguredReason::Incomplete),
    }
}

impl GatewayResolver {
    pub fn new(
        config: ConfigStore,
        cache: GatewayCache,
        api: AdminApi,
        generations: Rc<RequestGenerations>,
        view: Rc<dyn AdminView>,
    ) -> Self {
        Self {
            config,
            cache,
            api,
            generations,
            view,
        }
    }

    pub async fn resolve(&self) -> Delivery<DomainDisplay> {
        let ticket = self.generations.issue(Slot::Gateway);

        let lookup = match lookup_request(self.config.load().as_ref()) {
            Ok(lookup) => lookup,
            Err(reason) => {
                debug!(?reason, "gateway lookup skipped");
                let display = DomainDisplay::Unconfigured(reason);
                self.view.show_domain(&display);
                return Delivery::Applied(display);
            }
        };

        self.view.show_domain(&DomainDisplay::Loading {
            cached: self.cache.get_from_cache(),
        });

        let resolved = match self.api.get_gateway_url(&lookup).await {
            Ok(resp) => match resp.gateway_url.filter(|u| !u.trim().is_empty()) {
                Some(url) if resp.success => Some(url),
                _ => {
                    warn!(
                        server = %lookup.server_address,
                        message = resp.message.as_deref().unwrap_or_default(),
                        "gateway lookup returned no url"
                    );
                    None
                }
            },
            Err(err) => {
                warn!(server = %lookup.server_address, error = %err, "gateway lookup failed");
                None
            }
        };

        let display = match &resolved {
            Some(domain) => DomainDisplay::Resolved {
                domain: domain.clone(),
                server_address: Some(lookup.server_address.clone()),
            },
            None => domain_display(None, false, self.cache.get_from_cache()),
        };

        if !self.generations.is_current(ticket) {
            debug!(generation = ticket.generation, "stale gateway response dropped");
            return Delivery::Superseded(display);
        }

        if let Some(domain) = &resolved {
            info!(%domain, "gateway resolved");
            if let Err(err) = self.cache.save_to_cache(domain) {
                warn!(error = %err, "failed to cache gateway domain");
            }
        }
        self.view.show_domain(&display);
        Delivery::Applied(display)
    }
}
