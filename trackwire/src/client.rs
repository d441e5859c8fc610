//! The reporting client.
//!
//! One client per plugin. It owns the plugin's identity and consent policy,
//! listens for the host's lifecycle broadcasts, and exposes the tracking
//! API to the rest of the plugin.

use crate::config::ClientConfig;
use crate::dispatcher::EventDispatcher;
use crate::environment::Environment;
use crate::error::ClientResult;
use crate::registry::WeakClientRegistry;
use std::sync::Arc;
use tracing::{debug, info, warn};
use trackwire_host::{HookRegistry, Scheduler, ACTIVATED_PLUGIN, DEACTIVATED_PLUGIN};
use trackwire_store::{KeyValueStore, OptIn, PluginState};
use trackwire_types::{format_iso8601, keys, names, Clock, Properties};

/// Interval used for the system info report unless a filter overrides it.
pub const DEFAULT_REPORT_INTERVAL: &str = "weekly";

pub struct Client {
    config: ClientConfig,
    dispatcher: EventDispatcher,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    hooks: HookRegistry,
    scheduler: Arc<Scheduler>,
    site_url: String,
}

impl Client {
    /// Creates a client for a plugin and wires it into `env`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`](crate::ClientError::Configuration)
    /// if `api_key` is empty.
    pub fn new(
        api_key: &str,
        api_secret: &str,
        plugin_name: &str,
        plugin_identity: &str,
        env: &Environment,
    ) -> ClientResult<Arc<Self>> {
        let config = ClientConfig::new(
            api_key,
            api_secret,
            plugin_name,
            plugin_identity,
            env.metadata.as_ref(),
        )?;
        Ok(Self::with_config(config, env))
    }

    /// Wires an already-validated configuration into `env`:
    /// registers the instance, subscribes to lifecycle broadcasts (once per
    /// slug), binds the system info report job and schedules it.
    pub fn with_config(config: ClientConfig, env: &Environment) -> Arc<Self> {
        let dispatcher = EventDispatcher::new(
            &config,
            Arc::clone(&env.transport),
            Arc::clone(&env.clock),
            Arc::clone(&env.store),
        );

        let client = Arc::new(Self {
            config,
            dispatcher,
            store: Arc::clone(&env.store),
            clock: Arc::clone(&env.clock),
            hooks: env.hooks.clone(),
            scheduler: Arc::clone(&env.scheduler),
            site_url: env.site_url.clone(),
        });

        if env.registry.register(Arc::clone(&client)).is_some() {
            warn!(slug = %client.slug(), "Replaced existing client for slug");
        }
        client.register_lifecycle_listeners(env.registry.downgrade());
        client.bind_system_info_report();
        if let Err(e) = client.schedule_system_info_report() {
            warn!(slug = %client.slug(), error = %e, "Failed to schedule system info report");
        }

        info!(slug = %client.slug(), version = %client.plugin_version(), "Client initialized");
        client
    }

    fn register_lifecycle_listeners(&self, registry: WeakClientRegistry) {
        let slug = self.slug().to_string();

        let activated = {
            let (registry, slug) = (registry.clone(), slug.clone());
            move |identity: &str, network_wide: bool| {
                if let Some(client) = registry.get_by_slug(&slug) {
                    client.on_plugin_activated(identity, network_wide);
                }
            }
        };
        let deactivated = {
            let slug = slug.clone();
            move |identity: &str, network_wide: bool| {
                if let Some(client) = registry.get_by_slug(&slug) {
                    client.on_plugin_deactivated(identity, network_wide);
                }
            }
        };

        let added_activation = self
            .hooks
            .add_lifecycle_listener(ACTIVATED_PLUGIN, &slug, Arc::new(activated));
        let added_deactivation = self
            .hooks
            .add_lifecycle_listener(DEACTIVATED_PLUGIN, &slug, Arc::new(deactivated));
        if !(added_activation && added_deactivation) {
            debug!(slug = %slug, "Lifecycle listeners already registered");
        }
    }

    fn bind_system_info_report(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.scheduler.bind(
            &self.system_info_hook(),
            Arc::new(move || {
                if let Some(client) = weak.upgrade() {
                    client.send_system_info_report();
                }
            }),
        );
    }

    // ================================================================
    // Identity
    // ================================================================

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        self.config.slug()
    }

    #[must_use]
    pub fn plugin_identity(&self) -> &str {
        self.config.plugin_identity()
    }

    #[must_use]
    pub fn plugin_version(&self) -> &str {
        self.config.plugin_version()
    }

    fn state(&self) -> PluginState<'_> {
        PluginState::new(self.store.as_ref(), self.config.slug())
    }

    // ================================================================
    // Consent
    // ================================================================

    /// Returns true only if the consent slot holds exactly `"yes"`.
    /// Unreadable state counts as no consent.
    pub fn is_tracking_allowed(&self) -> bool {
        match self.state().opt_in() {
            Ok(opt_in) => opt_in.is_granted(),
            Err(e) => {
                warn!(slug = %self.slug(), error = %e, "Failed to read consent; treating as denied");
                false
            }
        }
    }

    /// Records the user's consent choice.
    ///
    /// Revoking consent does not unschedule the periodic report; call
    /// [`Client::unschedule_system_info_report`] for that.
    pub fn set_tracking_allowed(&self, allowed: bool) -> ClientResult<()> {
        let opt_in = OptIn::from(allowed);
        self.state().set_opt_in(opt_in)?;
        info!(slug = %self.slug(), allow_tracking = %opt_in, "Tracking consent updated");
        Ok(())
    }

    // ================================================================
    // Tracking
    // ================================================================

    /// Sends a custom event if the user has opted in.
    ///
    /// Returns `false` without touching the network when consent is absent,
    /// and `false` when delivery fails.
    pub fn track(&self, event_name: &str, properties: Properties) -> bool {
        if !self.is_tracking_allowed() {
            debug!(slug = %self.slug(), event = %event_name, "Tracking not allowed; event dropped");
            return false;
        }
        self.dispatcher.dispatch(event_name, properties)
    }

    /// Records the most recent significant user action. Local only; no
    /// consent check and no network call.
    pub fn update_last_core_action(&self, action: &str) {
        if let Err(e) = self.state().set_last_core_action(action) {
            warn!(slug = %self.slug(), error = %e, "Failed to store last core action");
        }
    }

    // ================================================================
    // Lifecycle
    // ================================================================

    /// Host broadcast: some plugin was activated. Ignored unless `identity`
    /// is this client's plugin.
    pub fn on_plugin_activated(&self, identity: &str, network_wide: bool) {
        if !self.config.is_identity(identity) {
            return;
        }
        info!(slug = %self.slug(), network_wide, "Plugin activated");
        self.handle_plugin_activation();
    }

    /// Host broadcast: some plugin was deactivated. Ignored unless
    /// `identity` is this client's plugin.
    pub fn on_plugin_deactivated(&self, identity: &str, network_wide: bool) {
        if !self.config.is_identity(identity) {
            return;
        }
        info!(slug = %self.slug(), network_wide, "Plugin deactivated");
        self.handle_plugin_deactivation();
    }

    /// Records the activation time and sends `plugin_activated`, regardless
    /// of consent. Returns the delivery result.
    pub fn handle_plugin_activation(&self) -> bool {
        let now = self.clock.now();
        if let Err(e) = self.state().set_activated_time(now.timestamp()) {
            warn!(slug = %self.slug(), error = %e, "Failed to store activation time");
        }

        let mut properties = Properties::new();
        properties.insert(keys::SITE_URL.into(), self.site_url.as_str().into());
        properties.insert(keys::ACTIVATION_TIME.into(), format_iso8601(now).into());

        self.dispatcher
            .dispatch_lifecycle_event(names::PLUGIN_ACTIVATED, properties)
    }

    /// Sends `plugin_deactivated` with the usage duration and last action,
    /// regardless of consent, then clears the activation time whether or
    /// not delivery succeeded. Returns the delivery result.
    pub fn handle_plugin_deactivation(&self) -> bool {
        let now = self.clock.now();
        let state = self.state();

        let activated_time = state.activated_time().unwrap_or_else(|e| {
            warn!(slug = %self.slug(), error = %e, "Failed to read activation time");
            None
        });
        let usage_duration = match activated_time {
            Some(activated) if activated > 0 => (now.timestamp() - activated).max(0),
            _ => 0,
        };
        let last_core_action = state.last_core_action().unwrap_or_else(|e| {
            warn!(slug = %self.slug(), error = %e, "Failed to read last core action");
            String::new()
        });

        let mut properties = Properties::new();
        properties.insert(keys::USAGE_DURATION.into(), usage_duration.into());
        properties.insert(keys::LAST_CORE_ACTION.into(), last_core_action.into());
        properties.insert(keys::DEACTIVATION_TIME.into(), format_iso8601(now).into());

        let delivered = self
            .dispatcher
            .dispatch_lifecycle_event(names::PLUGIN_DEACTIVATED, properties);

        if let Err(e) = state.clear_activated_time() {
            warn!(slug = %self.slug(), error = %e, "Failed to clear activation time");
        }
        delivered
    }

    // ================================================================
    // Periodic report
    // ================================================================

    /// Sends the `system_info` snapshot if the user has opted in.
    pub fn send_system_info_report(&self) -> bool {
        if !self.is_tracking_allowed() {
            debug!(slug = %self.slug(), "Tracking not allowed; system info skipped");
            return false;
        }
        self.dispatcher
            .dispatch(names::SYSTEM_INFO, Properties::new())
    }

    /// Scheduler hook the report job runs under.
    #[must_use]
    pub fn system_info_hook(&self) -> String {
        format!("{}_send_system_info", self.slug())
    }

    /// Filter name that can override the report interval.
    #[must_use]
    pub fn report_interval_filter(&self) -> String {
        format!("{}_system_info_interval", self.slug())
    }

    /// The report interval name after filters, `"weekly"` by default.
    pub fn report_interval(&self) -> String {
        self.hooks
            .apply_filters(&self.report_interval_filter(), DEFAULT_REPORT_INTERVAL)
    }

    /// Schedules the periodic report, first due one interval from now.
    /// Returns `false` if it was already scheduled.
    pub fn schedule_system_info_report(&self) -> ClientResult<bool> {
        let interval = self.report_interval();
        let secs = self
            .scheduler
            .interval_secs(&interval)
            .ok_or_else(|| trackwire_host::HostError::UnknownInterval(interval.clone()))?;
        let first_run = self.clock.unix_now() + secs;
        Ok(self
            .scheduler
            .schedule(&self.system_info_hook(), &interval, first_run)?)
    }

    /// Removes the periodic report from the schedule. Returns `false` if it
    /// was not scheduled.
    pub fn unschedule_system_info_report(&self) -> ClientResult<bool> {
        Ok(self.scheduler.unschedule(&self.system_info_hook())?)
    }

    /// Unix seconds of the next scheduled report, if any.
    pub fn next_system_info_report(&self) -> ClientResult<Option<i64>> {
        Ok(self.scheduler.next_scheduled(&self.system_info_hook())?)
    }
}
