//! Host-side collaborators for trackwire.
//!
//! These stand in for the facilities a host application provides to the
//! plugins it loads:
//! - [`HookRegistry`]: broadcast lifecycle actions and value filters
//! - [`Scheduler`]: named-interval periodic jobs persisted in the settings store
//! - [`PluginMetadataReader`]: reads a plugin's declared version

mod error;
mod hooks;
mod metadata;
mod scheduler;

pub use error::{HostError, HostResult};
pub use hooks::{
    FilterFn, HookRegistry, LifecycleListener, ACTIVATED_PLUGIN, DEACTIVATED_PLUGIN,
};
pub use metadata::{parse_header_field, PluginHeaderReader, PluginMetadataReader, StaticMetadata};
pub use scheduler::{JobCallback, ScheduledJob, Scheduler, CRON_KEY, DEFAULT_INTERVALS};
