//! Permissions Console
//!
//! Member and group administration for an organization's product access: per-product
//! scope filters, permissions and preferences, with group-inherited permissions
//! resolved against direct assignments.

pub mod catalog;
pub mod config;
pub mod console;
pub mod directory;
pub mod errors;
pub mod models;
pub mod resolver;
pub mod scope;
pub mod store;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

pub use config::Config;
pub use console::{ConfigOwner, Console};
pub use directory::ConsoleState;
pub use errors::{ConsoleError, ConsoleResult};
pub use resolver::{ProductFilter, ResolvedPermission, ResolvedPermissions};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this again once
/// a subscriber is installed does nothing.
pub fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let (text, json) = match config.log_format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(text)
        .with(json)
        .try_init();

    if installed.is_ok() {
        tracing::debug!("Tracing initialized at level {}", config.log_level);
    }
}
