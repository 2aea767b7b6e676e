//! Permissions console entry point.
//!
//! Loads the configured seed snapshot and prints a member's resolved permissions
//! as JSON: `permissions-console <member-id>`. Without a member id, prints the
//! snapshot itself.

use permissions_console::models::Org;
use permissions_console::{init_tracing, Config, Console, ProductFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    init_tracing(&config);

    tracing::info!("Starting permissions console");
    tracing::info!("Seed path: {:?}", config.seed_path);
    tracing::info!("Settings: {:?}", config.settings);

    if config.seed_path.is_none() {
        tracing::warn!("No seed snapshot configured (CONSOLE_SEED_PATH). Starting empty.");
    }

    let org = Org {
        id: "default".to_string(),
        name: "Default Organization".to_string(),
    };
    let console = Console::from_config(&config, org)?;

    match std::env::args().nth(1) {
        Some(member_id) => match console.resolve_permissions(&member_id, ProductFilter::All) {
            Some(resolved) => {
                tracing::info!(
                    "Resolved {} permissions ({} direct, {} inherited, {} overridden)",
                    resolved.total(),
                    resolved.direct_count(),
                    resolved.inherited_count(),
                    resolved.override_count()
                );
                println!("{}", serde_json::to_string_pretty(&resolved.into_entries())?);
            }
            None => {
                tracing::error!("Unknown member {}", member_id);
                std::process::exit(1);
            }
        },
        None => println!("{}", console.to_json()?),
    }

    Ok(())
}
