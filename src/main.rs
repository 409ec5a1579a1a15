use anyhow::{Context, Result};
use camstage::common::logging_setup;
use camstage::core::daemon::{self, Daemon, DaemonOutcome};
use camstage::core::{shutdown, updater};
use camstage::warehouse::StageCredentials;
use camstage::{cli, config_loader};
use log::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments early for potential use in logging or config path
    let matches = cli::build_cli().get_matches();

    // Determine the configuration file path
    let config_path = matches
        .get_one::<String>("config")
        .map(|s| s.as_str())
        .unwrap_or("config/camstage.yaml");

    // Attempt to load the full configuration
    let master_config = match config_loader::load_config(config_path) {
        Ok(cfg) => {
            logging_setup::initialize_logging(Some(&cfg), &matches);
            info!("✅ Configuration loaded from: {}", config_path);
            cfg
        }
        Err(e) => {
            logging_setup::initialize_logging(None, &matches);
            error!(
                "❌ Failed to load master configuration from '{}': {:#}. Exiting.",
                config_path, e
            );
            return Err(e.context(format!(
                "Failed to load master configuration from '{}'",
                config_path
            )));
        }
    };

    let subcommand = matches.subcommand().map(|s| s.0).unwrap_or("run");
    match subcommand {
        "capture" => {
            let produced = daemon::capture_once(&master_config)
                .await
                .context("One-shot capture failed")?;
            info!(
                "🏁 One-shot capture finished: {} of {} camera(s) produced a file.",
                produced,
                master_config.cameras.len()
            );
        }
        "upload" => {
            let credentials =
                StageCredentials::from_env().context("Warehouse credentials missing")?;
            let summary = daemon::upload_once(&master_config, &credentials)
                .await
                .context("One-shot upload batch failed")?;
            info!(
                "🏁 One-shot upload finished: {} uploaded, {} failed.",
                summary.uploaded, summary.failed
            );
        }
        _ => {
            let credentials =
                StageCredentials::from_env().context("Warehouse credentials missing")?;
            info!(
                "🚀 camstage starting with {} camera(s) configured.",
                master_config.cameras.len()
            );

            let (controller, token) = shutdown::channel();
            shutdown::spawn_signal_listener(controller.clone());

            let daemon = Daemon::new(&master_config, credentials);
            match daemon.run(controller, token).await? {
                DaemonOutcome::Stopped => info!("🏁 Program stopped."),
                DaemonOutcome::RestartRequested => {
                    info!("🔄 Re-executing with the updated working tree...");
                    // exec only returns on failure
                    let err = updater::restart_process();
                    error!("❌ {}", err);
                    return Err(anyhow::Error::new(err).context("Restart after update failed"));
                }
            }
        }
    }

    Ok(())
}
