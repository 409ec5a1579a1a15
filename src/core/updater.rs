use crate::app_config::SelfUpdateConfig;
use crate::core::shutdown::{ShutdownController, ShutdownToken};
use crate::errors::AppError;
use log::{debug, error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

const DEFAULT_CHECK_INTERVAL_SECS: u64 = 3600;

/// Periodically `git pull` the working tree. When the tree changed, request
/// shutdown so the process can be re-executed on the new code.
pub async fn run_update_check_loop(
    config: SelfUpdateConfig,
    controller: ShutdownController,
    mut token: ShutdownToken,
    restart_requested: Arc<AtomicBool>,
) {
    let interval = Duration::from_secs(
        config
            .check_interval_seconds
            .unwrap_or(DEFAULT_CHECK_INTERVAL_SECS),
    );
    info!("🔄 Self-update check enabled, every {:?}.", interval);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
        if token.is_cancelled() {
            break;
        }

        match working_tree_updated().await {
            Ok(true) => {
                info!("🔄 Repository updated. Restarting the program...");
                restart_requested.store(true, Ordering::SeqCst);
                controller.trigger();
                break;
            }
            Ok(false) => debug!("Repository already up to date."),
            Err(e) => error!("❌ Failed to check for updates: {}", e),
        }
    }
}

/// Run `git pull` and report whether anything changed.
pub async fn working_tree_updated() -> Result<bool, AppError> {
    let output = Command::new("git")
        .arg("pull")
        .output()
        .await
        .map_err(|e| AppError::Task(format!("Failed to run 'git pull': {}", e)))?;

    if !output.status.success() {
        return Err(AppError::Task(format!(
            "'git pull' exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(!stdout.contains("Already up to date"))
}

/// Replace the current process with a fresh copy of the same binary and
/// arguments. Only returns on failure.
#[cfg(unix)]
pub fn restart_process() -> AppError {
    use std::os::unix::process::CommandExt;

    let exe = match std::env::current_exe() {
        Ok(path) => path,
        Err(e) => return AppError::Task(format!("Failed to resolve current executable: {}", e)),
    };
    let args: Vec<String> = std::env::args().skip(1).collect();
    let err = std::process::Command::new(exe).args(args).exec();
    AppError::Task(format!("Failed to re-execute process: {}", err))
}

#[cfg(not(unix))]
pub fn restart_process() -> AppError {
    AppError::Task("Process re-execution is only supported on unix.".to_string())
}
