use crate::app_config::ApplicationConfig;
use crate::camera_config::CameraConfig;
use crate::capture;
use crate::config_loader::MasterConfig;
use crate::core::shutdown::{ShutdownController, ShutdownToken};
use crate::core::updater;
use crate::errors::AppError;
use crate::warehouse::{self, StageClient, StageCredentials};
use futures::future::join_all;
use log::{error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, PartialEq, Eq)]
pub enum DaemonOutcome {
    Stopped,
    RestartRequested,
}

/// The capture/upload driver. One Tokio task per camera, each on its own
/// independent interval, all sharing one upload gate so concurrent batches
/// cannot race on renames.
pub struct Daemon {
    app_settings: Arc<ApplicationConfig>,
    cameras: Arc<Vec<CameraConfig>>,
    credentials: StageCredentials,
    upload_gate: Arc<Mutex<()>>,
}

impl Daemon {
    pub fn new(master_config: &MasterConfig, credentials: StageCredentials) -> Self {
        Daemon {
            app_settings: Arc::new(master_config.app_settings.clone()),
            cameras: Arc::new(master_config.cameras.clone()),
            credentials,
            upload_gate: Arc::new(Mutex::new(())),
        }
    }

    pub async fn run(
        &self,
        controller: ShutdownController,
        token: ShutdownToken,
    ) -> Result<DaemonOutcome, AppError> {
        info!(
            "🚀 Starting capture daemon with {} camera(s).",
            self.cameras.len()
        );
        let restart_requested = Arc::new(AtomicBool::new(false));

        if let Some(update_cfg) = self
            .app_settings
            .self_update
            .clone()
            .filter(|cfg| cfg.enabled)
        {
            tokio::spawn(updater::run_update_check_loop(
                update_cfg,
                controller.clone(),
                token.clone(),
                restart_requested.clone(),
            ));
        }

        let mut tasks = Vec::new();
        for camera in self.cameras.iter().cloned() {
            let app_settings = self.app_settings.clone();
            let cameras = self.cameras.clone();
            let credentials = self.credentials.clone();
            let upload_gate = self.upload_gate.clone();
            let task_token = token.clone();
            tasks.push(tokio::spawn(camera_loop(
                camera,
                app_settings,
                cameras,
                credentials,
                upload_gate,
                task_token,
            )));
        }

        for (idx, result) in join_all(tasks).await.into_iter().enumerate() {
            if let Err(e) = result {
                error!(
                    "💀 Camera task #{} failed (panic or cancellation): {}",
                    idx + 1,
                    e
                );
            }
        }

        info!("🏁 Capture daemon stopped.");
        if restart_requested.load(Ordering::SeqCst) {
            Ok(DaemonOutcome::RestartRequested)
        } else {
            Ok(DaemonOutcome::Stopped)
        }
    }
}

async fn camera_loop(
    camera: CameraConfig,
    app_settings: Arc<ApplicationConfig>,
    cameras: Arc<Vec<CameraConfig>>,
    credentials: StageCredentials,
    upload_gate: Arc<Mutex<()>>,
    mut token: ShutdownToken,
) {
    info!(
        "▶️ [{}] Camera loop started (interval {}s).",
        camera.name, camera.interval_seconds
    );

    loop {
        if token.is_cancelled() {
            break;
        }

        let sleep_for = match run_camera_cycle(
            &camera,
            &app_settings,
            &cameras,
            &credentials,
            &upload_gate,
        )
        .await
        {
            Ok(()) => Duration::from_secs(camera.interval_seconds),
            Err(e) => {
                let fallback = app_settings.fallback_sleep();
                error!(
                    "❌ [{}] Unhandled error in camera loop: {}. Retrying in {:?}...",
                    camera.name, e, fallback
                );
                fallback
            }
        };

        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(sleep_for) => {}
        }
    }

    info!("⏹️ [{}] Camera loop stopped.", camera.name);
}

/// One cycle for one camera: capture a frame, and when a file was produced,
/// run the full upload batch over every camera's directory.
///
/// Capture failures and a failed session open are classified errors: logged
/// here, cycle skipped, next interval retries. Anything else propagates to
/// the loop's fallback path.
async fn run_camera_cycle(
    camera: &CameraConfig,
    app_settings: &ApplicationConfig,
    cameras: &[CameraConfig],
    credentials: &StageCredentials,
    upload_gate: &Mutex<()>,
) -> Result<(), AppError> {
    let captured = match capture::grab_frame(camera, app_settings).await {
        Ok(path) => Some(path),
        Err(e) => {
            error!("❌ [{}] Capture failed: {}", camera.name, e);
            None
        }
    };

    if captured.is_none() {
        return Ok(());
    }

    let _upload_slot = upload_gate.lock().await;
    let client = match StageClient::connect(credentials, &app_settings.stage_name).await {
        Ok(client) => client,
        Err(e) => {
            // Connection failure aborts the whole batch; every file keeps
            // its pending name and is retried next cycle.
            error!("❌ Could not open staging session, skipping upload batch: {}", e);
            return Ok(());
        }
    };

    let result = warehouse::upload_pending_images(cameras, &client).await;
    client.close().await;
    result.map(|_| ())
}

/// One-shot capture across all configured cameras, no upload. CLI `capture`.
pub async fn capture_once(master_config: &MasterConfig) -> Result<usize, AppError> {
    let mut produced = 0;
    for camera in &master_config.cameras {
        match capture::grab_frame(camera, &master_config.app_settings).await {
            Ok(_) => produced += 1,
            Err(e) => error!("❌ [{}] Capture failed: {}", camera.name, e),
        }
    }
    Ok(produced)
}

/// One upload batch over every camera's directory. CLI `upload`.
pub async fn upload_once(
    master_config: &MasterConfig,
    credentials: &StageCredentials,
) -> Result<warehouse::UploadSummary, AppError> {
    let client = StageClient::connect(credentials, &master_config.app_settings.stage_name).await?;
    let result = warehouse::upload_pending_images(&master_config.cameras, &client).await;
    client.close().await;
    result
}
