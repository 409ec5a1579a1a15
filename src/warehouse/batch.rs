use crate::camera_config::CameraConfig;
use crate::common::file_utils;
use crate::errors::AppError;
use crate::warehouse::stage_client::StageUploader;
use log::{debug, error, info};
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub uploaded: usize,
    pub failed: usize,
}

/// Push every pending image in every camera's directory to the stage, then
/// flip each one to its uploaded name.
///
/// Deliberately rescans all cameras' directories on every call, not just the
/// camera that triggered it: the sweep also picks up files a previous batch
/// failed to upload. Per-file failure is logged and counted without aborting
/// the rest of the batch; the caller is responsible for opening (and closing)
/// the session, so a connection failure never reaches this function.
pub async fn upload_pending_images(
    cameras: &[CameraConfig],
    uploader: &dyn StageUploader,
) -> Result<UploadSummary, AppError> {
    let batch_start = Instant::now();
    let mut summary = UploadSummary::default();

    for camera in cameras {
        let dir = Path::new(&camera.save_directory);
        if !dir.is_dir() {
            debug!(
                "[{}] Save directory '{}' does not exist yet, skipping scan.",
                camera.name, camera.save_directory
            );
            continue;
        }

        let pending = file_utils::scan_pending_files(dir)?;
        if pending.is_empty() {
            debug!("[{}] No pending images.", camera.name);
            continue;
        }
        info!("⬆️ [{}] {} pending image(s) to upload.", camera.name, pending.len());

        for path in pending {
            match uploader.put_file(&path).await {
                Ok(()) => match file_utils::mark_uploaded(&path) {
                    Ok(renamed) => {
                        info!("✅ Uploaded {} -> {}", path.display(), renamed.display());
                        summary.uploaded += 1;
                    }
                    Err(e) => {
                        // Uploaded but not renamed: the file stays pending and
                        // will be uploaded again next batch. At-least-once,
                        // never silently dropped.
                        error!(
                            "❌ Uploaded {} but failed to mark it: {}",
                            path.display(),
                            e
                        );
                        summary.failed += 1;
                    }
                },
                Err(e) => {
                    error!("❌ Failed to upload {}: {}", path.display(), e);
                    summary.failed += 1;
                }
            }
        }
    }

    info!(
        "🏁 Upload batch finished in {:?}: {} uploaded, {} failed.",
        batch_start.elapsed(),
        summary.uploaded,
        summary.failed
    );
    Ok(summary)
}
