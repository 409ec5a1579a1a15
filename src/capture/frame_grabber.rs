use crate::app_config::ApplicationConfig;
use crate::camera_config::CameraConfig;
use crate::common::file_utils;
use crate::errors::AppError;
use log::{debug, info};
use opencv::{core as opencv_core, imgcodecs, prelude::*, videoio};
use std::path::PathBuf;
use std::time::Instant;

/// Open the camera's stream, read exactly one frame, release the stream and
/// write the frame as a pending JPEG into the camera's directory.
///
/// The stream is opened fresh and closed again on every call; no capture
/// handle survives between intervals. There is no retry here, the driver
/// loop's next scheduled interval is the only retry mechanism.
pub async fn grab_frame(
    camera: &CameraConfig,
    app_settings: &ApplicationConfig,
) -> Result<PathBuf, AppError> {
    debug!("📸 [{}] Starting single-frame capture.", camera.name);
    let overall_start = Instant::now();

    let output_dir = file_utils::ensure_output_directory(&camera.save_directory)?;
    let filename = file_utils::generate_pending_filename(
        &camera.name,
        &app_settings.filename_timestamp_format,
        &app_settings.image_format,
    );
    let output_path = output_dir.join(filename);

    let camera_name = camera.name.clone();
    let rtsp_url = camera.rtsp_url.clone();
    let jpeg_quality = app_settings.jpeg_quality.unwrap_or(95);
    let path_for_task = output_path.clone();

    // All OpenCV work is blocking; keep it off the async runtime.
    let saved_path = tokio::task::spawn_blocking(move || -> Result<PathBuf, AppError> {
        let open_start = Instant::now();
        let mut cap = videoio::VideoCapture::from_file(&rtsp_url, videoio::CAP_ANY)?;

        let opened = videoio::VideoCapture::is_opened(&cap)?;
        if !opened {
            return Err(AppError::Stream {
                camera_name: camera_name.clone(),
                details: format!(
                    "Could not open the video stream - check camera availability and RTSP path ({:?} elapsed)",
                    open_start.elapsed()
                ),
            });
        }
        debug!(
            "OpenCV (blocking) [{}]: Stream opened in {:?}.",
            camera_name,
            open_start.elapsed()
        );

        let mut frame = opencv_core::Mat::default();
        let read_start = Instant::now();
        let got_frame = cap.read(&mut frame)?;
        // Release before any failure path so a half-dead stream never leaks
        // a capture handle into the next interval.
        cap.release()?;

        if !got_frame {
            return Err(AppError::Frame {
                camera_name: camera_name.clone(),
                details: "Stream returned no frame".to_string(),
            });
        }
        if frame.empty() {
            return Err(AppError::Frame {
                camera_name: camera_name.clone(),
                details: "Captured frame is empty".to_string(),
            });
        }
        debug!(
            "OpenCV (blocking) [{}]: Frame read in {:?}.",
            camera_name,
            read_start.elapsed()
        );

        let mut params = opencv_core::Vector::<i32>::new();
        params.push(imgcodecs::IMWRITE_JPEG_QUALITY);
        params.push(jpeg_quality as i32);

        let path_str = path_for_task.to_str().ok_or_else(|| {
            AppError::Io(format!(
                "Output path '{}' is not valid UTF-8 for imwrite.",
                path_for_task.display()
            ))
        })?;
        let written = imgcodecs::imwrite(path_str, &frame, &params)?;
        if !written {
            return Err(AppError::Io(format!(
                "imwrite reported failure for '{}'",
                path_for_task.display()
            )));
        }
        Ok(path_for_task)
    })
    .await
    .map_err(|e| AppError::Task(format!("Capture task for '{}' panicked: {}", camera.name, e)))??;

    info!(
        "✅ [{}] Image saved to {} in {:?}.",
        camera.name,
        saved_path.display(),
        overall_start.elapsed()
    );
    Ok(saved_path)
}
