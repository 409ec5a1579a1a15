use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    pub name: String,
    pub rtsp_url: String,
    pub save_directory: String,
    pub interval_seconds: u64,
}
