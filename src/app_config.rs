use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationConfig {
    pub image_format: String, // e.g., "jpg"
    pub jpeg_quality: Option<u8>, // JPEG quality (0-100)
    pub filename_timestamp_format: String, // strftime format string
    pub stage_name: String, // named stage in the warehouse, e.g. "PIC_STAGE"
    pub fallback_sleep_seconds: Option<u64>, // back-off after an unhandled cycle error
    pub log_level: Option<String>, // Making it optional to potentially use CLI as primary
    pub log_directory: Option<String>, // when set, log to a daily file in this directory
    pub self_update: Option<SelfUpdateConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SelfUpdateConfig {
    pub enabled: bool,
    pub check_interval_seconds: Option<u64>,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        ApplicationConfig {
            image_format: "jpg".to_string(),
            jpeg_quality: Some(95), // Default JPEG quality
            filename_timestamp_format: "%Y%m%d_%H%M%S".to_string(),
            stage_name: "PIC_STAGE".to_string(),
            fallback_sleep_seconds: Some(30),
            log_level: Some("info".to_string()),
            log_directory: None,
            self_update: None,
        }
    }
}

impl ApplicationConfig {
    pub fn fallback_sleep(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.fallback_sleep_seconds.unwrap_or(30))
    }
}
