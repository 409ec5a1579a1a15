use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Stream Error for camera {camera_name}: {details}")]
    Stream { camera_name: String, details: String },

    #[error("Frame Error for camera {camera_name}: {details}")]
    Frame { camera_name: String, details: String },

    #[error("Stage Connection Error: {0}")]
    Connection(String),

    #[error("Upload Error for {file}: {details}")]
    Upload { file: String, details: String },

    #[error("File I/O Error: {0}")]
    Io(String),

    #[error("Task Execution Error: {0}")]
    Task(String),

    #[error("OpenCV Error: {0}")]
    OpenCV(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<opencv::Error> for AppError {
    fn from(err: opencv::Error) -> Self {
        AppError::OpenCV(err.to_string())
    }
}
