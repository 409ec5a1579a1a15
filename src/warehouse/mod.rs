pub mod batch;
pub mod credentials;
pub mod stage_client;

pub use batch::{upload_pending_images, UploadSummary};
pub use credentials::StageCredentials;
pub use stage_client::{StageClient, StageUploader};
