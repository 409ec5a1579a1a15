use crate::errors::AppError;
use crate::warehouse::credentials::StageCredentials;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Instant;

/// One file pushed to the named staging area, uncompressed.
///
/// The trait is the seam the upload batch is written against; tests swap in
/// a recording mock where this client talks to the real warehouse.
#[async_trait]
pub trait StageUploader: Send + Sync {
    async fn put_file(&self, local_path: &Path) -> Result<(), AppError>;
}

#[derive(Deserialize)]
struct LoginResponse {
    success: bool,
    message: Option<String>,
    data: Option<LoginData>,
}

#[derive(Deserialize)]
struct LoginData {
    token: String,
}

#[derive(Deserialize)]
struct PutResponse {
    success: bool,
    message: Option<String>,
}

/// Authenticated session against the warehouse staging API.
///
/// A session lives for exactly one upload batch: `connect` performs the
/// login request, `close` the logout. Sessions are never reused across
/// cycles.
pub struct StageClient {
    http: Client,
    base_url: String,
    token: String,
    stage_name: String,
}

impl StageClient {
    pub async fn connect(
        credentials: &StageCredentials,
        stage_name: &str,
    ) -> Result<Self, AppError> {
        let base_url = format!("https://{}.snowflakecomputing.com", credentials.account);
        Self::connect_to(&base_url, credentials, stage_name).await
    }

    /// Connect against an explicit endpoint. Split out from `connect` so the
    /// account-to-URL mapping stays in one place and tests can point at a
    /// local server.
    pub async fn connect_to(
        base_url: &str,
        credentials: &StageCredentials,
        stage_name: &str,
    ) -> Result<Self, AppError> {
        debug!("🔐 Opening staging session at {}", base_url);
        let connect_start = Instant::now();

        let http = Client::new();
        let login_body = serde_json::json!({
            "data": {
                "LOGIN_NAME": credentials.user,
                "PASSWORD": credentials.password,
                "ACCOUNT_NAME": credentials.account,
                "SESSION_PARAMETERS": {
                    "ROLE": credentials.role,
                    "WAREHOUSE": credentials.warehouse,
                    "DATABASE": credentials.database,
                    "SCHEMA": credentials.schema,
                },
            }
        });

        let response = http
            .post(format!("{}/session/v1/login-request", base_url))
            .json(&login_body)
            .send()
            .await
            .map_err(|e| AppError::Connection(format!("Login request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Connection(format!(
                "Login request rejected with status {}",
                response.status()
            )));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| AppError::Connection(format!("Malformed login response: {}", e)))?;

        if !login.success {
            return Err(AppError::Connection(format!(
                "Login refused: {}",
                login.message.unwrap_or_else(|| "no reason given".to_string())
            )));
        }
        let token = login
            .data
            .map(|d| d.token)
            .ok_or_else(|| AppError::Connection("Login response carried no token".to_string()))?;

        info!(
            "🔐 Staging session opened for stage '@{}' in {:?}.",
            stage_name,
            connect_start.elapsed()
        );
        Ok(StageClient {
            http,
            base_url: base_url.to_string(),
            token,
            stage_name: stage_name.to_string(),
        })
    }

    /// End the session. Best-effort: a failed logout is logged and swallowed,
    /// the server expires abandoned sessions on its own.
    pub async fn close(self) {
        let result = self
            .http
            .post(format!("{}/session/v1/logout-request", self.base_url))
            .header("Authorization", format!("Snowflake Token=\"{}\"", self.token))
            .send()
            .await;
        match result {
            Ok(_) => debug!("🔐 Staging session closed."),
            Err(e) => warn!("Failed to close staging session cleanly: {}", e),
        }
    }
}

#[async_trait]
impl StageUploader for StageClient {
    async fn put_file(&self, local_path: &Path) -> Result<(), AppError> {
        let file_label = local_path.display().to_string();
        let file_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::Upload {
                file: file_label.clone(),
                details: "Path has no valid file name".to_string(),
            })?
            .to_string();

        let bytes = tokio::fs::read(local_path).await.map_err(|e| AppError::Upload {
            file: file_label.clone(),
            details: format!("Failed to read file: {}", e),
        })?;
        debug!("⬆️ Uploading {} ({} bytes) to '@{}'.", file_label, bytes.len(), self.stage_name);

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/jpeg")
            .map_err(|e| AppError::Upload {
                file: file_label.clone(),
                details: format!("Failed to build multipart body: {}", e),
            })?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let upload_start = Instant::now();
        let response = self
            .http
            .post(format!(
                "{}/v1/stages/{}/files?auto_compress=false",
                self.base_url, self.stage_name
            ))
            .header("Authorization", format!("Snowflake Token=\"{}\"", self.token))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Upload {
                file: file_label.clone(),
                details: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(AppError::Upload {
                file: file_label,
                details: format!("Stage rejected file with status {}", response.status()),
            });
        }

        let put: PutResponse = response.json().await.map_err(|e| AppError::Upload {
            file: file_label.clone(),
            details: format!("Malformed upload response: {}", e),
        })?;
        if !put.success {
            return Err(AppError::Upload {
                file: file_label,
                details: format!(
                    "Stage reported failure: {}",
                    put.message.unwrap_or_else(|| "no reason given".to_string())
                ),
            });
        }

        debug!("⬆️ Uploaded in {:?}.", upload_start.elapsed());
        Ok(())
    }
}
