use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::{ApiEndpoints, ApiError, StartRequest, UploadKind, UploadResponse};

/// Shown when an upload fails without any usable body.
pub const GENERIC_UPLOAD_ERROR: &str = "Upload failed";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub endpoints: ApiEndpoints,
    /// Only bounds connection setup; uploads and streams may run indefinitely.
    pub connect_timeout: Duration,
}

impl ClientSettings {
    pub fn new(endpoints: ApiEndpoints) -> Self {
        Self {
            endpoints,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

#[async_trait::async_trait]
pub trait InspectionApi: Send + Sync {
    async fn upload(
        &self,
        kind: UploadKind,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ApiError>;

    /// Returns the task id.
    async fn start(&self, request: &StartRequest) -> Result<String, ApiError>;

    async fn download(&self, location: &str) -> Result<Vec<u8>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    client: reqwest::Client,
    settings: ClientSettings,
}

impl ReqwestApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.settings.endpoints
    }
}

#[async_trait::async_trait]
impl InspectionApi for ReqwestApi {
    async fn upload(
        &self,
        kind: UploadKind,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        let url = self.settings.endpoints.upload()?;
        engine_debug!("POST {} field={} bytes={}", url, kind, bytes.len());
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part(kind.field_name(), part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        parse_upload_response(kind, &body)
    }

    async fn start(&self, request: &StartRequest) -> Result<String, ApiError> {
        let url = self.settings.endpoints.start()?;
        engine_debug!("POST {} sheets={}", url, request.sheets.len());
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))?;
        value
            .get("task_id")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .ok_or_else(|| ApiError::Decode("response missing task_id".to_string()))
    }

    async fn download(&self, location: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.settings.endpoints.resolve(location)?;
        engine_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(bytes.to_vec())
    }
}

/// Picks the most useful text out of a failed response: a JSON object's
/// `detail` field, then the raw body, then a generic message.
pub fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(value)) => match value.get("detail") {
            Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
            Some(Value::Null) | Some(Value::String(_)) | Some(Value::Bool(false)) | None => {
                GENERIC_UPLOAD_ERROR.to_string()
            }
            Some(other) => other.to_string(),
        },
        Ok(_) => body.to_string(),
        Err(_) if !body.trim().is_empty() => body.to_string(),
        Err(_) => GENERIC_UPLOAD_ERROR.to_string(),
    }
}

fn parse_upload_response(kind: UploadKind, body: &str) -> Result<UploadResponse, ApiError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| ApiError::Decode(err.to_string()))?;
    let file_id = value
        .get(kind.id_key())
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::Decode(format!("response missing {}", kind.id_key())))?
        .to_string();

    let sheets = match (kind, value.get("sheets")) {
        (UploadKind::Source, Some(Value::Array(items))) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name.clone()),
                other => {
                    engine_warn!("Ignoring non-string sheet name {}", other);
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(UploadResponse { file_id, sheets })
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_builder() {
        return ApiError::InvalidUrl(err.to_string());
    }
    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::Network(err.to_string())
}
