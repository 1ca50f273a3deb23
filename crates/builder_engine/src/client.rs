use std::time::Duration;

use builder_logging::builder_debug;
use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use url::Url;

use crate::types::RegenerateRequest;
use crate::{
    ApiError, FailureKind, PollReply, ProgressReply, RegenerateReply, StartReply, TweakPayload,
};

pub const PROGRESS_PATH: &str = "api/router/progress";
pub const PREVIEW_PATH: &str = "api/builder/preview";
pub const GENERATE_PATH: &str = "api/builder/generate";
pub const STATUS_PATH: &str = "api/builder/status";
pub const REGENERATE_PATH: &str = "api/builder/regenerate";
pub const DOWNLOAD_PATH: &str = "api/builder/download";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// The builder server, one method per endpoint.
#[async_trait::async_trait]
pub trait BuilderApi: Send + Sync {
    async fn progress(&self) -> Result<ProgressReply, ApiError>;
    /// Raw preview body. Non-2xx answers are `FailureKind::HttpStatus`.
    async fn preview(&self) -> Result<String, ApiError>;
    async fn generate(&self) -> Result<StartReply, ApiError>;
    async fn status(&self) -> Result<PollReply, ApiError>;
    async fn regenerate(&self, tweaks: &TweakPayload) -> Result<RegenerateReply, ApiError>;
    async fn download(&self) -> Result<Bytes, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBuilderApi {
    settings: ApiSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestBuilderApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn get_bytes(&self, path: &str) -> Result<Bytes, ApiError> {
        let url = self.endpoint(path)?;
        builder_debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(map_reqwest_error)?;
        self.read_body(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.get_bytes(path).await?;
        decode_json(&body)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: Vec<u8>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        builder_debug!("POST {} ({} bytes)", url, payload.len());
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = self.read_body(response).await?;
        decode_json(&body)
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Bytes, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if response.content_length().is_some_and(|len| len > max_bytes) {
            return Err(ApiError::new(
                FailureKind::TooLarge { max_bytes },
                "response too large",
            ));
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if body.len() as u64 + chunk.len() as u64 > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge { max_bytes },
                    "response too large",
                ));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(Bytes::from(body))
    }
}

#[async_trait::async_trait]
impl BuilderApi for ReqwestBuilderApi {
    async fn progress(&self) -> Result<ProgressReply, ApiError> {
        self.get_json(PROGRESS_PATH).await
    }

    async fn preview(&self) -> Result<String, ApiError> {
        let body = self.get_bytes(PREVIEW_PATH).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn generate(&self) -> Result<StartReply, ApiError> {
        self.post_json(GENERATE_PATH, b"{}".to_vec()).await
    }

    async fn status(&self) -> Result<PollReply, ApiError> {
        self.get_json(STATUS_PATH).await
    }

    async fn regenerate(&self, tweaks: &TweakPayload) -> Result<RegenerateReply, ApiError> {
        let payload = serde_json::to_vec(&RegenerateRequest { tweaks })
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        self.post_json(REGENERATE_PATH, payload).await
    }

    async fn download(&self) -> Result<Bytes, ApiError> {
        self.get_bytes(DOWNLOAD_PATH).await
    }
}

fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{ApiSettings, ReqwestBuilderApi, STATUS_PATH};
    use crate::FailureKind;

    fn api(base_url: &str) -> ReqwestBuilderApi {
        ReqwestBuilderApi::new(ApiSettings {
            base_url: base_url.to_string(),
            ..ApiSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn endpoints_keep_base_path_prefix() {
        let url = api("http://localhost:9000/app").endpoint(STATUS_PATH).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/app/api/builder/status");
    }

    #[test]
    fn endpoints_on_bare_host() {
        let url = api("http://localhost:9000").endpoint(STATUS_PATH).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/api/builder/status");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ReqwestBuilderApi::new(ApiSettings {
            base_url: "not a url".to_string(),
            ..ApiSettings::default()
        })
        .unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}
