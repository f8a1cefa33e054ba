//! HTTP boundary to the analysis backend.

use std::time::Duration;

use normate_core::{
    AnalysisContext, AnalysisResult, ChatRequest, HistoryEntry, Job, JobStatus, StatusReport,
};
use normate_logging::{normate_debug, normate_info};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ApiError, ApiFailureKind};

/// Prefix the backend puts on the detail of a failed job's status response.
const ANALYSIS_FAILED_PREFIX: &str = "Analysis failed";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("normate/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionUpload {
    pub quant_files: Vec<UploadFile>,
    pub qual_files: Vec<UploadFile>,
    pub context: AnalysisContext,
}

#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    async fn submit(&self, upload: &SubmissionUpload) -> Result<Job, ApiError>;

    /// One status fetch. `Err` with `ApiFailureKind::NotReady` means "keep waiting".
    async fn get_status(&self, job_id: &str) -> Result<StatusReport, ApiError>;

    async fn chat(&self, job_id: &str, request: &ChatRequest) -> Result<String, ApiError>;

    async fn list_history(&self) -> Result<Vec<HistoryEntry>, ApiError>;

    async fn delete_history_item(&self, job_id: &str) -> Result<(), ApiError>;

    async fn wipe_history(&self) -> Result<(), ApiError>;

    /// Liveness probe; failures are reported as `false` and never surfaced.
    async fn health_check(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    base_url: Url,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    question: &'a str,
    report_context: &'a normate_core::ReportContextSnapshot,
}

#[derive(Deserialize)]
struct ChatReply {
    message: String,
}

#[derive(Deserialize)]
struct HistoryPage {
    #[serde(default)]
    jobs: Vec<HistoryEntry>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    detail: String,
}

#[derive(Deserialize)]
struct StatusProbe {
    status: JobStatus,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ReqwestApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(ApiFailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::new(
                ApiFailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| ApiError::new(ApiFailureKind::Network, err.to_string()))?;

        Ok(Self { base_url, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, ApiError> {
        request.send().await.map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl ApiClient for ReqwestApiClient {
    async fn submit(&self, upload: &SubmissionUpload) -> Result<Job, ApiError> {
        upload
            .context
            .validate()
            .map_err(|err| ApiError::new(ApiFailureKind::InvalidRequest, err.to_string()))?;
        if upload.quant_files.is_empty() || upload.qual_files.is_empty() {
            return Err(ApiError::new(
                ApiFailureKind::InvalidRequest,
                "at least one quantitative and one qualitative file are required",
            ));
        }

        let mut form = Form::new();
        for file in &upload.quant_files {
            form = form.part("quant_files", file_part(file));
        }
        for file in &upload.qual_files {
            form = form.part("qual_files", file_part(file));
        }
        let context = &upload.context;
        form = form
            .text("research_question", context.research_question.clone())
            .text("product_description", context.product_description.clone());
        if let Some(period) = context.time_period.as_ref() {
            form = form.text("time_period", period.clone());
        }
        if let Some(arpu) = context.arpu {
            form = form.text("arpu", arpu.to_string());
        }

        let url = self.endpoint(&["api", "analyze"]);
        normate_info!(
            "Submitting analysis quant_files={} qual_files={}",
            upload.quant_files.len(),
            upload.qual_files.len()
        );
        let response = self.send(self.client.post(url).multipart(form)).await?;
        let response = ensure_success(response).await?;
        decode_json::<Job>(response).await
    }

    async fn get_status(&self, job_id: &str) -> Result<StatusReport, ApiError> {
        let url = self.endpoint(&["api", "results", job_id]);
        let response = self.send(self.client.get(url)).await?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        if status == StatusCode::ACCEPTED {
            return match serde_json::from_slice::<StatusProbe>(&body) {
                Ok(probe) if !probe.status.is_terminal() => Ok(StatusReport::NotReady {
                    status: probe.status,
                }),
                _ => Err(ApiError::new(ApiFailureKind::NotReady, "accepted")),
            };
        }

        if status.is_success() {
            return parse_status_body(&body);
        }

        if status.is_server_error() {
            if let Ok(detail) = serde_json::from_slice::<ErrorDetail>(&body) {
                if let Some(reason) = detail.detail.strip_prefix(ANALYSIS_FAILED_PREFIX) {
                    let reason = reason.trim_start_matches(':').trim();
                    return Ok(StatusReport::Failed {
                        reason: if reason.is_empty() {
                            "unknown error".to_string()
                        } else {
                            reason.to_string()
                        },
                    });
                }
            }
        }

        Err(status_error(status, &body))
    }

    async fn chat(&self, job_id: &str, request: &ChatRequest) -> Result<String, ApiError> {
        let url = self.endpoint(&["api", "chat", job_id]);
        let body = ChatBody {
            question: &request.question,
            report_context: &request.context,
        };
        let response = self.send(self.client.post(url).json(&body)).await?;
        let response = ensure_success(response).await?;
        let reply = decode_json::<ChatReply>(response).await?;
        Ok(reply.message)
    }

    async fn list_history(&self) -> Result<Vec<HistoryEntry>, ApiError> {
        let url = self.endpoint(&["api", "history"]);
        let response = self.send(self.client.get(url)).await?;
        let response = ensure_success(response).await?;
        Ok(decode_json::<HistoryPage>(response).await?.jobs)
    }

    async fn delete_history_item(&self, job_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "history", job_id]);
        let response = self.send(self.client.delete(url)).await?;
        ensure_success(response).await.map(|_| ())
    }

    async fn wipe_history(&self) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "history"]);
        let response = self.send(self.client.delete(url)).await?;
        ensure_success(response).await.map(|_| ())
    }

    async fn health_check(&self) -> bool {
        let url = self.endpoint(&["health"]);
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                normate_debug!("Health check failed: {}", err);
                false
            }
        }
    }
}

fn file_part(file: &UploadFile) -> Part {
    Part::bytes(file.bytes.clone()).file_name(file.file_name.clone())
}

/// Interpret a 2xx status body: a status probe first, the full result only once
/// the job is completed.
fn parse_status_body(body: &[u8]) -> Result<StatusReport, ApiError> {
    let probe: StatusProbe = serde_json::from_slice(body)
        .map_err(|err| ApiError::new(ApiFailureKind::Decode, err.to_string()))?;

    match probe.status {
        JobStatus::Pending | JobStatus::Processing => Ok(StatusReport::NotReady {
            status: probe.status,
        }),
        JobStatus::Failed => Ok(StatusReport::Failed {
            reason: probe
                .error
                .or(probe.message)
                .unwrap_or_else(|| "unknown error".to_string()),
        }),
        JobStatus::Completed => {
            let result: AnalysisResult = serde_json::from_slice(body)
                .map_err(|err| ApiError::new(ApiFailureKind::Decode, err.to_string()))?;
            Ok(StatusReport::Completed(Box::new(result)))
        }
    }
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.unwrap_or_default();
    Err(status_error(status, &body))
}

async fn decode_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body)
        .map_err(|err| ApiError::new(ApiFailureKind::Decode, err.to_string()))
}

fn status_error(status: StatusCode, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ErrorDetail>(body)
        .map(|d| d.detail)
        .unwrap_or_else(|_| status.to_string());
    let kind = if status == StatusCode::NOT_FOUND {
        ApiFailureKind::NotFound
    } else {
        ApiFailureKind::HttpStatus(status.as_u16())
    };
    ApiError::new(kind, message)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(ApiFailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(ApiFailureKind::Decode, err.to_string());
    }
    ApiError::new(ApiFailureKind::Network, err.to_string())
}
