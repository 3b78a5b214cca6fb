use std::time::Duration;

use bytes::Bytes;
use cvmatch_core::{
    Collection, FetchParams, ItemId, JobDraft, MatchLookup, SelectedFile, TaskId, UploadTarget,
};
use cvmatch_logging::{cvm_debug, cvm_trace};
use futures_util::{Stream, StreamExt};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tokio::sync::mpsc;
use url::Url;

use crate::{ApiError, EngineEvent, FailureKind, UploadProgress};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub upload_chunk_size: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            upload_chunk_size: 16 * 1024,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The REST surface of the matching backend.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    async fn fetch_page(
        &self,
        collection: Collection,
        params: &FetchParams,
    ) -> Result<Value, ApiError>;

    async fn fetch_lookup(&self, lookup: MatchLookup) -> Result<Value, ApiError>;

    async fn fetch_candidate(&self, id: ItemId) -> Result<Value, ApiError>;

    /// Posts `draft` as JSON and returns the stored job.
    async fn create_job(&self, draft: &JobDraft) -> Result<Value, ApiError>;

    async fn fetch_statistics(&self) -> Result<Value, ApiError>;

    async fn delete(&self, collection: Collection, id: ItemId) -> Result<(), ApiError>;

    /// Posts one file as multipart field `file`, reporting progress through `sink`.
    async fn upload(
        &self,
        target: UploadTarget,
        task_id: TaskId,
        file: &SelectedFile,
        sink: &dyn ProgressSink,
    ) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    settings: ClientSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
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

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(&format!("api/{path}"))
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn get_json(&self, url: Url, query: &[(&str, String)]) -> Result<Value, ApiError> {
        cvm_debug!("GET {} {:?}", url, query);
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }
}

#[async_trait::async_trait]
impl ApiClient for ReqwestApiClient {
    async fn fetch_page(
        &self,
        collection: Collection,
        params: &FetchParams,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(&format!("{}/", collection.path_segment()))?;
        self.get_json(url, &params.query_pairs()).await
    }

    async fn fetch_lookup(&self, lookup: MatchLookup) -> Result<Value, ApiError> {
        let url = self.endpoint(&lookup.path())?;
        self.get_json(url, &[]).await
    }

    async fn fetch_candidate(&self, id: ItemId) -> Result<Value, ApiError> {
        let url = self.endpoint(&format!("cvs/{id}/"))?;
        self.get_json(url, &[]).await
    }

    async fn create_job(&self, draft: &JobDraft) -> Result<Value, ApiError> {
        let url = self.endpoint("jobs/")?;
        cvm_debug!("POST {} title={:?}", url, draft.title);
        let response = self
            .client
            .post(url)
            .json(draft)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    async fn fetch_statistics(&self) -> Result<Value, ApiError> {
        let url = self.endpoint("statistics/")?;
        self.get_json(url, &[]).await
    }

    async fn delete(&self, collection: Collection, id: ItemId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("{}/{id}/", collection.path_segment()))?;
        cvm_debug!("DELETE {}", url);
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response).map(|_| ())
    }

    async fn upload(
        &self,
        target: UploadTarget,
        task_id: TaskId,
        file: &SelectedFile,
        sink: &dyn ProgressSink,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("{}/", target.collection().path_segment()))?;
        let total = file.contents.len() as u64;
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        let body = reqwest::Body::wrap_stream(chunked_with_progress(
            file.contents.clone(),
            self.settings.upload_chunk_size,
            progress_tx,
        ));

        let part = Part::stream_with_length(body, total)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|err| ApiError::new(FailureKind::ProcessingError, err.to_string()))?;
        let mut form = Form::new().part("file", part);
        for (key, value) in &file.fields {
            form = form.text(key.clone(), value.clone());
        }

        cvm_debug!("POST {} file={} bytes={}", url, file.name, total);
        let request = self.client.post(url).multipart(form).send();
        tokio::pin!(request);

        let emit = |percent: u8| {
            sink.emit(EngineEvent::UploadProgress(UploadProgress {
                target,
                task_id,
                percent,
            }));
        };
        let response = loop {
            tokio::select! {
                Some(percent) = progress_rx.recv() => emit(percent),
                response = &mut request => break response.map_err(map_reqwest_error)?,
            }
        };
        while let Ok(percent) = progress_rx.try_recv() {
            emit(percent);
        }

        ensure_success(response)?;
        cvm_trace!("Upload of {} accepted", file.name);
        Ok(())
    }
}

/// Splits `contents` into chunks, announcing the cumulative percent as each one is taken.
fn chunked_with_progress(
    contents: Bytes,
    chunk_size: usize,
    progress: mpsc::UnboundedSender<u8>,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    let total = contents.len();
    let chunk_size = chunk_size.max(1);
    futures_util::stream::iter((0..total).step_by(chunk_size)).map(move |start| {
        let end = (start + chunk_size).min(total);
        let _ = progress.send(percent_of(end, total));
        Ok(contents.slice(start..end))
    })
}

fn percent_of(sent: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
    let response = ensure_success(response)?;
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_rounded_and_capped() {
        assert_eq!(percent_of(0, 0), 100);
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(2, 3), 67);
        assert_eq!(percent_of(3, 3), 100);
    }

    #[test]
    fn base_url_without_trailing_slash_keeps_its_path() {
        let client = ReqwestApiClient::new(ClientSettings {
            base_url: "http://example.com/backend".to_string(),
            ..ClientSettings::default()
        })
        .expect("valid settings");

        let url = client.endpoint("cvs/").expect("joinable");
        assert_eq!(url.as_str(), "http://example.com/backend/api/cvs/");
    }
}
