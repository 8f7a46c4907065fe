use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::plugins::session::{Conversation, Message, UploadedFile};
use crate::services::config::ClientConfig;

use super::error::ApiError;
use super::files;
use super::types::{
    ChatReply, ChatRequest, ConversationsReply, DashboardReply, DashboardRequest, FilesReply,
    HealthReply, JobStatusReply, MessagesReply, ServerConfigReply, UploadPart, UploadReply,
};
use super::DashboardApi;

/// `DashboardApi` over HTTP/JSON with reqwest.
#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    http_client: Client,
    base_url: Url,
}

impl HttpDashboardApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder().pool_max_idle_per_host(8);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;
        Self::with_client(http_client, &config.api_base_url)
    }

    pub fn with_client(http_client: Client, base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Append path segments to the base URL; ids are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let resp = self.http_client.get(self.endpoint(segments)?).send().await?;
        read_json(resp).await
    }
}

async fn ensure_success(resp: Response) -> Result<Response, ApiError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    Err(ApiError::from_response(status, text))
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let resp = ensure_success(resp).await?;
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()))
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ApiError> {
        let reply: ConversationsReply = self.get_json(&["conversations"]).await?;
        Ok(reply.conversations)
    }

    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>, ApiError> {
        let reply: MessagesReply = self.get_json(&["conversations", conversation_id]).await?;
        Ok(reply.into_messages())
    }

    async fn get_files(&self, conversation_id: &str) -> Result<Vec<UploadedFile>, ApiError> {
        let reply: FilesReply = self
            .get_json(&["conversations", conversation_id, "files"])
            .await?;
        Ok(reply.files)
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), ApiError> {
        let resp = self
            .http_client
            .delete(self.endpoint(&["conversations", conversation_id])?)
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        let resp = self
            .http_client
            .post(self.endpoint(&["chat"])?)
            .json(request)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn upload(
        &self,
        parts: Vec<UploadPart>,
        conversation_id: Option<&str>,
    ) -> Result<UploadReply, ApiError> {
        let mut form = Form::new();
        for part in parts {
            let mime = files::mime_type(&part.file_name);
            let file_part = Part::bytes(part.bytes)
                .file_name(part.file_name)
                .mime_str(&mime)?;
            form = form.part("files", file_part);
        }

        let mut req = self.http_client.post(self.endpoint(&["upload"])?);
        if let Some(conversation_id) = conversation_id {
            form = form.text("conversation_id", conversation_id.to_string());
            // The backend reads the id from the query string.
            req = req.query(&[("conversation_id", conversation_id)]);
        }

        let resp = req.multipart(form).send().await?;
        read_json(resp).await
    }

    async fn create_dashboard(
        &self,
        request: &DashboardRequest,
    ) -> Result<DashboardReply, ApiError> {
        let resp = self
            .http_client
            .post(self.endpoint(&["create-dashboard"])?)
            .json(request)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusReply, ApiError> {
        self.get_json(&["job-status", job_id]).await
    }

    async fn health(&self) -> Result<HealthReply, ApiError> {
        self.get_json(&["health"]).await
    }

    async fn server_config(&self) -> Result<ServerConfigReply, ApiError> {
        self.get_json(&["config"]).await
    }
}
