//! HTTP contract of the dashboard backend.
//!
//! `DashboardApi` is the seam the session manager talks through;
//! `HttpDashboardApi` is the reqwest implementation.

mod client;
mod error;
pub mod files;
mod types;

use async_trait::async_trait;

use crate::plugins::session::{Conversation, Message, UploadedFile};

pub use client::HttpDashboardApi;
pub use error::ApiError;
pub use types::{
    ChatReply, ChatRequest, DashboardReply, DashboardRequest, HealthReply, JobStatusReply,
    ServerConfigReply, UploadPart, UploadReply,
};

#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /conversations`
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ApiError>;

    /// `GET /conversations/{id}`
    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<Message>, ApiError>;

    /// `GET /conversations/{id}/files`
    async fn get_files(&self, conversation_id: &str) -> Result<Vec<UploadedFile>, ApiError>;

    /// `DELETE /conversations/{id}`
    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), ApiError>;

    /// `POST /chat`
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError>;

    /// `POST /upload` (multipart)
    async fn upload(
        &self,
        parts: Vec<UploadPart>,
        conversation_id: Option<&str>,
    ) -> Result<UploadReply, ApiError>;

    /// `POST /create-dashboard`
    async fn create_dashboard(&self, request: &DashboardRequest)
        -> Result<DashboardReply, ApiError>;

    /// `GET /job-status/{job_id}`
    async fn job_status(&self, job_id: &str) -> Result<JobStatusReply, ApiError>;

    /// `GET /health`
    async fn health(&self) -> Result<HealthReply, ApiError>;

    /// `GET /config`
    async fn server_config(&self) -> Result<ServerConfigReply, ApiError>;
}
