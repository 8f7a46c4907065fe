use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::plugins::session::{
    now_timestamp, Conversation, DashboardLinks, Job, JobStatus, Message, UploadedFile,
};

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub dashboard_url: Option<String>,
    #[serde(default)]
    pub download_link: Option<String>,
}

impl ChatReply {
    pub fn links(&self) -> DashboardLinks {
        DashboardLinks::new(self.dashboard_url.clone(), self.download_link.clone())
    }
}

/// Body of `POST /create-dashboard`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardRequest {
    pub message: String,
    pub conversation_id: String,
    pub file_paths: Vec<String>,
}

/// `job_id` is absent when the backend refuses to start (e.g. no files known).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardReply {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadReply {
    #[serde(default)]
    pub file_names: Vec<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One file for `POST /upload`, already read into memory.
#[derive(Debug, Clone)]
pub struct UploadPart {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusReply {
    pub status: String,
    #[serde(default)]
    pub progress: Option<i64>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub dashboard_url: Option<String>,
    #[serde(default)]
    pub download_link: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<JobStatusReply> for Job {
    fn from(reply: JobStatusReply) -> Self {
        let status = JobStatus::from_wire(&reply.status);
        let stage = match status {
            JobStatus::Processing => Some(reply.status.clone()).filter(|s| !s.trim().is_empty()),
            _ => None,
        };
        Job {
            status,
            progress: reply.progress.unwrap_or(0).clamp(0, 100) as u8,
            stage,
            response: reply.response,
            links: DashboardLinks::new(reply.dashboard_url, reply.download_link),
            error: reply.error,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ConversationsReply {
    #[serde(default)]
    pub(super) conversations: Vec<Conversation>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct FilesReply {
    #[serde(default)]
    pub(super) files: Vec<UploadedFile>,
}

/// `GET /conversations/{id}` answers either `{messages: [...]}` or a bare list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum MessagesReply {
    Wrapped {
        #[serde(default)]
        messages: Vec<WireMessage>,
    },
    Bare(Vec<WireMessage>),
}

impl MessagesReply {
    pub(super) fn into_messages(self) -> Vec<Message> {
        let wire = match self {
            Self::Wrapped { messages } => messages,
            Self::Bare(messages) => messages,
        };
        wire.into_iter().map(Message::from).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct WireMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    dashboard_url: Option<String>,
    #[serde(default)]
    download_link: Option<String>,
    #[serde(default)]
    error: Option<bool>,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(default)]
    metadata: Option<HashMap<String, serde_json::Value>>,
}

impl WireMessage {
    fn metadata_str(&self, key: &str) -> Option<String> {
        self.metadata
            .as_ref()?
            .get(key)?
            .as_str()
            .map(str::to_string)
    }
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        let timestamp = wire.timestamp.clone().unwrap_or_else(now_timestamp);
        let role = wire.role.trim().to_ascii_lowercase();

        if role == "user" {
            return Message::User {
                content: wire.content,
                timestamp,
            };
        }
        if role == "error" || role == "system-error" || wire.error == Some(true) {
            return Message::Error {
                content: wire.content,
                timestamp,
            };
        }

        let links = DashboardLinks::new(
            wire.dashboard_url
                .clone()
                .or_else(|| wire.metadata_str("dashboard_url")),
            wire.download_link
                .clone()
                .or_else(|| wire.metadata_str("download_link")),
        );
        Message::Assistant {
            content: wire.content,
            timestamp,
            links,
            completed: wire.completed.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthReply {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub services: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfigReply {
    #[serde(default)]
    pub ai_providers: HashMap<String, bool>,
    #[serde(default)]
    pub powerbi_configured: bool,
    #[serde(default)]
    pub max_file_size: Option<u64>,
    #[serde(default)]
    pub max_files_per_upload: Option<u32>,
    #[serde(default)]
    pub debug_mode: bool,
}
