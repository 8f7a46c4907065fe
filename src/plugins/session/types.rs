use serde::{Deserialize, Serialize};

const DEFAULT_CONVERSATION_TITLE: &str = "New Conversation";

pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn default_title() -> String {
    DEFAULT_CONVERSATION_TITLE.to_string()
}

/// Server-tracked conversation as listed by `GET /conversations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_link: Option<String>,
}

impl DashboardLinks {
    pub fn new(dashboard_url: Option<String>, download_link: Option<String>) -> Self {
        Self {
            dashboard_url: dashboard_url.filter(|v| !v.trim().is_empty()),
            download_link: download_link.filter(|v| !v.trim().is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dashboard_url.is_none() && self.download_link.is_none()
    }
}

/// One entry of the conversation log.
///
/// `Error` is the synthetic "system-error" role: failures caught at a gateway
/// boundary are rendered through it instead of escaping to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    User {
        content: String,
        timestamp: String,
    },
    Assistant {
        content: String,
        timestamp: String,
        #[serde(flatten)]
        links: DashboardLinks,
        completed: bool,
    },
    Error {
        content: String,
        timestamp: String,
    },
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
            timestamp: now_timestamp(),
        }
    }

    pub fn assistant(content: impl Into<String>, links: DashboardLinks) -> Self {
        Self::Assistant {
            content: content.into(),
            timestamp: now_timestamp(),
            links,
            completed: false,
        }
    }

    /// Terminal message for a finished dashboard job.
    pub fn completed(content: impl Into<String>, links: DashboardLinks) -> Self {
        Self::Assistant {
            content: content.into(),
            timestamp: now_timestamp(),
            links,
            completed: true,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::Error {
            content: content.into(),
            timestamp: now_timestamp(),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::User { content, .. }
            | Self::Assistant { content, .. }
            | Self::Error { content, .. } => content,
        }
    }

    pub fn links(&self) -> Option<&DashboardLinks> {
        match self {
            Self::Assistant { links, .. } if !links.is_empty() => Some(links),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Assistant { completed: true, .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// A file staged for the active conversation.
///
/// Field names follow `GET /conversations/{id}/files`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub path: String,
    #[serde(rename = "type", default)]
    pub file_type: String,
    #[serde(rename = "uploadTime", default)]
    pub upload_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    /// Backend stages (`starting`, `creating_dashboard`, ...) all count as processing.
    pub fn from_wire(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "completed" => Self::Completed,
            "error" => Self::Error,
            _ => Self::Processing,
        }
    }
}

/// Last-known status of a dashboard-generation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub status: JobStatus,
    /// Advisory only; not checked for monotonicity.
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(flatten)]
    pub links: DashboardLinks,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// Entry inserted when `create-dashboard` hands back a job id.
    pub fn processing() -> Self {
        Self {
            status: JobStatus::Processing,
            progress: 0,
            stage: None,
            response: None,
            links: DashboardLinks::default(),
            error: None,
        }
    }
}
