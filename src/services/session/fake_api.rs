//! Scripted in-memory `DashboardApi` for manager tests.
//!
//! Each endpoint pops canned results in order and falls back to a benign
//! default once its queue is empty. Every call is recorded by name.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::plugins::session::{Conversation, Message, UploadedFile};
use crate::services::api::{
    ApiError, ChatReply, ChatRequest, DashboardApi, DashboardReply, DashboardRequest,
    HealthReply, JobStatusReply, ServerConfigReply, UploadPart, UploadReply,
};

type Queue<T> = Mutex<VecDeque<Result<T, ApiError>>>;

#[derive(Default)]
pub(super) struct FakeApi {
    conversations: Queue<Vec<Conversation>>,
    messages: Queue<Vec<Message>>,
    files: Queue<Vec<UploadedFile>>,
    deletes: Queue<()>,
    chats: Queue<ChatReply>,
    uploads: Queue<UploadReply>,
    dashboards: Queue<DashboardReply>,
    job_statuses: Mutex<HashMap<String, VecDeque<Result<JobStatusReply, ApiError>>>>,
    calls: Mutex<Vec<String>>,
    chat_requests: Mutex<Vec<ChatRequest>>,
    dashboard_requests: Mutex<Vec<DashboardRequest>>,
    message_gate: Gate,
    chat_gate: Gate,
    upload_gate: Gate,
}

type Gate = Mutex<Option<Arc<Notify>>>;

fn close(gate: &Gate) -> Arc<Notify> {
    let notify = Arc::new(Notify::new());
    *gate.lock().unwrap() = Some(notify.clone());
    notify
}

async fn pass(gate: &Gate) {
    let notify = gate.lock().unwrap().clone();
    if let Some(notify) = notify {
        notify.notified().await;
    }
}

fn push<T>(queue: &Queue<T>, item: Result<T, ApiError>) {
    queue.lock().unwrap().push_back(item);
}

fn pop<T>(queue: &Queue<T>) -> Option<Result<T, ApiError>> {
    queue.lock().unwrap().pop_front()
}

pub(super) fn chat_reply(json: serde_json::Value) -> ChatReply {
    serde_json::from_value(json).unwrap()
}

pub(super) fn job_reply(json: serde_json::Value) -> JobStatusReply {
    serde_json::from_value(json).unwrap()
}

pub(super) fn server_error(status: u16) -> ApiError {
    ApiError::from_response(status, String::new())
}

impl FakeApi {
    pub(super) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(super) fn push_conversations(&self, item: Result<Vec<Conversation>, ApiError>) {
        push(&self.conversations, item);
    }

    pub(super) fn push_messages(&self, item: Result<Vec<Message>, ApiError>) {
        push(&self.messages, item);
    }

    pub(super) fn push_files(&self, item: Result<Vec<UploadedFile>, ApiError>) {
        push(&self.files, item);
    }

    pub(super) fn push_delete(&self, item: Result<(), ApiError>) {
        push(&self.deletes, item);
    }

    pub(super) fn push_chat(&self, item: Result<ChatReply, ApiError>) {
        push(&self.chats, item);
    }

    pub(super) fn push_upload(&self, item: Result<UploadReply, ApiError>) {
        push(&self.uploads, item);
    }

    pub(super) fn push_dashboard(&self, item: Result<DashboardReply, ApiError>) {
        push(&self.dashboards, item);
    }

    pub(super) fn push_job_status(&self, job_id: &str, item: Result<JobStatusReply, ApiError>) {
        self.job_statuses
            .lock()
            .unwrap()
            .entry(job_id.to_string())
            .or_default()
            .push_back(item);
    }

    /// Make `get_messages` wait until the returned notify fires.
    pub(super) fn gate_messages(&self) -> Arc<Notify> {
        close(&self.message_gate)
    }

    pub(super) fn gate_chat(&self) -> Arc<Notify> {
        close(&self.chat_gate)
    }

    pub(super) fn gate_uploads(&self) -> Arc<Notify> {
        close(&self.upload_gate)
    }

    /// Let every later call through immediately.
    pub(super) fn open_gates(&self) {
        for gate in [&self.message_gate, &self.chat_gate, &self.upload_gate] {
            *gate.lock().unwrap() = None;
        }
    }

    pub(super) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(super) fn count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == name).count()
    }

    pub(super) fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub(super) fn dashboard_requests(&self) -> Vec<DashboardRequest> {
        self.dashboard_requests.lock().unwrap().clone()
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, ApiError> {
        self.record("list_conversations");
        pop(&self.conversations).unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn get_messages(&self, _conversation_id: &str) -> Result<Vec<Message>, ApiError> {
        self.record("get_messages");
        pass(&self.message_gate).await;
        pop(&self.messages).unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn get_files(&self, _conversation_id: &str) -> Result<Vec<UploadedFile>, ApiError> {
        self.record("get_files");
        pop(&self.files).unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn delete_conversation(&self, _conversation_id: &str) -> Result<(), ApiError> {
        self.record("delete_conversation");
        pop(&self.deletes).unwrap_or(Ok(()))
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.record("chat");
        self.chat_requests.lock().unwrap().push(request.clone());
        pass(&self.chat_gate).await;
        pop(&self.chats).unwrap_or_else(|| {
            Ok(chat_reply(serde_json::json!({
                "response": "ok",
                "conversation_id": request.conversation_id.clone().unwrap_or_else(|| "c-new".into())
            })))
        })
    }

    async fn upload(
        &self,
        parts: Vec<UploadPart>,
        conversation_id: Option<&str>,
    ) -> Result<UploadReply, ApiError> {
        self.record("upload");
        pass(&self.upload_gate).await;
        pop(&self.uploads).unwrap_or_else(|| {
            Ok(UploadReply {
                file_names: parts.into_iter().map(|p| p.file_name).collect(),
                conversation_id: Some(conversation_id.unwrap_or("c-upload").to_string()),
                message: None,
            })
        })
    }

    async fn create_dashboard(
        &self,
        request: &DashboardRequest,
    ) -> Result<DashboardReply, ApiError> {
        self.record("create_dashboard");
        self.dashboard_requests.lock().unwrap().push(request.clone());
        pop(&self.dashboards).unwrap_or_else(|| Ok(DashboardReply::default()))
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusReply, ApiError> {
        self.record("job_status");
        let next = self
            .job_statuses
            .lock()
            .unwrap()
            .get_mut(job_id)
            .and_then(|q| q.pop_front());
        next.unwrap_or_else(|| {
            Ok(job_reply(serde_json::json!({"status": "processing", "progress": 10})))
        })
    }

    async fn health(&self) -> Result<HealthReply, ApiError> {
        self.record("health");
        Ok(HealthReply {
            status: "healthy".into(),
            timestamp: None,
            version: Some("1.0.0".into()),
            services: HashMap::new(),
        })
    }

    async fn server_config(&self) -> Result<ServerConfigReply, ApiError> {
        self.record("server_config");
        Ok(ServerConfigReply {
            ai_providers: HashMap::new(),
            powerbi_configured: false,
            max_file_size: Some(104_857_600),
            max_files_per_upload: Some(10),
            debug_mode: false,
        })
    }
}
