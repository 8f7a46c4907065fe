//! In-memory session state.
//!
//! Pure data: every method is an infallible transition with no I/O. The
//! owning `SessionManager` serializes access and decides when the job poller
//! runs based on `jobs()`.

use std::collections::HashMap;

use super::types::{Conversation, Job, Message, UploadedFile};

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    conversation_id: Option<String>,
    messages: Vec<Message>,
    files: Vec<UploadedFile>,
    jobs: HashMap<String, Job>,
    conversations: Vec<Conversation>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn jobs(&self) -> &HashMap<String, Job> {
        &self.jobs
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn file_paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn job_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.jobs.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Drop the active conversation along with its log, staged files and jobs.
    pub fn start_new_conversation(&mut self) {
        self.conversation_id = None;
        self.messages.clear();
        self.files.clear();
        self.jobs.clear();
    }

    pub fn set_conversation_id(&mut self, conversation_id: impl Into<String>) {
        self.conversation_id = Some(conversation_id.into());
    }

    /// Take the server-assigned id only when no conversation is active yet.
    pub fn adopt_conversation_id(&mut self, conversation_id: &str) -> bool {
        if self.conversation_id.is_some() || conversation_id.trim().is_empty() {
            return false;
        }
        self.conversation_id = Some(conversation_id.to_string());
        true
    }

    /// Log order is call order, never timestamp order.
    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn replace_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// True when a completed terminal message with this exact content exists.
    pub fn has_completed_message(&self, content: &str) -> bool {
        self.messages
            .iter()
            .any(|m| m.is_completed() && m.content() == content)
    }

    pub fn extend_files(&mut self, files: impl IntoIterator<Item = UploadedFile>) {
        self.files.extend(files);
    }

    pub fn replace_files(&mut self, files: Vec<UploadedFile>) {
        self.files = files;
    }

    pub fn clear_files(&mut self) {
        self.files.clear();
    }

    /// Out-of-range indices are ignored.
    pub fn remove_file(&mut self, index: usize) -> Option<UploadedFile> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }

    pub fn merge_job_status(&mut self, job_id: impl Into<String>, job: Job) {
        self.jobs.insert(job_id.into(), job);
    }

    pub fn retire_job(&mut self, job_id: &str) -> Option<Job> {
        self.jobs.remove(job_id)
    }

    pub fn set_conversations(&mut self, conversations: Vec<Conversation>) {
        self.conversations = conversations;
    }

    pub fn remove_conversation(&mut self, conversation_id: &str) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != conversation_id);
        self.conversations.len() != before
    }
}
