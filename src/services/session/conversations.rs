//! Conversation Gateway: list/load/delete conversations and send chat turns.

use crate::plugins::session::Message;
use crate::services::api::ChatRequest;
use crate::services::notices;

use super::intent::wants_dashboard;
use super::manager::{InFlight, SessionManager};

impl SessionManager {
    /// Refresh the conversation list. On failure the previous list stays.
    pub async fn list_conversations(&self) {
        match self.shared.api.list_conversations().await {
            Ok(conversations) => {
                self.shared
                    .update(|inner| inner.state.set_conversations(conversations));
            }
            Err(err) => log::warn!("Failed to list conversations: {}", err),
        }
    }

    /// Load one conversation's messages and staged files.
    ///
    /// Single-flight: returns false without doing anything while another load
    /// is pending.
    pub async fn load_conversation(&self, conversation_id: &str) -> bool {
        let started = self.shared.update(|inner| {
            if inner.loading_conversation {
                return false;
            }
            inner.loading_conversation = true;
            true
        });
        if !started {
            log::debug!("Load of {} skipped; another load is in flight", conversation_id);
            return false;
        }
        let _loading = InFlight::new(&self.shared, |inner| inner.loading_conversation = false);

        let messages = match self.shared.api.get_messages(conversation_id).await {
            Ok(messages) => messages,
            Err(err) => {
                log::error!("Failed to load conversation {}: {}", conversation_id, err);
                self.shared.update(|inner| {
                    inner.state.replace_messages(Vec::new());
                    inner.state.clear_files();
                });
                return true;
            }
        };

        self.shared.update(|inner| {
            inner.state.set_conversation_id(conversation_id);
            inner.state.replace_messages(messages);
        });

        let files = self.shared.api.get_files(conversation_id).await;
        self.shared.update(|inner| {
            match files {
                Ok(files) => inner.state.replace_files(files),
                Err(err) => {
                    log::warn!("Failed to load files for {}: {}", conversation_id, err);
                    inner.state.clear_files();
                }
            }
        });
        true
    }

    /// Delete on the server, then locally. Returns true on success.
    pub async fn delete_conversation(&self, conversation_id: &str) -> bool {
        if let Err(err) = self.shared.api.delete_conversation(conversation_id).await {
            log::error!("Failed to delete conversation {}: {}", conversation_id, err);
            return false;
        }

        self.shared.update(|inner| {
            inner.state.remove_conversation(conversation_id);
            if inner.state.conversation_id() == Some(conversation_id) {
                inner.state.start_new_conversation();
            }
        });
        log::info!("Deleted conversation {}", conversation_id);
        true
    }

    /// Send one chat turn.
    ///
    /// Ignored (returns false) when there is neither text nor a staged file, or
    /// while a previous send is still in flight.
    pub async fn send_message(&self, text: &str) -> bool {
        let text = text.trim().to_string();
        let accepted = self.shared.update(|inner| {
            if inner.sending || (text.is_empty() && inner.state.files().is_empty()) {
                return None;
            }
            inner.sending = true;
            if !text.is_empty() {
                inner.state.append_message(Message::user(text.clone()));
            }
            Some((
                inner.state.conversation_id().map(str::to_string),
                inner.state.files().len(),
            ))
        });
        let Some((conversation_id, staged)) = accepted else {
            return false;
        };
        let _sending = InFlight::new(&self.shared, |inner| inner.sending = false);

        let request = ChatRequest {
            message: if text.is_empty() {
                notices::upload_only_placeholder(staged)
            } else {
                text.clone()
            },
            conversation_id,
        };

        match self.shared.api.chat(&request).await {
            Ok(reply) => {
                let follow_up = self.shared.update(|inner| {
                    inner
                        .state
                        .append_message(Message::assistant(reply.response.clone(), reply.links()));
                    if let Some(id) = reply.conversation_id.as_deref() {
                        inner.state.adopt_conversation_id(id);
                    }

                    let paths = inner.state.file_paths();
                    if paths.is_empty() || !wants_dashboard(&text) {
                        return None;
                    }
                    inner
                        .state
                        .conversation_id()
                        .map(|id| (id.to_string(), paths))
                });

                if let Some((conversation_id, paths)) = follow_up {
                    self.create_dashboard(&text, &conversation_id, paths).await;
                }
            }
            Err(err) => {
                log::error!("Chat request failed: {}", err);
                self.shared
                    .update(|inner| inner.state.append_message(Message::error(notices::CHAT_FAILED)));
            }
        }

        self.list_conversations().await;
        true
    }
}
