//! Upload Gateway: stage files for the active (or not yet created)
//! conversation and start dashboard jobs for them.
//!
//! Uploads run independently of chat sends; they never touch `is_sending`.

use std::path::{Path, PathBuf};

use crate::plugins::session::{now_timestamp, Job, Message, UploadedFile};
use crate::services::api::files;
use crate::services::api::{ApiError, DashboardRequest, UploadPart};
use crate::services::notices;

use super::manager::{InFlight, SessionManager};

async fn read_part(path: &Path) -> Result<UploadPart, ApiError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Parse(format!("Invalid file name: {}", path.display())))?;
    let bytes = tokio::fs::read(path).await?;
    Ok(UploadPart { file_name, bytes })
}

impl SessionManager {
    /// Upload files and stage them. Returns true when the server accepted them.
    ///
    /// Files with extensions outside `files::ACCEPTED_EXTENSIONS` are skipped.
    pub async fn upload_files(&self, paths: &[PathBuf]) -> bool {
        let accepted: Vec<&PathBuf> = paths
            .iter()
            .filter(|path| {
                let name = path.to_string_lossy();
                let ok = files::is_accepted(&name);
                if !ok {
                    log::warn!("Skipping unsupported file type: {}", path.display());
                }
                ok
            })
            .collect();
        if accepted.is_empty() {
            return false;
        }

        let conversation_id = self.shared.update(|inner| {
            inner.uploads_in_flight += 1;
            inner.state.conversation_id().map(str::to_string)
        });
        let _uploading = InFlight::new(&self.shared, |inner| {
            inner.uploads_in_flight = inner.uploads_in_flight.saturating_sub(1)
        });

        let result = self.send_upload(&accepted, conversation_id.as_deref()).await;

        self.shared.update(|inner| {
            match result {
                Ok(reply) => {
                    if let Some(id) = reply.conversation_id.as_deref() {
                        inner.state.adopt_conversation_id(id);
                    }
                    let Some(owner) = inner
                        .state
                        .conversation_id()
                        .or(reply.conversation_id.as_deref())
                        .filter(|id| !id.trim().is_empty())
                        .map(str::to_string)
                    else {
                        log::warn!(
                            "Upload reply carried no conversation id; {} file(s) not staged",
                            reply.file_names.len()
                        );
                        return false;
                    };
                    let uploaded_at = now_timestamp();
                    let staged = reply.file_names.iter().map(|name| UploadedFile {
                        name: name.clone(),
                        path: files::staged_path(&owner, name),
                        file_type: files::file_type(name),
                        upload_time: uploaded_at.clone(),
                    });
                    inner.state.extend_files(staged);
                    log::info!(
                        "Uploaded {} file(s) to conversation {}",
                        reply.file_names.len(),
                        owner
                    );
                    true
                }
                Err(err) => {
                    log::error!("File upload failed: {}", err);
                    inner
                        .state
                        .append_message(Message::error(notices::upload_failure(&err)));
                    false
                }
            }
        })
    }

    async fn send_upload(
        &self,
        paths: &[&PathBuf],
        conversation_id: Option<&str>,
    ) -> Result<crate::services::api::UploadReply, ApiError> {
        let mut parts = Vec::with_capacity(paths.len());
        for path in paths {
            parts.push(read_part(path).await?);
        }
        self.shared.api.upload(parts, conversation_id).await
    }

    /// Drop a staged file from the local view only.
    pub fn remove_staged_file(&self, index: usize) -> Option<UploadedFile> {
        self.shared.update(|inner| inner.state.remove_file(index))
    }

    /// Ask the backend to build a dashboard; a returned job id arms the poller.
    pub async fn create_dashboard(
        &self,
        message: &str,
        conversation_id: &str,
        file_paths: Vec<String>,
    ) -> Option<String> {
        let request = DashboardRequest {
            message: message.to_string(),
            conversation_id: conversation_id.to_string(),
            file_paths,
        };

        match self.shared.api.create_dashboard(&request).await {
            Ok(reply) => match reply.job_id.filter(|id| !id.trim().is_empty()) {
                Some(job_id) => {
                    self.shared.update(|inner| {
                        inner.state.merge_job_status(job_id.clone(), Job::processing())
                    });
                    log::info!("Dashboard job {} started", job_id);
                    Some(job_id)
                }
                None => {
                    let error = reply
                        .error
                        .filter(|e| !e.trim().is_empty())
                        .unwrap_or_else(|| notices::DASHBOARD_START_FAILED.to_string());
                    log::warn!("Dashboard creation not started: {}", error);
                    self.shared
                        .update(|inner| inner.state.append_message(Message::error(error)));
                    None
                }
            },
            Err(err) => {
                log::error!("Dashboard creation request failed: {}", err);
                self.shared.update(|inner| {
                    inner
                        .state
                        .append_message(Message::error(notices::DASHBOARD_START_FAILED))
                });
                None
            }
        }
    }
}
