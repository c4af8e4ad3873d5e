//! Scripted [`DriveApi`] double.
//!
//! Pages and failures are queued up front and handed out in order. Every
//! request is recorded so tests can assert on what was asked for.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::api::{
    DriveApi, FileListRequest, Page, PermissionListRequest, RemoteFile, RemoteOwner,
    RemotePermission,
};

enum Scripted<T> {
    Page(Page<T>),
    Fail(String),
}

#[derive(Default)]
struct State {
    file_pages: VecDeque<Scripted<RemoteFile>>,
    permission_pages: HashMap<String, VecDeque<Scripted<RemotePermission>>>,
    file_requests: Vec<FileListRequest>,
    permission_requests: Vec<(String, PermissionListRequest)>,
    cancel_after_file_pages: Option<(usize, CancellationToken)>,
    cancel_on_permissions: HashMap<String, CancellationToken>,
}

/// In-memory listing source.
///
/// An exhausted file queue answers with an empty last page. A file with no
/// scripted permissions has none.
#[derive(Default)]
pub struct ScriptedDriveApi {
    state: Mutex<State>,
}

impl ScriptedDriveApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock only happens after a test already panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push_file_page(&self, page: Page<RemoteFile>) {
        self.state().file_pages.push_back(Scripted::Page(page));
    }

    /// Serve all files as a single page.
    pub fn with_files(self, files: Vec<RemoteFile>) -> Self {
        self.push_file_page(Page::last(files));
        self
    }

    pub fn fail_files(&self, message: &str) {
        self.state()
            .file_pages
            .push_back(Scripted::Fail(message.to_string()));
    }

    pub fn push_permission_page(&self, file_id: &str, page: Page<RemotePermission>) {
        self.state()
            .permission_pages
            .entry(file_id.to_string())
            .or_default()
            .push_back(Scripted::Page(page));
    }

    /// Serve `permissions` for `file_id` as a single page.
    pub fn set_permissions(&self, file_id: &str, permissions: Vec<RemotePermission>) {
        self.push_permission_page(file_id, Page::last(permissions));
    }

    pub fn fail_permissions(&self, file_id: &str, message: &str) {
        self.state()
            .permission_pages
            .entry(file_id.to_string())
            .or_default()
            .push_back(Scripted::Fail(message.to_string()));
    }

    /// Cancel `token` once `pages` file pages have been served.
    pub fn cancel_after_file_pages(&self, pages: usize, token: CancellationToken) {
        self.state().cancel_after_file_pages = Some((pages, token));
    }

    /// Cancel `token` when permissions for `file_id` are requested.
    pub fn cancel_on_permissions(&self, file_id: &str, token: CancellationToken) {
        self.state()
            .cancel_on_permissions
            .insert(file_id.to_string(), token);
    }

    pub fn file_requests(&self) -> Vec<FileListRequest> {
        self.state().file_requests.clone()
    }

    pub fn permission_requests(&self) -> Vec<(String, PermissionListRequest)> {
        self.state().permission_requests.clone()
    }

    /// File ids whose permissions were requested, in call order.
    pub fn permission_file_ids(&self) -> Vec<String> {
        self.state()
            .permission_requests
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl DriveApi for ScriptedDriveApi {
    async fn list_files(&self, request: &FileListRequest) -> anyhow::Result<Page<RemoteFile>> {
        let mut state = self.state();
        state.file_requests.push(request.clone());

        if let Some((after, token)) = &state.cancel_after_file_pages {
            if state.file_requests.len() >= *after {
                token.cancel();
            }
        }

        match state.file_pages.pop_front() {
            Some(Scripted::Page(page)) => Ok(page),
            Some(Scripted::Fail(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(Page::last(Vec::new())),
        }
    }

    async fn list_permissions(
        &self,
        file_id: &str,
        request: &PermissionListRequest,
    ) -> anyhow::Result<Page<RemotePermission>> {
        let mut state = self.state();
        state
            .permission_requests
            .push((file_id.to_string(), request.clone()));

        if let Some(token) = state.cancel_on_permissions.get(file_id) {
            token.cancel();
        }

        match state
            .permission_pages
            .get_mut(file_id)
            .and_then(|queue| queue.pop_front())
        {
            Some(Scripted::Page(page)) => Ok(page),
            Some(Scripted::Fail(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(Page::last(Vec::new())),
        }
    }
}

/// A remote file owned by `owner`.
pub fn file(id: &str, name: &str, owner: &str) -> RemoteFile {
    RemoteFile {
        id: id.to_string(),
        name: name.to_string(),
        mime_type: "application/pdf".to_string(),
        owners: vec![RemoteOwner {
            email_address: owner.to_string(),
            display_name: None,
        }],
        created_time: "2024-01-15T10:30:00Z".to_string(),
        modified_time: "2024-02-01T08:00:00Z".to_string(),
        size: 1024,
    }
}

pub fn permission(
    id: &str,
    kind: &str,
    email_address: Option<&str>,
    domain: Option<&str>,
) -> RemotePermission {
    RemotePermission {
        id: id.to_string(),
        kind: kind.to_string(),
        role: "reader".to_string(),
        email_address: email_address.map(str::to_string),
        domain: domain.map(str::to_string),
        display_name: None,
    }
}
