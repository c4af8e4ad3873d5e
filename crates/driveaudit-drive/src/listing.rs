use std::sync::Arc;

use driveaudit_core::PermissionRecord;
use tokio_util::sync::CancellationToken;

use crate::api::{
    DriveApi, FileListRequest, PermissionListRequest, RemoteFile, FILE_FIELDS, PERMISSION_FIELDS,
};
use crate::pagination::{fetch_all, FetchError};

const FILE_CORPORA: &str = "domain";

/// Paginated listings over a [`DriveApi`]
#[derive(Clone)]
pub struct DriveClient {
    api: Arc<dyn DriveApi>,
    page_size: i64,
    include_shared_drives: bool,
}

impl DriveClient {
    pub fn new(api: Arc<dyn DriveApi>, page_size: i64, include_shared_drives: bool) -> Self {
        Self {
            api,
            page_size,
            include_shared_drives,
        }
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// List every file visible to the domain, across all pages.
    pub async fn list_all_files(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<RemoteFile>, FetchError<RemoteFile>> {
        let target = format!("corpus {}", FILE_CORPORA);
        fetch_all(cancel, "list files", &target, |page_token| {
            let request = FileListRequest {
                corpora: FILE_CORPORA.to_string(),
                page_size: self.page_size,
                page_token,
                fields: FILE_FIELDS.to_string(),
                supports_all_drives: self.include_shared_drives,
                include_items_from_all_drives: self.include_shared_drives,
            };
            let api = Arc::clone(&self.api);
            async move { api.list_files(&request).await }
        })
        .await
    }

    /// List every permission on `file_id`, across all pages.
    pub async fn get_file_permissions(
        &self,
        cancel: &CancellationToken,
        file_id: &str,
    ) -> Result<Vec<PermissionRecord>, FetchError<PermissionRecord>> {
        let target = format!("file {}", file_id);
        fetch_all(cancel, "list permissions", &target, |page_token| {
            let request = PermissionListRequest {
                page_token,
                fields: PERMISSION_FIELDS.to_string(),
                supports_all_drives: self.include_shared_drives,
            };
            let api = Arc::clone(&self.api);
            let file_id = file_id.to_string();
            async move {
                let page = api.list_permissions(&file_id, &request).await?;
                Ok::<_, anyhow::Error>(page.map(PermissionRecord::from))
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{file, permission, ScriptedDriveApi};
    use crate::Page;
    use driveaudit_core::PermissionType;

    #[tokio::test]
    async fn files_follow_continuation_tokens() {
        let api = Arc::new(ScriptedDriveApi::new());
        api.push_file_page(Page::new(
            vec![file("a", "one", "alice@example.com")],
            Some("t1".to_string()),
        ));
        api.push_file_page(Page::last(vec![file("b", "two", "bob@example.com")]));

        let client = DriveClient::new(api.clone(), 500, true);
        let files = client
            .list_all_files(&CancellationToken::new())
            .await
            .unwrap();

        let ids: Vec<_> = files.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let requests = api.file_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].corpora, "domain");
        assert_eq!(requests[0].page_size, 500);
        assert_eq!(requests[0].page_token, None);
        assert_eq!(requests[1].page_token.as_deref(), Some("t1"));
        assert!(requests[0].supports_all_drives);
        assert!(requests[0].include_items_from_all_drives);
    }

    #[tokio::test]
    async fn shared_drive_flags_follow_settings() {
        let api = Arc::new(ScriptedDriveApi::new());
        api.push_file_page(Page::last(vec![]));
        let client = DriveClient::new(api.clone(), 1000, false);
        client
            .list_all_files(&CancellationToken::new())
            .await
            .unwrap();

        let request = &api.file_requests()[0];
        assert!(!request.supports_all_drives);
        assert!(!request.include_items_from_all_drives);
    }

    #[tokio::test]
    async fn permissions_are_converted_to_records() {
        let api = Arc::new(ScriptedDriveApi::new());
        api.push_permission_page(
            "f1",
            Page::new(
                vec![permission("p1", "user", Some("x@other.com"), None)],
                Some("next".to_string()),
            ),
        );
        api.push_permission_page("f1", Page::last(vec![permission("p2", "anyone", None, None)]));

        let client = DriveClient::new(api.clone(), 1000, true);
        let perms = client
            .get_file_permissions(&CancellationToken::new(), "f1")
            .await
            .unwrap();

        assert_eq!(perms.len(), 2);
        assert_eq!(perms[0].permission_type, PermissionType::User);
        assert_eq!(perms[1].permission_type, PermissionType::Anyone);

        let requests = api.permission_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].0, "f1");
        assert_eq!(requests[1].1.page_token.as_deref(), Some("next"));
    }

    #[tokio::test]
    async fn permission_failure_names_the_file() {
        let api = Arc::new(ScriptedDriveApi::new());
        api.fail_permissions("f9", "permission denied");

        let client = DriveClient::new(api, 1000, true);
        let err = client
            .get_file_permissions(&CancellationToken::new(), "f9")
            .await
            .unwrap_err();

        match err {
            FetchError::Failed(inner) => {
                assert_eq!(inner.to_string(), "Failed to list permissions for file f9")
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
