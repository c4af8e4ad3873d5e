#![allow(dead_code)]

use driveaudit_drive::testing::{file, permission, ScriptedDriveApi};
use driveaudit_drive::{Page, RemoteFile};

/// Files for a small organization, deliberately out of report order
pub fn org_files() -> Vec<RemoteFile> {
    vec![
        file("f-roadmap", "Roadmap", "zoe@example.com"),
        file("f-budget", "Budget 2024", "amy@example.com"),
        file("f-notes", "notes, draft", "amy@example.com"),
        file("f-deck", "Board deck", "Carl@example.com"),
        file("f-handbook", "Handbook", "zoe@example.com"),
    ]
}

/// Serve `files` two per page, the way a paginated listing arrives.
pub fn paged_drive(files: Vec<RemoteFile>) -> ScriptedDriveApi {
    let api = ScriptedDriveApi::new();
    let chunks: Vec<Vec<RemoteFile>> = files.chunks(2).map(|c| c.to_vec()).collect();
    let last = chunks.len().saturating_sub(1);
    for (index, chunk) in chunks.into_iter().enumerate() {
        let token = (index < last).then(|| format!("page-{}", index + 1));
        api.push_file_page(Page::new(chunk, token));
    }
    api
}

/// Permissions across the org files: a mix of internal and external grants
pub fn script_org_permissions(api: &ScriptedDriveApi) {
    api.set_permissions(
        "f-roadmap",
        vec![
            permission("owner", "user", Some("zoe@example.com"), None),
            permission("anyone", "anyone", None, None),
        ],
    );
    api.push_permission_page(
        "f-budget",
        Page::new(
            vec![permission("p1", "user", Some("cfo@example.com"), None)],
            Some("perm-2".to_string()),
        ),
    );
    api.push_permission_page(
        "f-budget",
        Page::last(vec![permission(
            "p2",
            "user",
            Some("auditor@accounting-firm.com"),
            None,
        )]),
    );
    api.set_permissions(
        "f-notes",
        vec![
            permission("d1", "domain", None, Some("example.com")),
            permission("d2", "domain", None, Some("partner.org")),
        ],
    );
    api.set_permissions(
        "f-deck",
        vec![permission("g1", "group", Some("board@example.com"), None)],
    );
    api.set_permissions(
        "f-handbook",
        vec![permission("u1", "user", None, None)],
    );
}
