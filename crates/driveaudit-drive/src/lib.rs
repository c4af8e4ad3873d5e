//! Google Drive client for driveaudit.
//!
//! The remote API is reached through the [`DriveApi`] capability trait, with a
//! live HTTP implementation ([`GoogleDriveApi`]) and, behind the `testing`
//! feature, a scripted double. [`DriveClient`] layers pagination and record
//! conversion on top of whichever implementation it is given.

pub mod api;
pub mod auth;
pub mod client;
pub mod listing;
pub mod pagination;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use api::{
    DriveApi, FileListRequest, Page, PermissionListRequest, RemoteFile, RemoteOwner,
    RemotePermission,
};
pub use auth::{Authenticator, ServiceAccountKey, StaticToken, TokenSource, DRIVE_SCOPES};
pub use client::GoogleDriveApi;
pub use listing::DriveClient;
pub use pagination::{fetch_all, FetchError};
