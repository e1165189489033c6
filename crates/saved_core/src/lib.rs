pub mod client;
pub mod credentials;
pub mod csv_utils;
pub mod errors;
pub mod export;
pub mod models;

pub use client::{authenticate, ClientOptions, RedditClient, SavedItems, Session, User};
pub use credentials::{CredentialStore, Credentials, ProfileEntry, DEFAULT_PROFILE};
pub use csv_utils::{create_export_file, read_rows, CsvRow, SavedCsvWriter, FIELDNAMES};
pub use errors::{ExportError, SaverError};
pub use export::{export_saved, write_saved_items, ExportOptions, ExportResult};
pub use models::{
    resolve_permalink, CommentItem, ExportRow, ItemType, LinkItem, SavedItem, REDDIT_BASE_URL,
};
