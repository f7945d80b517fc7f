//! Local file store for uploaded document files.
//!
//! Files are content addressed: the stored name is the md5 of the bytes plus the
//! lowercased original extension, so uploading the same scan twice yields the same
//! location. Public files are reachable at `/files/public/{name}`; private files
//! are addressed by a `private://{name}` uri and served behind the API token.

use futures_util::future::BoxFuture;
use md5::Context;
use mime_guess::mime;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PUBLIC_PREFIX: &str = "/files/public/";
pub const PRIVATE_SCHEME: &str = "private://";

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("file type of {0:?} is not accepted")]
    UnsupportedType(String),
    #[error("{0:?} is empty")]
    Empty(String),
    #[error("could not write file: {0}")]
    Io(#[from] std::io::Error),
}

/// Where an uploaded file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Public url or private uri.
    pub location: String,
    /// Name as given by the uploader.
    pub file_name: String,
}

pub trait FileStore: Send + Sync {
    fn upload_file(&self, file_name: String, bytes: Vec<u8>) -> BoxFuture<'_, Result<StoredFile, FileStoreError>>;

    fn upload_private_file(
        &self,
        file_name: String,
        bytes: Vec<u8>,
    ) -> BoxFuture<'_, Result<StoredFile, FileStoreError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    fn dir_name(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalFileStore { root: root.into() }
    }

    /// Path of a stored file, or `None` when `name` is not a plain file name.
    pub fn resolve(&self, visibility: Visibility, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
            return None;
        }
        Some(self.root.join(visibility.dir_name()).join(name))
    }

    async fn store(
        &self,
        visibility: Visibility,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<StoredFile, FileStoreError> {
        if bytes.is_empty() {
            return Err(FileStoreError::Empty(file_name));
        }
        if !is_accepted_type(&file_name) {
            return Err(FileStoreError::UnsupportedType(file_name));
        }

        let stored_name = content_name(&file_name, &bytes);
        let dir = self.root.join(visibility.dir_name());
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&stored_name), &bytes).await?;

        let location = match visibility {
            Visibility::Public => format!("{}{}", PUBLIC_PREFIX, stored_name),
            Visibility::Private => format!("{}{}", PRIVATE_SCHEME, stored_name),
        };
        Ok(StoredFile {
            location,
            file_name,
        })
    }
}

impl FileStore for LocalFileStore {
    fn upload_file(&self, file_name: String, bytes: Vec<u8>) -> BoxFuture<'_, Result<StoredFile, FileStoreError>> {
        Box::pin(self.store(Visibility::Public, file_name, bytes))
    }

    fn upload_private_file(
        &self,
        file_name: String,
        bytes: Vec<u8>,
    ) -> BoxFuture<'_, Result<StoredFile, FileStoreError>> {
        Box::pin(self.store(Visibility::Private, file_name, bytes))
    }
}

/// Scans, PDFs, plain text and office documents.
fn is_accepted_type(file_name: &str) -> bool {
    let Some(guess) = mime_guess::from_path(file_name).first() else {
        return false;
    };
    let top = guess.type_();
    if top == mime::IMAGE || top == mime::TEXT {
        return true;
    }
    if top != mime::APPLICATION {
        return false;
    }
    let subtype = guess.subtype().as_str();
    subtype == "pdf"
        || subtype == "msword"
        || subtype.starts_with("vnd.openxmlformats-officedocument")
        || subtype.starts_with("vnd.ms-excel")
        || subtype.starts_with("vnd.oasis.opendocument")
}

fn content_name(file_name: &str, bytes: &[u8]) -> String {
    let mut hasher = Context::new();
    hasher.consume(bytes);
    let digest = format!("{:x}", hasher.finalize());
    match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{}.{}", digest, ext.to_ascii_lowercase()),
        _ => digest,
    }
}
