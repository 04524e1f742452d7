//! Flat-file JSON store.
//!
//! The persisted layout is a single human-readable JSON document mapping
//! string-typed sequential ids to business records, rewritten in full on
//! every mutation. Every operation re-reads the whole document, mutates it in
//! memory, and rewrites it; one async mutex serializes reads and
//! read-modify-write cycles so concurrent requests cannot lose updates, both
//! claim the same id, or read a half-written file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::models::business::{BusinessRecord, ProfileField};
use crate::models::post::{AiResponse, PostRequest, PostStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("business {0} not found")]
    NotFound(u64),

    #[error("business '{0}' not found")]
    NameNotFound(String),

    #[error("business {0} has no post request")]
    NoPostRequest(u64),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A backing file that exists but cannot be parsed is distinct from an
    /// empty store. Callers must be able to tell the two apart.
    #[error("store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Input for business creation. No Debug derive: the password must not end
/// up in log output by accident.
#[derive(Clone)]
pub struct NewBusiness {
    pub name: String,
    pub description: String,
    pub specifics: String,
    pub email: String,
    pub password: String,
}

/// Injected storage interface. Handlers and the workflow depend on this
/// trait, not on the file-backed implementation.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create(&self, input: NewBusiness) -> Result<BusinessRecord, StoreError>;
    async fn get(&self, id: u64) -> Result<BusinessRecord, StoreError>;
    async fn get_by_name(&self, name: &str) -> Result<BusinessRecord, StoreError>;
    async fn list_all(&self) -> Result<BTreeMap<u64, BusinessRecord>, StoreError>;
    async fn list_ids(&self) -> Result<Vec<u64>, StoreError>;
    async fn set_field(
        &self,
        id: u64,
        field: ProfileField,
        value: String,
    ) -> Result<BusinessRecord, StoreError>;
    /// Writes the post-request shell. This is what marks the request as
    /// `Running` before any external call is made.
    async fn set_post_request(
        &self,
        id: u64,
        request: PostRequest,
    ) -> Result<BusinessRecord, StoreError>;
    /// Read-modify-write of the embedded post request (checkpoint and status
    /// updates).
    async fn update_post_request(
        &self,
        id: u64,
        mutate: Box<dyn for<'a> FnOnce(&'a mut PostRequest) + Send>,
    ) -> Result<BusinessRecord, StoreError>;
    /// Writes the final response and flips the status to `Completed` in the
    /// same store call.
    async fn set_ai_response(
        &self,
        id: u64,
        response: AiResponse,
    ) -> Result<BusinessRecord, StoreError>;
    async fn clear_all(&self) -> Result<(), StoreError>;
}

type Document = BTreeMap<u64, BusinessRecord>;

/// File-backed store. The lock covers the whole read-mutate-rewrite cycle.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Opens the store, creating an empty document if the file is missing.
    /// An existing but unparseable file is an error, never an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if !tokio::fs::try_exists(&path).await? {
            warn!("Store file does not exist, creating: {}", path.display());
            tokio::fs::write(&path, "{}").await?;
        }
        let store = FileStore {
            path,
            lock: Mutex::new(()),
        };
        // Validate the existing document up front.
        store.read_document().await?;
        Ok(store)
    }

    async fn read_document(&self) -> Result<Document, StoreError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let document = serde_json::from_str(&raw)?;
        Ok(document)
    }

    /// Reads the document under the store lock. Writes truncate and rewrite
    /// the file, so an unlocked read racing a write could see a partial
    /// document and misreport it as corrupt.
    async fn read_snapshot(&self) -> Result<Document, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_document().await
    }

    async fn write_document(&self, document: &Document) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(document)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }

    /// Runs a whole read-modify-write cycle under the store lock.
    async fn mutate<T, F>(&self, apply: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Document) -> Result<T, StoreError>,
    {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        let result = apply(&mut document)?;
        self.write_document(&document).await?;
        Ok(result)
    }

    fn record_mut(document: &mut Document, id: u64) -> Result<&mut BusinessRecord, StoreError> {
        document.get_mut(&id).ok_or(StoreError::NotFound(id))
    }
}

#[async_trait]
impl Store for FileStore {
    async fn create(&self, input: NewBusiness) -> Result<BusinessRecord, StoreError> {
        info!("Creating business: {}", input.name);
        self.mutate(|document| {
            // Sequential id assignment; safe under the store lock.
            let id = document.len() as u64 + 1;
            let record = BusinessRecord {
                id,
                name: input.name,
                description: input.description,
                specifics: input.specifics,
                email: input.email,
                password: input.password,
                post_request: None,
            };
            document.insert(id, record.clone());
            Ok(record)
        })
        .await
    }

    async fn get(&self, id: u64) -> Result<BusinessRecord, StoreError> {
        let document = self.read_snapshot().await?;
        document.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn get_by_name(&self, name: &str) -> Result<BusinessRecord, StoreError> {
        let document = self.read_snapshot().await?;
        document
            .values()
            .find(|record| record.name == name)
            .cloned()
            .ok_or_else(|| StoreError::NameNotFound(name.to_string()))
    }

    async fn list_all(&self) -> Result<BTreeMap<u64, BusinessRecord>, StoreError> {
        self.read_snapshot().await
    }

    async fn list_ids(&self) -> Result<Vec<u64>, StoreError> {
        let document = self.read_snapshot().await?;
        Ok(document.keys().copied().collect())
    }

    async fn set_field(
        &self,
        id: u64,
        field: ProfileField,
        value: String,
    ) -> Result<BusinessRecord, StoreError> {
        info!("Setting field {field:?} on business {id}");
        self.mutate(|document| {
            let record = Self::record_mut(document, id)?;
            field.apply(record, value);
            Ok(record.clone())
        })
        .await
    }

    async fn set_post_request(
        &self,
        id: u64,
        request: PostRequest,
    ) -> Result<BusinessRecord, StoreError> {
        info!("Setting post request on business {id}");
        self.mutate(|document| {
            let record = Self::record_mut(document, id)?;
            record.post_request = Some(request);
            Ok(record.clone())
        })
        .await
    }

    async fn update_post_request(
        &self,
        id: u64,
        mutate: Box<dyn for<'a> FnOnce(&'a mut PostRequest) + Send>,
    ) -> Result<BusinessRecord, StoreError> {
        self.mutate(|document| {
            let record = Self::record_mut(document, id)?;
            let request = record
                .post_request
                .as_mut()
                .ok_or(StoreError::NoPostRequest(id))?;
            mutate(request);
            Ok(record.clone())
        })
        .await
    }

    async fn set_ai_response(
        &self,
        id: u64,
        response: AiResponse,
    ) -> Result<BusinessRecord, StoreError> {
        info!("Setting AI response on business {id}");
        self.mutate(|document| {
            let record = Self::record_mut(document, id)?;
            let request = record
                .post_request
                .as_mut()
                .ok_or(StoreError::NoPostRequest(id))?;
            request.ai_response = Some(response);
            request.status = PostStatus::Completed;
            Ok(record.clone())
        })
        .await
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        info!("Removing all businesses");
        let _guard = self.lock.lock().await;
        tokio::fs::write(&self.path, "{}").await?;
        Ok(())
    }
}
