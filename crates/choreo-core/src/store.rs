//! Per-user document persistence.
//!
//! Each user owns one document holding two fields, `chores` and `sections`.
//! Saving one field rewrites that field whole and leaves the other untouched.
//! There is no concurrency control: the last writer wins.

use async_trait::async_trait;
use log::info;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::CoreError;
use crate::models::{Task, UserDocument};

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns an empty list for a user with no document yet.
    async fn load_tasks(&self, user_id: &str) -> Result<Vec<Task>, CoreError>;
    async fn save_tasks(&self, user_id: &str, tasks: &[Task]) -> Result<(), CoreError>;
    async fn load_sections(&self, user_id: &str) -> Result<Vec<String>, CoreError>;
    async fn save_sections(&self, user_id: &str, sections: &[String]) -> Result<(), CoreError>;
}

/// User ids become file names, so they must not be able to escape the store root.
pub fn validate_user_id(user_id: &str) -> Result<(), CoreError> {
    let invalid = user_id.trim().is_empty()
        || user_id == "."
        || user_id == ".."
        || user_id.contains(['/', '\\', '\0']);
    if invalid {
        return Err(CoreError::InvalidUserId(user_id.to_string()));
    }
    Ok(())
}

/// Stores each user's document as `<root>/<user_id>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, user_id: &str) -> Result<PathBuf, CoreError> {
        validate_user_id(user_id)?;
        Ok(self.root.join(format!("{}.json", user_id)))
    }

    async fn read_document(&self, user_id: &str) -> Result<UserDocument, CoreError> {
        let path = self.document_path(user_id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(UserDocument::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes through a temp file and a rename so a crash never leaves half a document.
    async fn write_document(&self, user_id: &str, document: &UserDocument) -> Result<(), CoreError> {
        let path = self.document_path(user_id)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(document)?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        info!(
            "event=document_saved module=store user={} chores={} sections={}",
            user_id,
            document.chores.len(),
            document.sections.len()
        );
        Ok(())
    }
}

#[async_trait]
impl TaskStore for JsonFileStore {
    async fn load_tasks(&self, user_id: &str) -> Result<Vec<Task>, CoreError> {
        Ok(self.read_document(user_id).await?.chores)
    }

    async fn save_tasks(&self, user_id: &str, tasks: &[Task]) -> Result<(), CoreError> {
        let mut document = self.read_document(user_id).await?;
        document.chores = tasks.to_vec();
        self.write_document(user_id, &document).await
    }

    async fn load_sections(&self, user_id: &str) -> Result<Vec<String>, CoreError> {
        Ok(self.read_document(user_id).await?.sections)
    }

    async fn save_sections(&self, user_id: &str, sections: &[String]) -> Result<(), CoreError> {
        let mut document = self.read_document(user_id).await?;
        document.sections = sections.to_vec();
        self.write_document(user_id, &document).await
    }
}

/// Keeps documents in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, UserDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_document(&self, user_id: &str, document: UserDocument) -> Result<(), CoreError> {
        validate_user_id(user_id)?;
        self.documents.lock().await.insert(user_id.to_string(), document);
        Ok(())
    }

    pub async fn document(&self, user_id: &str) -> Option<UserDocument> {
        self.documents.lock().await.get(user_id).cloned()
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn load_tasks(&self, user_id: &str) -> Result<Vec<Task>, CoreError> {
        validate_user_id(user_id)?;
        let documents = self.documents.lock().await;
        Ok(documents.get(user_id).map(|d| d.chores.clone()).unwrap_or_default())
    }

    async fn save_tasks(&self, user_id: &str, tasks: &[Task]) -> Result<(), CoreError> {
        validate_user_id(user_id)?;
        let mut documents = self.documents.lock().await;
        documents.entry(user_id.to_string()).or_default().chores = tasks.to_vec();
        Ok(())
    }

    async fn load_sections(&self, user_id: &str) -> Result<Vec<String>, CoreError> {
        validate_user_id(user_id)?;
        let documents = self.documents.lock().await;
        Ok(documents.get(user_id).map(|d| d.sections.clone()).unwrap_or_default())
    }

    async fn save_sections(&self, user_id: &str, sections: &[String]) -> Result<(), CoreError> {
        validate_user_id(user_id)?;
        let mut documents = self.documents.lock().await;
        documents.entry(user_id.to_string()).or_default().sections = sections.to_vec();
        Ok(())
    }
}
