//! In-memory file record store.

use dashmap::DashMap;

use modhub_core::error::AppError;
use modhub_core::types::{FileId, UserId};
use modhub_entity::file::{FileStatus, FileUpload};

/// All file records, keyed by ID.
///
/// [`FileStore::update`] holds the file's entry guard while the closure
/// runs, so two concurrent decisions on the same file are serialized and
/// the second one observes the first one's result.
#[derive(Debug, Default)]
pub struct FileStore {
    /// File ID → record.
    files: DashMap<FileId, FileUpload>,
}

impl FileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new record.
    pub fn insert(&self, file: FileUpload) {
        self.files.insert(file.id, file);
    }

    /// Gets a record by ID.
    pub fn get(&self, file_id: &FileId) -> Result<FileUpload, AppError> {
        self.files
            .get(file_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// Applies `f` under the file's entry guard; returns its result and
    /// the record afterwards.
    pub fn update<R>(
        &self,
        file_id: &FileId,
        f: impl FnOnce(&mut FileUpload) -> Result<R, AppError>,
    ) -> Result<(R, FileUpload), AppError> {
        let mut entry = self
            .files
            .get_mut(file_id)
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        let result = f(entry.value_mut())?;
        Ok((result, entry.value().clone()))
    }

    /// Records matching `predicate`, newest first.
    pub fn list_where(&self, predicate: impl Fn(&FileUpload) -> bool) -> Vec<FileUpload> {
        let mut list: Vec<FileUpload> = self
            .files
            .iter()
            .filter(|e| predicate(e.value()))
            .map(|e| e.value().clone())
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    /// Approved files, visible to everyone.
    pub fn approved(&self) -> Vec<FileUpload> {
        self.list_where(|f| f.status == FileStatus::Approved)
    }

    /// Files awaiting a decision.
    pub fn pending(&self) -> Vec<FileUpload> {
        self.list_where(|f| f.status == FileStatus::Pending)
    }

    /// Files owned by one user.
    pub fn owned_by(&self, user_id: &UserId) -> Vec<FileUpload> {
        self.list_where(|f| f.user_id == *user_id)
    }

    /// Every file.
    pub fn all(&self) -> Vec<FileUpload> {
        self.list_where(|_| true)
    }
}
