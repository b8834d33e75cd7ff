//! Artifact store port: named blob persistence for trained artifacts.
//!
//! This trait abstracts the storage backend (SQLite) from the application logic.

/// Metadata about one stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub name: String,
    pub size_bytes: usize,
    /// Hex SHA-256 of the payload
    pub sha256: String,
    pub created_at: String,
}

/// Key-value blob store for models, encoders and column lists.
pub trait ArtifactStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a group of named blobs as one unit.
    ///
    /// Either every blob is written or none is.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn save_artifacts(&self, blobs: &[(&str, &[u8])]) -> Result<(), Self::Error>;

    /// Load a blob by name.
    ///
    /// # Returns
    /// `None` if no blob is stored under `name`.
    ///
    /// # Errors
    /// Returns error if storage operation fails or the payload is corrupted.
    fn load_artifact(&self, name: &str) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Load several blobs from one consistent snapshot.
    ///
    /// The result has one entry per requested name, in request order. A save
    /// committed concurrently is either fully visible or not at all.
    ///
    /// # Errors
    /// Returns error if storage operation fails or any payload is corrupted.
    fn load_artifacts(&self, names: &[&str]) -> Result<Vec<Option<Vec<u8>>>, Self::Error>;

    /// List stored blobs.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn list_artifacts(&self) -> Result<Vec<ArtifactInfo>, Self::Error>;

    /// Delete a blob by name.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn delete_artifact(&self, name: &str) -> Result<(), Self::Error>;
}
