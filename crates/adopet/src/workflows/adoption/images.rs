use super::domain::ImageRef;

/// Uploaded image content awaiting storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Storage for uploaded images. References returned by `store` are stable and
/// are what pets carry in their image list.
pub trait ImageStore: Send + Sync {
    fn store(&self, upload: ImageUpload) -> Result<ImageRef, ImageStoreError>;
    fn load(&self, reference: &ImageRef) -> Result<Option<Vec<u8>>, ImageStoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageStoreError {
    #[error("image store unavailable: {0}")]
    Unavailable(String),
    #[error("image '{0}' not found")]
    NotFound(String),
}
