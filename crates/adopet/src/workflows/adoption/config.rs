/// Default upload ceiling (5 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Settings handed to the adoption service at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdoptionConfig {
    /// Lower-case extensions accepted for pet images, without the dot.
    pub allowed_image_extensions: Vec<String>,
    pub max_image_bytes: usize,
}

impl Default for AdoptionConfig {
    fn default() -> Self {
        Self {
            allowed_image_extensions: vec!["png".to_string(), "jpg".to_string()],
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}
