use super::config::AdoptionConfig;
use super::domain::{ImageRef, PetAttributes, PetSubmission};

/// Validation errors raised by the listing guard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("required field '{0}' is missing")]
    MissingField(&'static str),
    #[error("at least one image is required")]
    MissingImages,
    #[error("image '{name}' must be one of: {allowed}")]
    UnsupportedImage { name: String, allowed: String },
    #[error("image upload is empty")]
    EmptyUpload,
    #[error("image exceeds the {limit} byte limit ({found} bytes)")]
    ImageTooLarge { limit: usize, found: usize },
    #[error("upload exceeds the {limit} byte limit")]
    UploadTooLarge { limit: usize },
    #[error("request body is invalid: {0}")]
    MalformedBody(String),
}

/// Guard producing `PetAttributes` from raw submissions.
#[derive(Debug, Clone)]
pub struct ListingGuard {
    allowed_extensions: Vec<String>,
    max_image_bytes: usize,
}

impl Default for ListingGuard {
    fn default() -> Self {
        Self::from_config(&AdoptionConfig::default())
    }
}

impl ListingGuard {
    pub fn from_config(config: &AdoptionConfig) -> Self {
        Self {
            allowed_extensions: config
                .allowed_image_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
            max_image_bytes: config.max_image_bytes,
        }
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    /// Validate a submission used to list a new pet. Images are mandatory.
    pub fn listing(
        &self,
        submission: PetSubmission,
    ) -> Result<(PetAttributes, Vec<ImageRef>), ValidationError> {
        let PetSubmission {
            name,
            age,
            weight,
            color,
            images,
        } = submission;

        let attributes = Self::attributes(name, age, weight, color)?;
        if images.is_empty() {
            return Err(ValidationError::MissingImages);
        }
        self.check_images(&images)?;
        Ok((attributes, images))
    }

    /// Validate an edit. An empty image list means "keep the current images".
    pub fn edit(
        &self,
        submission: PetSubmission,
    ) -> Result<(PetAttributes, Option<Vec<ImageRef>>), ValidationError> {
        let PetSubmission {
            name,
            age,
            weight,
            color,
            images,
        } = submission;

        let attributes = Self::attributes(name, age, weight, color)?;
        if images.is_empty() {
            return Ok((attributes, None));
        }
        self.check_images(&images)?;
        Ok((attributes, Some(images)))
    }

    /// Check an upload before it reaches the image store.
    pub fn upload(&self, file_name: &str, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyUpload);
        }
        if size > self.max_image_bytes {
            return Err(ValidationError::ImageTooLarge {
                limit: self.max_image_bytes,
                found: size,
            });
        }
        self.check_image(&ImageRef(file_name.to_string()))
    }

    fn attributes(
        name: Option<String>,
        age: Option<String>,
        weight: Option<String>,
        color: Option<String>,
    ) -> Result<PetAttributes, ValidationError> {
        Ok(PetAttributes {
            name: required("name", name)?,
            age: required("age", age)?,
            weight: required("weight", weight)?,
            color: required("color", color)?,
        })
    }

    fn check_images(&self, images: &[ImageRef]) -> Result<(), ValidationError> {
        images.iter().try_for_each(|image| self.check_image(image))
    }

    fn check_image(&self, image: &ImageRef) -> Result<(), ValidationError> {
        let accepted = image
            .extension()
            .is_some_and(|ext| self.allowed_extensions.iter().any(|allowed| *allowed == ext));

        if accepted {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedImage {
                name: image.as_str().to_string(),
                allowed: self.allowed_extensions.join(", "),
            })
        }
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ValidationError::MissingField(field)),
    }
}
