use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use adopet::workflows::adoption::{
    newest_first, AuthError, Credential, Identity, IdentityProvider, ImageRef, ImageStore,
    ImageStoreError, ImageUpload, Pet, PetFilter, PetId, PetStore, StoreError, UserId,
};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Pets kept in insertion order; listings are re-sorted newest first.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPetStore {
    records: Arc<Mutex<Vec<Pet>>>,
}

impl InMemoryPetStore {
    fn records(&self) -> Result<MutexGuard<'_, Vec<Pet>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("pet store lock poisoned".to_string()))
    }
}

impl PetStore for InMemoryPetStore {
    fn insert(&self, pet: Pet) -> Result<Pet, StoreError> {
        let mut guard = self.records()?;
        if guard.iter().any(|existing| existing.id == pet.id) {
            return Err(StoreError::Conflict);
        }
        guard.push(pet.clone());
        Ok(pet)
    }

    fn fetch(&self, id: &PetId) -> Result<Option<Pet>, StoreError> {
        let guard = self.records()?;
        Ok(guard.iter().find(|pet| &pet.id == id).cloned())
    }

    fn find_many(&self, filter: &PetFilter) -> Result<Vec<Pet>, StoreError> {
        let guard = self.records()?;
        let matching = guard
            .iter()
            .filter(|pet| filter.matches(pet))
            .cloned()
            .collect();
        Ok(newest_first(matching))
    }

    fn update(&self, pet: Pet) -> Result<(), StoreError> {
        let mut guard = self.records()?;
        let slot = guard
            .iter_mut()
            .find(|existing| existing.id == pet.id)
            .ok_or(StoreError::NotFound)?;
        *slot = pet;
        Ok(())
    }

    fn delete(&self, id: &PetId) -> Result<(), StoreError> {
        let mut guard = self.records()?;
        let position = guard
            .iter()
            .position(|pet| &pet.id == id)
            .ok_or(StoreError::NotFound)?;
        guard.remove(position);
        Ok(())
    }
}

/// Sign-up payload. Fields are optional so gaps surface as validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Registration {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) phone: Option<String>,
    #[serde(default)]
    pub(crate) image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum DirectoryError {
    #[error("required field '{0}' is missing")]
    MissingField(&'static str),
    #[error("request body is invalid: {0}")]
    MalformedBody(String),
    #[error("e-mail already registered")]
    EmailTaken,
    #[error("user {0} not found")]
    NotFound(UserId),
    #[error("only the account holder can edit this profile")]
    NotAccountHolder,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("user directory unavailable")]
    Unavailable,
}

#[derive(Default)]
struct Directory {
    users: HashMap<UserId, (Identity, String)>,
    tokens: HashMap<String, UserId>,
}

/// Registered users and the opaque tokens issued to them.
#[derive(Default, Clone)]
pub(crate) struct InMemoryUserDirectory {
    inner: Arc<Mutex<Directory>>,
}

impl InMemoryUserDirectory {
    /// Register a user and issue a bearer token for them.
    pub(crate) fn register(
        &self,
        registration: Registration,
    ) -> Result<(String, Identity), DirectoryError> {
        let name = required("name", registration.name)?;
        let email = required("email", registration.email)?.to_ascii_lowercase();
        let phone = required("phone", registration.phone)?;

        let mut directory = self.lock()?;
        if directory.email_owner(&email).is_some() {
            return Err(DirectoryError::EmailTaken);
        }

        let identity = Identity {
            id: UserId(Uuid::new_v4().to_string()),
            name,
            image: registration.image.filter(|image| !image.trim().is_empty()),
            phone: Some(phone),
        };
        let token = Uuid::new_v4().simple().to_string();

        directory
            .tokens
            .insert(token.clone(), identity.id.clone());
        directory
            .users
            .insert(identity.id.clone(), (identity.clone(), email));
        Ok((token, identity))
    }

    pub(crate) fn profile(&self, id: &UserId) -> Result<Identity, DirectoryError> {
        let directory = self.lock()?;
        directory
            .users
            .get(id)
            .map(|(identity, _)| identity.clone())
            .ok_or_else(|| DirectoryError::NotFound(id.clone()))
    }

    /// Replace a user's contact details. Pets already listed keep the owner
    /// snapshot taken when they were created.
    pub(crate) fn update(
        &self,
        id: &UserId,
        edit: Registration,
    ) -> Result<Identity, DirectoryError> {
        let name = required("name", edit.name)?;
        let email = required("email", edit.email)?.to_ascii_lowercase();
        let phone = required("phone", edit.phone)?;

        let mut directory = self.lock()?;
        if directory
            .email_owner(&email)
            .is_some_and(|holder| holder != id)
        {
            return Err(DirectoryError::EmailTaken);
        }

        let (identity, registered) = directory
            .users
            .get_mut(id)
            .ok_or_else(|| DirectoryError::NotFound(id.clone()))?;
        identity.name = name;
        identity.phone = Some(phone);
        if let Some(image) = edit.image.filter(|image| !image.trim().is_empty()) {
            identity.image = Some(image);
        }
        *registered = email;
        Ok(identity.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Directory>, DirectoryError> {
        self.inner.lock().map_err(|_| DirectoryError::Unavailable)
    }
}

impl Directory {
    fn email_owner(&self, email: &str) -> Option<&UserId> {
        self.users
            .iter()
            .find(|(_, (_, registered))| registered == email)
            .map(|(id, _)| id)
    }
}

impl IdentityProvider for InMemoryUserDirectory {
    fn resolve(&self, credential: &Credential) -> Result<Identity, AuthError> {
        let directory = self
            .inner
            .lock()
            .map_err(|_| AuthError::Unavailable("user directory lock poisoned".to_string()))?;
        directory
            .tokens
            .get(&credential.0)
            .and_then(|id| directory.users.get(id))
            .map(|(identity, _)| identity.clone())
            .ok_or(AuthError::InvalidCredential)
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, DirectoryError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(DirectoryError::MissingField(field)),
    }
}

/// Uploaded images held in memory, named `<unix-millis><nnn>.<ext>`.
#[derive(Default, Clone)]
pub(crate) struct InMemoryImageStore {
    images: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryImageStore {
    fn next_reference(&self, file_name: &str) -> ImageRef {
        let extension = ImageRef(file_name.to_string())
            .extension()
            .unwrap_or_else(|| "bin".to_string());
        let suffix = self.sequence.fetch_add(1, Ordering::Relaxed) % 1000;
        ImageRef(format!(
            "{}{suffix:03}.{extension}",
            Utc::now().timestamp_millis()
        ))
    }
}

impl ImageStore for InMemoryImageStore {
    fn store(&self, upload: ImageUpload) -> Result<ImageRef, ImageStoreError> {
        let reference = self.next_reference(&upload.file_name);
        let mut images = self
            .images
            .lock()
            .map_err(|_| ImageStoreError::Unavailable("image store lock poisoned".to_string()))?;
        images.insert(reference.as_str().to_string(), upload.bytes);
        Ok(reference)
    }

    fn load(&self, reference: &ImageRef) -> Result<Option<Vec<u8>>, ImageStoreError> {
        let images = self
            .images
            .lock()
            .map_err(|_| ImageStoreError::Unavailable("image store lock poisoned".to_string()))?;
        Ok(images.get(reference.as_str()).cloned())
    }
}
