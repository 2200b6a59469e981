use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::config::AdoptionConfig;
use super::domain::{
    AdopterSnapshot, AdoptionStatus, Identity, OwnerSnapshot, Pet, PetId, PetSubmission,
    VisitConfirmation,
};
use super::identity::AuthError;
use super::images::ImageStoreError;
use super::repository::{PetFilter, PetStore, StoreError};
use super::validation::{ListingGuard, ValidationError};

/// Workflow engine owning the availability and adopter state of pets.
///
/// Every operation reads a snapshot from the store and writes the whole
/// record back. Two callers racing on the same pet resolve as last write
/// wins.
pub struct AdoptionService<S> {
    store: Arc<S>,
    guard: Arc<ListingGuard>,
}

impl<S> AdoptionService<S>
where
    S: PetStore + 'static,
{
    pub fn new(store: Arc<S>, config: AdoptionConfig) -> Self {
        let guard = Arc::new(ListingGuard::from_config(&config));
        Self { store, guard }
    }

    /// List a new pet owned by `owner`. The pet starts available with no adopter.
    pub fn create(
        &self,
        owner: &Identity,
        submission: PetSubmission,
    ) -> Result<Pet, AdoptionError> {
        let (attributes, images) = self.guard.listing(submission)?;
        let now = Utc::now();

        let pet = Pet {
            id: PetId::generate(),
            attributes,
            images,
            available: true,
            owner: OwnerSnapshot::from(owner),
            adopter: None,
            created_at: now,
            updated_at: now,
        };

        let stored = self.store.insert(pet)?;
        info!(pet_id = %stored.id, owner = %owner.id, "pet listed for adoption");
        Ok(stored)
    }

    pub fn list_all(&self) -> Result<Vec<Pet>, AdoptionError> {
        Ok(self.store.find_many(&PetFilter::All)?)
    }

    pub fn list_by_owner(&self, owner: &Identity) -> Result<Vec<Pet>, AdoptionError> {
        Ok(self.store.find_many(&PetFilter::Owner(owner.id.clone()))?)
    }

    pub fn list_by_adopter(&self, adopter: &Identity) -> Result<Vec<Pet>, AdoptionError> {
        Ok(self.store.find_many(&PetFilter::Adopter(adopter.id.clone()))?)
    }

    pub fn get(&self, raw_id: &str) -> Result<Pet, AdoptionError> {
        self.load(raw_id)
    }

    /// Remove a pet permanently, returning the removed record.
    pub fn delete(&self, caller: &Identity, raw_id: &str) -> Result<Pet, AdoptionError> {
        let pet = self.load(raw_id)?;
        self.require_owner(&pet, caller, OwnerAction::Delete)?;

        self.store.delete(&pet.id)?;
        info!(pet_id = %pet.id, owner = %caller.id, "pet removed");
        Ok(pet)
    }

    /// Replace descriptive attributes. Images are replaced only when the
    /// submission carries a non-empty set; adoption state is never touched.
    pub fn update(
        &self,
        caller: &Identity,
        raw_id: &str,
        submission: PetSubmission,
    ) -> Result<Pet, AdoptionError> {
        let mut pet = self.load(raw_id)?;
        self.require_owner(&pet, caller, OwnerAction::Update)?;

        let (attributes, images) = self.guard.edit(submission)?;
        pet.attributes = attributes;
        if let Some(images) = images {
            pet.images = images;
        }
        pet.updated_at = Utc::now();

        self.store.update(pet.clone())?;
        info!(pet_id = %pet.id, owner = %caller.id, "pet details updated");
        Ok(pet)
    }

    /// Book a visit, placing `caller` in the adopter slot.
    pub fn schedule_visit(
        &self,
        caller: &Identity,
        raw_id: &str,
    ) -> Result<VisitConfirmation, AdoptionError> {
        let mut pet = self.load(raw_id)?;

        if pet.is_owned_by(&caller.id) {
            warn!(pet_id = %pet.id, caller = %caller.id, "owner attempted to schedule a visit");
            return Err(AdoptionError::Forbidden(Forbidden::OwnPet));
        }
        if pet.is_adopted_by(&caller.id) {
            return Err(AdoptionError::Conflict(Conflict::VisitAlreadyScheduled));
        }
        if pet.status() == AdoptionStatus::Concluded {
            return Err(AdoptionError::Conflict(Conflict::AdoptionConcluded));
        }

        if let Some(previous) = &pet.adopter {
            info!(pet_id = %pet.id, previous = %previous.id, "adopter slot reassigned");
        }
        pet.adopter = Some(AdopterSnapshot::from(caller));
        pet.updated_at = Utc::now();

        self.store.update(pet.clone())?;
        info!(pet_id = %pet.id, adopter = %caller.id, "visit scheduled");
        Ok(VisitConfirmation::for_pet(&pet))
    }

    /// Mark the adoption as finished. Repeating the call is harmless.
    pub fn conclude_adoption(
        &self,
        caller: &Identity,
        raw_id: &str,
    ) -> Result<Pet, AdoptionError> {
        let mut pet = self.load(raw_id)?;
        self.require_owner(&pet, caller, OwnerAction::Conclude)?;

        if pet.available {
            pet.available = false;
            pet.updated_at = Utc::now();
            self.store.update(pet.clone())?;
            info!(pet_id = %pet.id, owner = %caller.id, "adoption concluded");
        }
        Ok(pet)
    }

    fn load(&self, raw_id: &str) -> Result<Pet, AdoptionError> {
        let id =
            PetId::parse(raw_id).ok_or_else(|| AdoptionError::InvalidId(raw_id.to_string()))?;
        self.store.fetch(&id)?.ok_or(AdoptionError::NotFound(id))
    }

    fn require_owner(
        &self,
        pet: &Pet,
        caller: &Identity,
        action: OwnerAction,
    ) -> Result<(), AdoptionError> {
        if pet.is_owned_by(&caller.id) {
            return Ok(());
        }
        warn!(pet_id = %pet.id, caller = %caller.id, action = %action, "non-owner rejected");
        Err(AdoptionError::Forbidden(Forbidden::NotOwner(action)))
    }
}

/// Mutations reserved for the owner of a pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerAction {
    Update,
    Delete,
    Conclude,
}

impl fmt::Display for OwnerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OwnerAction::Update => "update this pet",
            OwnerAction::Delete => "remove this pet",
            OwnerAction::Conclude => "conclude this adoption",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Forbidden {
    #[error("only the owner can {0}")]
    NotOwner(OwnerAction),
    #[error("cannot schedule a visit to your own pet")]
    OwnPet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Conflict {
    #[error("visit already scheduled by this identity")]
    VisitAlreadyScheduled,
    #[error("adoption already concluded")]
    AdoptionConcluded,
}

/// Error taxonomy used to pick a transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    InvalidId,
    NotFound,
    Forbidden,
    Conflict,
    Auth,
    Internal,
}

/// Error raised by the adoption service.
#[derive(Debug, thiserror::Error)]
pub enum AdoptionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid pet id '{0}'")]
    InvalidId(String),
    #[error("pet {0} not found")]
    NotFound(PetId),
    #[error(transparent)]
    Forbidden(Forbidden),
    #[error(transparent)]
    Conflict(Conflict),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Images(#[from] ImageStoreError),
}

impl AdoptionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdoptionError::Validation(_) => ErrorKind::Validation,
            AdoptionError::InvalidId(_) => ErrorKind::InvalidId,
            AdoptionError::NotFound(_)
            | AdoptionError::Store(StoreError::NotFound)
            | AdoptionError::Images(ImageStoreError::NotFound(_)) => ErrorKind::NotFound,
            AdoptionError::Forbidden(_) => ErrorKind::Forbidden,
            AdoptionError::Conflict(_) | AdoptionError::Store(StoreError::Conflict) => {
                ErrorKind::Conflict
            }
            AdoptionError::Auth(AuthError::Unavailable(_)) => ErrorKind::Internal,
            AdoptionError::Auth(_) => ErrorKind::Auth,
            AdoptionError::Store(StoreError::Unavailable(_)) | AdoptionError::Images(_) => {
                ErrorKind::Internal
            }
        }
    }
}
