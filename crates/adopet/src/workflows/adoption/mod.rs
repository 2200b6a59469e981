//! Pet listing and adoption workflow.
//!
//! A pet moves from `Listed` to `VisitScheduled` when a non-owner books a
//! visit, and to the terminal `Concluded` state when its owner closes the
//! adoption. Only the owner may edit, remove, or conclude a pet.

pub mod config;
pub mod domain;
pub mod identity;
pub mod images;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use config::AdoptionConfig;
pub use domain::{
    AdopterSnapshot, AdoptionStatus, Identity, ImageRef, OwnerSnapshot, Pet, PetAttributes, PetId,
    PetSubmission, UserId, VisitConfirmation,
};
pub use identity::{AuthError, Credential, IdentityProvider};
pub use images::{ImageStore, ImageStoreError, ImageUpload};
pub use repository::{newest_first, PetFilter, PetStore, StoreError};
pub use router::{adoption_router, authenticate, decode_body, status_for, AdoptionState};
pub use service::{AdoptionError, AdoptionService, Conflict, ErrorKind, Forbidden, OwnerAction};
pub use validation::{ListingGuard, ValidationError};
