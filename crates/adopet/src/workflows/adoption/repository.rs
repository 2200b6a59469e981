use super::domain::{Pet, PetId, UserId};

/// Selection applied by `PetStore::find_many`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetFilter {
    All,
    Owner(UserId),
    Adopter(UserId),
}

impl PetFilter {
    pub fn matches(&self, pet: &Pet) -> bool {
        match self {
            PetFilter::All => true,
            PetFilter::Owner(user) => pet.is_owned_by(user),
            PetFilter::Adopter(user) => pet.is_adopted_by(user),
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Each call is expected to be atomic on its own. Nothing here offers a
/// transactional read-modify-write: `update` replaces the whole record.
pub trait PetStore: Send + Sync {
    fn insert(&self, pet: Pet) -> Result<Pet, StoreError>;
    fn fetch(&self, id: &PetId) -> Result<Option<Pet>, StoreError>;
    /// Matching pets, most recently created first.
    fn find_many(&self, filter: &PetFilter) -> Result<Vec<Pet>, StoreError>;
    fn update(&self, pet: Pet) -> Result<(), StoreError>;
    fn delete(&self, id: &PetId) -> Result<(), StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Sort newest first. Input is expected in insertion order so that records
/// sharing a timestamp come out latest-inserted first.
pub fn newest_first(mut pets: Vec<Pet>) -> Vec<Pet> {
    pets.reverse();
    pets.sort_by(|left, right| right.created_at.cmp(&left.created_at));
    pets
}
