use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::adoption::config::AdoptionConfig;
use crate::workflows::adoption::domain::{Identity, ImageRef, Pet, PetId, PetSubmission, UserId};
use crate::workflows::adoption::identity::{AuthError, Credential, IdentityProvider};
use crate::workflows::adoption::repository::{newest_first, PetFilter, PetStore, StoreError};
use crate::workflows::adoption::router::{adoption_router, AdoptionState};
use crate::workflows::adoption::service::AdoptionService;

pub(super) fn owner() -> Identity {
    Identity {
        id: UserId("user-owner".to_string()),
        name: "Ana".to_string(),
        image: Some("ana.png".to_string()),
        phone: Some("+55 11 99999-0000".to_string()),
    }
}

pub(super) fn visitor() -> Identity {
    Identity {
        id: UserId("user-visitor".to_string()),
        name: "Bruno".to_string(),
        image: None,
        phone: Some("+55 21 98888-1111".to_string()),
    }
}

pub(super) fn second_visitor() -> Identity {
    Identity {
        id: UserId("user-second".to_string()),
        name: "Carla".to_string(),
        image: None,
        phone: None,
    }
}

pub(super) fn rex_submission() -> PetSubmission {
    PetSubmission {
        name: Some("Rex".to_string()),
        age: Some("2".to_string()),
        weight: Some("10".to_string()),
        color: Some("brown".to_string()),
        images: vec![ImageRef("a.jpg".to_string())],
    }
}

pub(super) fn build_service() -> (AdoptionService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = AdoptionService::new(store.clone(), AdoptionConfig::default());
    (service, store)
}

pub(super) fn listed_pet(service: &AdoptionService<MemoryStore>) -> Pet {
    service
        .create(&owner(), rex_submission())
        .expect("listing succeeds")
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) records: Arc<Mutex<Vec<Pet>>>,
}

impl MemoryStore {
    pub(super) fn snapshot(&self) -> Vec<Pet> {
        self.records.lock().expect("store mutex poisoned").clone()
    }
}

impl PetStore for MemoryStore {
    fn insert(&self, pet: Pet) -> Result<Pet, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard.iter().any(|existing| existing.id == pet.id) {
            return Err(StoreError::Conflict);
        }
        guard.push(pet.clone());
        Ok(pet)
    }

    fn fetch(&self, id: &PetId) -> Result<Option<Pet>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.iter().find(|pet| &pet.id == id).cloned())
    }

    fn find_many(&self, filter: &PetFilter) -> Result<Vec<Pet>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        let matching = guard
            .iter()
            .filter(|pet| filter.matches(pet))
            .cloned()
            .collect();
        Ok(newest_first(matching))
    }

    fn update(&self, pet: Pet) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == pet.id) {
            Some(slot) => {
                *slot = pet;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn delete(&self, id: &PetId) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let before = guard.len();
        guard.retain(|pet| &pet.id != id);
        if guard.len() == before {
            Err(StoreError::NotFound)
        } else {
            Ok(())
        }
    }
}

pub(super) struct UnavailableStore;

impl PetStore for UnavailableStore {
    fn insert(&self, _pet: Pet) -> Result<Pet, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &PetId) -> Result<Option<Pet>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn find_many(&self, _filter: &PetFilter) -> Result<Vec<Pet>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _pet: Pet) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &PetId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

/// Token table standing in for the identity provider.
#[derive(Default, Clone)]
pub(super) struct MemoryIdentities {
    tokens: Arc<Mutex<HashMap<String, Identity>>>,
}

impl MemoryIdentities {
    pub(super) fn with_users() -> Self {
        let identities = Self::default();
        identities.issue("owner-token", owner());
        identities.issue("visitor-token", visitor());
        identities.issue("second-token", second_visitor());
        identities
    }

    pub(super) fn issue(&self, token: &str, identity: Identity) {
        self.tokens
            .lock()
            .expect("identity mutex poisoned")
            .insert(token.to_string(), identity);
    }
}

impl IdentityProvider for MemoryIdentities {
    fn resolve(&self, credential: &Credential) -> Result<Identity, AuthError> {
        self.tokens
            .lock()
            .expect("identity mutex poisoned")
            .get(&credential.0)
            .cloned()
            .ok_or(AuthError::InvalidCredential)
    }
}

pub(super) fn build_router() -> (axum::Router, Arc<MemoryStore>) {
    let (service, store) = build_service();
    let state = AdoptionState::new(Arc::new(service), Arc::new(MemoryIdentities::with_users()));
    (adoption_router(state), store)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
