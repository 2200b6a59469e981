use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned to a pet when it is listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PetId(pub Uuid);

impl PetId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns `None` when `raw` is not a well-formed identifier.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl fmt::Display for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a marketplace user as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller resolved from a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Point-in-time copy of the owner taken when the pet is listed. Later
/// profile edits do not flow back into existing pets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSnapshot {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<&Identity> for OwnerSnapshot {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            name: identity.name.clone(),
            image: identity.image.clone(),
            phone: identity.phone.clone(),
        }
    }
}

/// Copy of the identity holding the adopter slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdopterSnapshot {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<&Identity> for AdopterSnapshot {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            name: identity.name.clone(),
            image: identity.image.clone(),
        }
    }
}

/// Reference to an uploaded image, as returned by the image store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.0.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Raw listing payload as received from a client. Every field is optional so
/// that missing values surface as validation errors rather than decode errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetSubmission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

/// Descriptive attributes after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetAttributes {
    pub name: String,
    pub age: String,
    pub weight: String,
    pub color: String,
}

/// A listed animal together with its adoption state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    #[serde(flatten)]
    pub attributes: PetAttributes,
    pub images: Vec<ImageRef>,
    pub available: bool,
    pub owner: OwnerSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adopter: Option<AdopterSnapshot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pet {
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner.id == user
    }

    pub fn is_adopted_by(&self, user: &UserId) -> bool {
        self.adopter
            .as_ref()
            .is_some_and(|adopter| &adopter.id == user)
    }

    pub fn status(&self) -> AdoptionStatus {
        match (self.available, &self.adopter) {
            (false, _) => AdoptionStatus::Concluded,
            (true, Some(_)) => AdoptionStatus::VisitScheduled,
            (true, None) => AdoptionStatus::Listed,
        }
    }
}

/// Adoption progress derived from availability and the adopter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdoptionStatus {
    Listed,
    VisitScheduled,
    Concluded,
}

impl AdoptionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AdoptionStatus::Listed => "listed",
            AdoptionStatus::VisitScheduled => "visit_scheduled",
            AdoptionStatus::Concluded => "concluded",
        }
    }
}

/// Returned to the adopter after a visit is booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitConfirmation {
    pub pet_id: PetId,
    pub message: String,
    pub owner_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_phone: Option<String>,
}

impl VisitConfirmation {
    pub(crate) fn for_pet(pet: &Pet) -> Self {
        let message = match &pet.owner.phone {
            Some(phone) => format!(
                "Visit scheduled. Contact {} by phone at {}",
                pet.owner.name, phone
            ),
            None => format!("Visit scheduled. Contact {} to arrange it", pet.owner.name),
        };

        Self {
            pet_id: pet.id,
            message,
            owner_name: pet.owner.name.clone(),
            owner_phone: pet.owner.phone.clone(),
        }
    }
}
