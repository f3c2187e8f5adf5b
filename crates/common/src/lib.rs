// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between `userbase` clients and the backend.
//! This module defines the HTTP request/response bodies and the profile records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque account identifier, assigned once at registration.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for AccountId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Gender as recorded at registration. Exactly three values.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "M")]
    Male,
    #[serde(alias = "F")]
    Female,
    #[serde(alias = "O")]
    Other,
}

/// Body of `POST /register`
#[derive(Deserialize, Serialize, Clone)]
pub struct RegisterRequest {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    pub password: String,
    /// Date of birth, `YYYY-MM-DD`
    pub dob: NaiveDate,
    pub gender: Gender,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("dob", &self.dob)
            .field("gender", &self.gender)
            .finish()
    }
}

/// Response data of a successful registration
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterResponse {
    pub user_id: AccountId,
}

/// Body of `POST /login`
#[derive(Deserialize, Serialize, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response data of a successful login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    /// Compact signed session token
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Postal address attached to a profile. Every field is independently nullable.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Vehicle ownership flags attached to a profile.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Vehicle {
    pub car: Option<bool>,
    pub bike: Option<bool>,
}

/// A field in a partial update.
///
/// `Absent` means the request did not mention the field, `Null` means the
/// request explicitly cleared it, `Value` sets it. Fields using this type must
/// be annotated with `#[serde(default)]` so a missing key becomes `Absent`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// Resolve this patch against the currently stored value.
    pub fn apply_to(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Absent => current,
            Patch::Null => None,
            Patch::Value(v) => Some(v),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Value(v) => serializer.serialize_some(v),
            Patch::Absent | Patch::Null => serializer.serialize_none(),
        }
    }
}

/// Partial update of an [`Address`]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressPatch {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub city: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub state: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub postal_code: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub country: Patch<String>,
}

impl AddressPatch {
    pub fn is_empty(&self) -> bool {
        self.city.is_absent()
            && self.state.is_absent()
            && self.postal_code.is_absent()
            && self.country.is_absent()
    }
}

/// Partial update of a [`Vehicle`]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct VehiclePatch {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub car: Patch<bool>,
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub bike: Patch<bool>,
}

impl VehiclePatch {
    pub fn is_empty(&self) -> bool {
        self.car.is_absent() && self.bike.is_absent()
    }
}

/// Body of `PATCH /profile`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    #[serde(default)]
    pub address: AddressPatch,
    #[serde(default)]
    pub vehicle: VehiclePatch,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.address.is_empty() && self.vehicle.is_empty()
    }
}

/// Profile as returned by `GET /profile`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub user_id: AccountId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub dob: NaiveDate,
    pub gender: Gender,
    /// Whole years since `dob`, computed when the profile is read
    pub age: u32,
    pub address: Address,
    pub vehicle: Vehicle,
}

/// Merged profile details as returned by `PATCH /profile`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDetails {
    pub address: Address,
    pub vehicle: Vehicle,
}

/// Standard success envelope: `{"msg": ..., "data": ...}`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiResponse<T> {
    pub msg: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(msg: impl Into<String>, data: T) -> Self {
        Self {
            msg: msg.into(),
            data,
        }
    }
}
