//! Profile extension records and partial-update merging.
//!
//! A profile patch never erases a field it does not mention: each leaf is
//! resolved independently with [`Patch::apply_to`], so `Absent` keeps the
//! stored value, `Null` clears it and `Value` overrides it. The merged result
//! is always a full record, which is what gets persisted.
use crate::clock::age_on;
use crate::directory::Account;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use userbase_common::{
    Address, AddressPatch, Patch, ProfilePatch, ProfileView, Vehicle, VehiclePatch,
};

/// Optional per-account record, created lazily on the first profile update.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfileExtension {
    pub address: Address,
    pub vehicle: Vehicle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn merge_address(current: Address, patch: &AddressPatch) -> Address {
    Address {
        city: resolve(&patch.city, current.city),
        state: resolve(&patch.state, current.state),
        postal_code: resolve(&patch.postal_code, current.postal_code),
        country: resolve(&patch.country, current.country),
    }
}

pub fn merge_vehicle(current: Vehicle, patch: &VehiclePatch) -> Vehicle {
    Vehicle {
        car: resolve(&patch.car, current.car),
        bike: resolve(&patch.bike, current.bike),
    }
}

fn resolve<T: Clone>(patch: &Patch<T>, current: Option<T>) -> Option<T> {
    patch.clone().apply_to(current)
}

/// Apply `patch` on top of `existing` (or an empty record) and stamp `now` as
/// the update time. `created_at` is kept from the existing record.
pub fn merge(
    existing: Option<&ProfileExtension>,
    patch: &ProfilePatch,
    now: DateTime<Utc>,
) -> ProfileExtension {
    let (address, vehicle, created_at) = match existing {
        Some(ext) => (ext.address.clone(), ext.vehicle.clone(), ext.created_at),
        None => (Address::default(), Vehicle::default(), now),
    };

    ProfileExtension {
        address: merge_address(address, &patch.address),
        vehicle: merge_vehicle(vehicle, &patch.vehicle),
        created_at,
        updated_at: now,
    }
}

/// Outward view of an account. Age is derived from `dob` on `today`.
pub fn build_view(
    account: &Account,
    extension: Option<&ProfileExtension>,
    today: NaiveDate,
) -> ProfileView {
    let (address, vehicle) = extension
        .map(|ext| (ext.address.clone(), ext.vehicle.clone()))
        .unwrap_or_default();

    ProfileView {
        user_id: account.id,
        email: account.email.clone(),
        first_name: account.first_name.clone(),
        last_name: account.last_name.clone(),
        dob: account.dob,
        gender: account.gender,
        age: age_on(account.dob, today),
        address,
        vehicle,
    }
}
