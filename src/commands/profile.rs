use crate::constants::PROFILE_STORAGE_KEY;
use crate::models::UserProfile;
use crate::store::{read_json, write_json, LocalStore, StoreResult};

pub fn load_profile<S: LocalStore + ?Sized>(store: &S) -> StoreResult<Option<UserProfile>> {
    read_json(store, PROFILE_STORAGE_KEY)
}

/// Replaces the stored profile wholesale.
pub fn save_profile<S: LocalStore + ?Sized>(store: &mut S, profile: &UserProfile) -> StoreResult<()> {
    write_json(store, PROFILE_STORAGE_KEY, profile)
}

pub fn clear_profile<S: LocalStore + ?Sized>(store: &mut S) -> StoreResult<()> {
    store.remove(PROFILE_STORAGE_KEY)
}
