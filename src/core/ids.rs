//! Id generation for notification records.
//!
//! Ids are random v4 UUIDs. When the caller reports that a freshly
//! generated id is already taken, `fallback_id` produces a time
//! ordered v7 UUID (millisecond timestamp plus random bits) instead.

use uuid::Uuid;

pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn fallback_id() -> String {
    Uuid::now_v7().to_string()
}

/// Generate an id that `taken` does not report as already in use.
pub fn unique_id(taken: impl Fn(&str) -> bool) -> String {
    let id = generate_id();
    if !taken(&id) {
        return id;
    }
    loop {
        let id = fallback_id();
        if !taken(&id) {
            return id;
        }
    }
}
