//! Runtime settings: roles, numeric limits and string lists.
//!
//! Reads never suspend, so trigger matchers can check roles inline.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::info;

#[derive(Default)]
struct SettingsData {
    roles: HashMap<String, HashSet<String>>,
    numbers: HashMap<String, i64>,
    lists: HashMap<String, Vec<String>>,
}

/// Role membership and keyed configuration values.
#[derive(Default)]
pub struct Settings {
    data: RwLock<SettingsData>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `person_id` holds `role`.
    pub fn check_role(&self, person_id: &str, role: &str) -> bool {
        self.data
            .read()
            .roles
            .get(role)
            .is_some_and(|members| members.contains(person_id))
    }

    /// Numeric setting, 0 when unset.
    pub fn get_config(&self, key: &str) -> i64 {
        self.data.read().numbers.get(key).copied().unwrap_or(0)
    }

    /// List setting, empty when unset.
    pub fn get_string_config(&self, key: &str) -> Vec<String> {
        self.data.read().lists.get(key).cloned().unwrap_or_default()
    }

    pub fn grant_role(&self, person_id: impl Into<String>, role: impl Into<String>) {
        let person_id = person_id.into();
        let role = role.into();
        info!("Granting role {} to {}", role, person_id);
        self.data
            .write()
            .roles
            .entry(role)
            .or_default()
            .insert(person_id);
    }

    /// Returns true if the person held the role.
    pub fn revoke_role(&self, person_id: &str, role: &str) -> bool {
        self.data
            .write()
            .roles
            .get_mut(role)
            .is_some_and(|members| members.remove(person_id))
    }

    pub fn set_config(&self, key: impl Into<String>, value: i64) {
        self.data.write().numbers.insert(key.into(), value);
    }

    pub fn set_string_config(&self, key: impl Into<String>, values: Vec<String>) {
        self.data.write().lists.insert(key.into(), values);
    }
}
