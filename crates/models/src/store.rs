use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::user::User;

/// Identifier (decimal string) → user.
pub type UserList = BTreeMap<String, User>;

/// The persisted aggregate: every user plus the counter used to mint ids.
///
/// `increment` only grows, deletes included, so an id is never handed out twice.
/// Every key in `list` is the decimal form of some integer `<= increment`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserStore {
    /// Signed: files carrying a negative counter still load instead of failing open.
    #[serde(default)]
    pub increment: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub list: UserList,
}

impl UserStore {
    /// Advance the counter and return the freshly minted id.
    /// `None` once the counter is exhausted; the store is left untouched.
    pub fn next_id(&mut self) -> Option<String> {
        self.increment = self.increment.checked_add(1)?;
        Some(self.increment.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.list.contains_key(id)
    }
}

// Older writers emit `"list": null` for an empty map.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
