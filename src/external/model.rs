//! External record types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A user record from the external collection.
///
/// Only the fields the service relies on are typed; everything else
/// (address, phone, company, ...) is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
