use serde::{Deserialize, Serialize};

/// Claims minted by the user service at login. `sub` is the numeric user id;
/// `role` is the wire form of [`crate::model::role::Role`].
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: u64,
    pub role: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
}
