use std::time::Duration;

use moka::future::Cache;
use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::warn;

use crate::leave::store::LeaveStore;

/// Resolved display names, keyed by user id. Short TTL: a rename should
/// show up in reports within minutes.
static NAME_CACHE: Lazy<Cache<u64, String>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(300))
        .build()
});

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Client for the external user directory. Every lookup is best-effort:
/// failures are logged and degrade to an empty result, never an error.
#[derive(Clone)]
pub struct Directory {
    client: reqwest::Client,
    base_url: String,
}

impl Directory {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build directory HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn lookup(&self, user_id: u64) -> Option<UserProfile> {
        let url = format!("{}/users/{}", self.base_url, user_id);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.json::<UserProfile>().await {
                Ok(profile) => Some(profile),
                Err(e) => {
                    warn!(user_id, error = %e, "user lookup returned malformed body");
                    None
                }
            },
            Ok(resp) => {
                warn!(user_id, status = %resp.status(), "user lookup failed");
                None
            }
            Err(e) => {
                warn!(user_id, error = %e, "user lookup failed");
                None
            }
        }
    }

    pub async fn email(&self, user_id: u64) -> String {
        self.lookup(user_id)
            .await
            .map(|p| p.email)
            .unwrap_or_default()
    }

    /// Best available display name: cache, then directory, then the latest
    /// `employee_name` snapshot stored with the user's leave rows, then
    /// empty string.
    pub async fn display_name<S: LeaveStore>(&self, store: &S, user_id: u64) -> String {
        if let Some(name) = NAME_CACHE.get(&user_id).await {
            return name;
        }
        if let Some(profile) = self.lookup(user_id).await {
            if !profile.name.is_empty() {
                NAME_CACHE.insert(user_id, profile.name.clone()).await;
                return profile.name;
            }
        }
        match store.latest_employee_name(user_id).await {
            Ok(Some(name)) => name,
            Ok(None) => String::new(),
            Err(e) => {
                warn!(user_id, error = %e, "fallback name lookup failed");
                String::new()
            }
        }
    }
}
