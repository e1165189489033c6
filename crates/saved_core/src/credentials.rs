use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::SaverError;

const APP_DIR: &str = "reddit_saver";
const CREDENTIALS_NAME: &str = "credentials.json";
pub const DEFAULT_PROFILE: &str = "saver_bot";
pub const ENV_PREFIX: &str = "REDDIT_SAVER_";

/// A profile as stored on disk; any field may be supplied by the environment instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ProfileEntry {
    fn is_empty(&self) -> bool {
        self == &ProfileEntry::default()
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields: [(&str, &mut Option<String>); 5] = [
            ("CLIENT_ID", &mut self.client_id),
            ("CLIENT_SECRET", &mut self.client_secret),
            ("USERNAME", &mut self.username),
            ("PASSWORD", &mut self.password),
            ("USER_AGENT", &mut self.user_agent),
        ];
        for (suffix, slot) in fields {
            if let Some(value) = lookup(&format!("{ENV_PREFIX}{suffix}")) {
                *slot = Some(value);
            }
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

/// Named credential profiles, keyed by profile name.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    profiles: BTreeMap<String, ProfileEntry>,
}

impl CredentialStore {
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, SaverError> {
        let path = custom_path.unwrap_or_else(default_credentials_path);
        let profiles = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)
                .map_err(|err| SaverError::Config(format!("{}: {err}", path.display())))?
        } else {
            debug!("No credentials file at {}", path.display());
            BTreeMap::new()
        };
        Ok(Self { path, profiles })
    }

    pub fn from_profiles(path: PathBuf, profiles: BTreeMap<String, ProfileEntry>) -> Self {
        Self { path, profiles }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves `profile`, letting `REDDIT_SAVER_*` environment variables override stored fields.
    pub fn resolve(&self, profile: &str) -> Result<Credentials, SaverError> {
        self.resolve_with(profile, |key| std::env::var(key).ok())
    }

    pub fn resolve_with<F>(&self, profile: &str, lookup: F) -> Result<Credentials, SaverError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut entry = self.profiles.get(profile).cloned().unwrap_or_default();
        entry.apply_overrides(|key| lookup(key).filter(|value| !value.trim().is_empty()));
        if entry.is_empty() {
            return Err(SaverError::Authentication(format!(
                "profile `{profile}` not found in {}",
                self.path.display()
            )));
        }

        let missing = |field: &str| {
            SaverError::Authentication(format!(
                "profile `{profile}` has no `{field}` (set it in {} or {ENV_PREFIX}{})",
                self.path.display(),
                field.to_ascii_uppercase()
            ))
        };
        let username = entry.username.ok_or_else(|| missing("username"))?;
        let user_agent = entry
            .user_agent
            .unwrap_or_else(|| default_user_agent(&username));
        Ok(Credentials {
            client_id: entry.client_id.ok_or_else(|| missing("client_id"))?,
            client_secret: entry.client_secret.ok_or_else(|| missing("client_secret"))?,
            password: entry.password.ok_or_else(|| missing("password"))?,
            username,
            user_agent,
        })
    }
}

pub fn default_user_agent(username: &str) -> String {
    format!(
        "rust:reddit_saver:v{} (by /u/{username})",
        env!("CARGO_PKG_VERSION")
    )
}

fn default_credentials_path() -> PathBuf {
    let mut base = config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR);
    base.push(CREDENTIALS_NAME);
    base
}
