use anyhow::{Context, Result};
use keyring::Entry;
use tracing::debug;

const SERVICE_NAME: &str = "sitecache";

pub struct CredentialStore;

impl CredentialStore {
    /// Keychain entry for a project, keyed by its URL
    fn entry(project_url: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, project_url.trim_end_matches('/'))
            .context("Failed to create keyring entry")
    }

    /// Store the API key for a project in the OS keychain
    pub fn store_api_key(project_url: &str, api_key: &str) -> Result<()> {
        Self::entry(project_url)?
            .set_password(api_key)
            .context("Failed to store API key in keychain")
    }

    /// Retrieve the API key for a project from the OS keychain
    pub fn get_api_key(project_url: &str) -> Result<String> {
        Self::entry(project_url)?
            .get_password()
            .context("Failed to retrieve API key from keychain")
    }

    /// Like `get_api_key`, but a missing entry or keychain is just `None`
    pub fn find_api_key(project_url: &str) -> Option<String> {
        match Self::get_api_key(project_url) {
            Ok(key) => Some(key),
            Err(e) => {
                debug!(error = %e, "No API key in keychain");
                None
            }
        }
    }

    /// Delete the stored API key for a project
    pub fn delete_api_key(project_url: &str) -> Result<()> {
        Self::entry(project_url)?
            .delete_credential()
            .context("Failed to delete API key from keychain")
    }
}
