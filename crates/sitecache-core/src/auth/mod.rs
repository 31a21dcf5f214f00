//! API key storage.
//!
//! The site's REST endpoint is read with a project API key. This module
//! provides `CredentialStore`, which keeps that key in the OS keychain so it
//! does not have to sit in the config file or the environment.

pub mod credentials;

pub use credentials::CredentialStore;
