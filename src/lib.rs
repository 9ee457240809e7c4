//! # Akredo (Credential Registration & Verification)
//!
//! `akredo` is a minimal credential service: it registers email/password
//! pairs and verifies later login attempts against the stored hash.
//!
//! ## Credential model
//!
//! - **Identity key:** the email string, treated as an opaque, case-sensitive
//!   unique key. No normalization is applied.
//! - **Credential record:** an Argon2id PHC hash of the password, created
//!   once at registration and read-only afterwards. Plaintext passwords are
//!   never stored or logged.
//! - **Credential set:** the full email → record mapping, persisted as one
//!   human-inspectable JSON document under the configured data directory.
//!
//! ## Concurrency
//!
//! Registration serializes its load-check-save sequence behind a write lock,
//! so two concurrent signups for the same email cannot both succeed.
//! Verification is read-only; saves replace the persisted file atomically so
//! readers never observe a half-written set.
//!
//! ## Error contract
//!
//! Unknown email and wrong password return the same error, so callers cannot
//! enumerate registered emails. A corrupt persisted file degrades to an
//! empty set (logged, not hidden) rather than failing every call.

pub mod api;
pub mod cli;
pub mod credentials;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
