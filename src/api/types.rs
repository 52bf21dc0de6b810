//! Shared types for the HTTP API layer.

use std::path::PathBuf;
use std::sync::Arc;

use subtle::ConstantTimeEq;

use crate::config::AppConfig;
use crate::pipeline::underwriting::DealEvaluator;

// ═══════════════════════════════════════════════════════════
// API context — shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
///
/// Nothing in here is mutated after startup; requests only read it.
#[derive(Clone)]
pub struct ApiContext {
    pub evaluator: Arc<DealEvaluator>,
    pub tokens: Arc<TokenRegistry>,
    pub upload_dir: Arc<PathBuf>,
    pub max_upload_bytes: usize,
}

impl ApiContext {
    pub fn new(
        evaluator: DealEvaluator,
        tokens: TokenRegistry,
        upload_dir: PathBuf,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
            tokens: Arc::new(tokens),
            upload_dir: Arc::new(upload_dir),
            max_upload_bytes,
        }
    }

    pub fn from_config(config: &AppConfig, evaluator: DealEvaluator) -> Self {
        Self::new(
            evaluator,
            TokenRegistry::from_pairs(&config.api_tokens),
            config.upload_dir.clone(),
            config.max_upload_bytes,
        )
    }
}

// ═══════════════════════════════════════════════════════════
// Principal — injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated caller, injected into request extensions by the auth
/// middleware after successful token validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
}

// ═══════════════════════════════════════════════════════════
// Token registry
// ═══════════════════════════════════════════════════════════

/// Hashes of the bearer tokens accepted by the API. Plain tokens are not
/// retained after construction.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    entries: Vec<(String, [u8; 32])>,
}

impl TokenRegistry {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(subject, token)| (subject.clone(), hash_token(token)))
                .collect(),
        }
    }

    /// Subject owning `token`, if any. Every entry is compared so the time
    /// taken does not depend on which one matches.
    pub fn authenticate(&self, token: &str) -> Option<Principal> {
        let presented = hash_token(token);
        let mut found: Option<&str> = None;
        for (subject, hash) in &self.entries {
            if bool::from(hash.ct_eq(&presented)) {
                found = Some(subject);
            }
        }
        found.map(|subject| Principal {
            subject: subject.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}
