/*
 * Responsibility
 * - Fetch the issuer's published signing keys ({issuer}/.well-known/jwks.json)
 * - Index them by kid with a ready-to-use decoding key per entry
 * - Optional caching through an injected KeySetCache collaborator
 */
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{Algorithm, DecodingKey};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Key-resolution errors. These are transport/format failures, not auth
/// failures; classification into the auth taxonomy happens one layer up.
#[derive(Debug, Error)]
pub enum JwksError {
    #[error("jwks endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid issuer url: {0}")]
    InvalidIssuer(String),

    #[error("unusable jwk: {0}")]
    Key(#[from] jsonwebtoken::errors::Error),

    #[error("malformed jwks document: {0}")]
    Malformed(String),
}

/// One published signing key: the original descriptor plus the verification
/// key and algorithm derived from it.
#[derive(Clone)]
pub struct SigningKey {
    pub jwk: Jwk,
    pub decoding_key: DecodingKey,
    pub algorithm: Algorithm,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// The issuer's signing keys, indexed by kid.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: HashMap<String, SigningKey>,
}

impl KeySet {
    /// Build from a published JWKS document.
    ///
    /// Keys without a kid cannot be addressed by a token header and are
    /// skipped, as are keys carrying a non-signature algorithm (issuers may
    /// publish encryption keys alongside signing keys). A signing key that
    /// cannot be converted fails the whole set, since a partially usable set
    /// would turn an operator error into sporadic invalid-token responses.
    pub fn from_jwks(jwks: &JwkSet) -> Result<Self, JwksError> {
        let mut keys = HashMap::new();

        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                debug!("skipping jwk without kid");
                continue;
            };

            let algorithm = match jwk.common.key_algorithm {
                Some(ka) => match Algorithm::from_str(&ka.to_string()) {
                    Ok(alg) => alg,
                    Err(_) => {
                        debug!(%kid, alg = %ka, "skipping non-signature jwk");
                        continue;
                    }
                },
                // Cognito omits alg on some pools; RS256 is its signing default.
                None => Algorithm::RS256,
            };
            let decoding_key = DecodingKey::from_jwk(jwk)?;

            keys.insert(
                kid,
                SigningKey {
                    jwk: jwk.clone(),
                    decoding_key,
                    algorithm,
                },
            );
        }

        Ok(Self { keys })
    }

    pub fn get(&self, kid: &str) -> Option<&SigningKey> {
        self.keys.get(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Fetches the issuer's JWKS document. Injected so the verifier can be
/// exercised without a network.
#[async_trait]
pub trait JwksFetcher: Send + Sync {
    async fn fetch(&self, issuer: &str) -> Result<JwkSet, JwksError>;
}

/// Production fetcher: one GET per resolution, no retry (callers wrap with
/// their own retry policy if they need one).
#[derive(Debug, Clone, Default)]
pub struct HttpJwksFetcher {
    client: reqwest::Client,
}

impl HttpJwksFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JwksFetcher for HttpJwksFetcher {
    async fn fetch(&self, issuer: &str) -> Result<JwkSet, JwksError> {
        let raw = format!("{issuer}/.well-known/jwks.json");
        let url = Url::parse(&raw).map_err(|_| JwksError::InvalidIssuer(raw))?;

        debug!(%url, "fetching jwks");
        let jwks = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;

        Ok(jwks)
    }
}

/// Cache collaborator for resolved key sets.
///
/// Every invocation is treated as needing a fresh fetch unless the host
/// wires in a cache; warm-start reuse is an optimization, not a guarantee.
#[async_trait]
pub trait KeySetCache: Send + Sync {
    async fn get(&self, issuer: &str) -> Option<KeySet>;
    async fn put(&self, issuer: &str, keys: KeySet);
}

/// Default collaborator: no caching, refetch per resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

#[async_trait]
impl KeySetCache for NoCache {
    async fn get(&self, _issuer: &str) -> Option<KeySet> {
        None
    }

    async fn put(&self, _issuer: &str, _keys: KeySet) {}
}

/// In-memory TTL cache for hosts that keep the process alive between
/// invocations.
#[derive(Debug)]
pub struct MemoryKeySetCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, KeySet)>>,
}

impl MemoryKeySetCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl KeySetCache for MemoryKeySetCache {
    async fn get(&self, issuer: &str) -> Option<KeySet> {
        let entries = self.entries.lock().expect("keyset cache poisoned");
        let (stored_at, keys) = entries.get(issuer)?;
        if stored_at.elapsed() > self.ttl {
            return None;
        }
        Some(keys.clone())
    }

    async fn put(&self, issuer: &str, keys: KeySet) {
        let mut entries = self.entries.lock().expect("keyset cache poisoned");
        entries.insert(issuer.to_string(), (Instant::now(), keys));
    }
}
