//! API Key secret generation
//!
//! Secrets are a fixed literal namespace prefix plus hex-encoded random
//! bytes, so malformed input is rejected by shape alone before any
//! storage access. Only the SHA-256 digest of the secret is stored.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Namespace prefix carried by every secret this engine issues.
pub const SECRET_PREFIX: &str = "pk_";

/// Random bytes per secret. 32 bytes is well above the 128-bit floor.
const DEFAULT_SECRET_BYTES: usize = 32;

/// Display-safe prefix length: namespace plus the first 8 hex chars.
const DISPLAY_PREFIX_CHARS: usize = 8;

/// Result of generating a new secret
#[derive(Debug, Clone)]
pub struct GeneratedSecret {
    /// The full secret (only shown once at creation)
    pub secret: String,
    /// Display-safe prefix for identification
    pub display_prefix: String,
    /// The digest for storage and lookup
    pub hash: String,
}

/// Generator for bearer secrets
#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    prefix: String,
    secret_bytes: usize,
}

impl ApiKeyGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            secret_bytes: DEFAULT_SECRET_BYTES,
        }
    }

    pub fn with_secret_bytes(mut self, bytes: usize) -> Self {
        self.secret_bytes = bytes;
        self
    }

    /// Generate a new secret
    pub fn generate(&self) -> GeneratedSecret {
        let mut random_bytes = vec![0u8; self.secret_bytes];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        let encoded = hex::encode(&random_bytes);
        let secret = format!("{}{}", self.prefix, encoded);
        let display_prefix = format!(
            "{}{}",
            self.prefix,
            &encoded[..DISPLAY_PREFIX_CHARS.min(encoded.len())]
        );
        let hash = self.hash_secret(&secret);

        GeneratedSecret {
            secret,
            display_prefix,
            hash,
        }
    }

    /// Shape check: namespace prefix plus exactly the expected run of hex
    /// digits. Cheap, and runs before any storage access.
    pub fn is_well_formed(&self, secret: &str) -> bool {
        let Some(body) = secret.strip_prefix(self.prefix.as_str()) else {
            return false;
        };

        body.len() == self.secret_bytes * 2
            && body.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
    }

    /// Digest a secret for storage/lookup
    pub fn hash_secret(&self, secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        format!("sha256${}", hex::encode(hasher.finalize()))
    }

    /// Verify a presented secret against a stored digest
    pub fn verify(&self, secret: &str, stored_hash: &str) -> bool {
        constant_time_compare(&self.hash_secret(secret), stored_hash)
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self::new(SECRET_PREFIX)
    }
}

/// Constant-time string comparison to prevent timing attacks
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;

    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
