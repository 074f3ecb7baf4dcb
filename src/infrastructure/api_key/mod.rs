//! API Key infrastructure

mod generator;
mod in_memory;
mod service;

pub use generator::{ApiKeyGenerator, GeneratedSecret, SECRET_PREFIX};
pub use in_memory::InMemoryApiKeyRepository;
pub use service::{ApiKeyService, CreateApiKeyResult};
