//! Access control infrastructure

mod in_memory;
mod service;

pub use in_memory::InMemoryAccessRepository;
pub use service::AccessService;
