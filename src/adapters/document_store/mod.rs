//! Document store adapters.
//!
//! - `ElasticsearchDocumentStore` - REST client for production
//! - `InMemoryDocumentStore` - Versioned in-process store for tests

mod elasticsearch;
mod in_memory;

pub use elasticsearch::ElasticsearchDocumentStore;
pub use in_memory::InMemoryDocumentStore;
