//! PostgreSQL adapters.
//!
//! - `PostgresPhaseRepository` - product → phase → project lookups and the progress write

mod phase_repository;

pub use phase_repository::PostgresPhaseRepository;
