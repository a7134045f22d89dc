//! In-memory adapters for relational ports.

mod phase_repository;

pub use phase_repository::InMemoryPhaseRepository;
