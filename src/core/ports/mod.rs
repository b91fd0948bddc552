//! Port traits (interfaces) for external dependencies
//!
//! These traits define the boundary between the core rules and the data
//! store that holds survey records.
//!
//! Implementations live in the `adapters` module.
//!
//! ## Design Principle
//!
//! The core domain logic depends only on these traits, never on concrete
//! implementations, so services are tested against the in-memory store and
//! run in production against whatever backend the host provides.

mod survey_store;

pub use survey_store::SurveyStore;
