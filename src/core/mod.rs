//! Core domain logic for ecotrack
//!
//! Survey records, the rules that audit them and the aggregates built from
//! them. Storage sits behind the port traits.
//!
//! ## Architecture
//!
//! - `models/` - Domain types (Surveyor, Student, Expense, Anomaly)
//! - `services/` - Detection, reporting and data-entry logic
//! - `ports/` - Trait definitions for external dependencies
//! - `error` - Domain error type

pub mod error;
pub mod models;
pub mod ports;
pub mod services;
