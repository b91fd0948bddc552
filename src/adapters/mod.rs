//! Adapter implementations for port traits
//!
//! This module contains concrete implementations that handle I/O:
//!
//! - [`local`] - In-memory dataset implementing `SurveyStore`
//! - [`json`] - Reading and writing the dataset file

pub mod json;
pub mod local;

pub use local::{Dataset, LocalStore};
