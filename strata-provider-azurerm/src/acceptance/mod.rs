//! Acceptance test support
//!
//! Fixtures build configuration documents from a `TestData`, and
//! `TestData::resource_test` applies them against a live subscription. Tests
//! are skipped unless `TF_ACC` is set.

mod check;
mod data;
mod document;
mod runner;

pub use check::{Check, ExistenceChecker, exists_by_id};
pub use data::{DEFAULT_PRIMARY_LOCATION, DEFAULT_SECONDARY_LOCATION, Locations, TestData};
pub use document::{ConfigDocument, ConfigDocumentError, resolve_references};
pub use runner::{ACCEPTANCE_ENV, ResourceTest, TestStep, acceptance_enabled};
