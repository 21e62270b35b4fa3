//! Fleetgate Core — domain models, error taxonomy, and the repository
//! trait surface shared by every other crate.
//!
//! This crate performs no I/O. Storage backends implement the traits in
//! [`repository`]; policy code in `fleetgate-authz` is generic over them.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{FleetgateError, FleetgateResult};
