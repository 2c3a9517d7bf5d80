//! Concrete settings store implementations.
//!
//! This module contains the production adapter that implements
//! the `SettingsStore` trait defined in the domain layer.

pub mod postgres;

pub use postgres::{PostgresClient, PostgresConfig};
