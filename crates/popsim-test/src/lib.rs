//! Shared test fixtures for PopSim crates.
//!
//! This crate provides small hand-built regions: a meta geography
//! (`COUNTY`) split into seed zones (`PUMA`), with households, control tables
//! and weights that line up with each other.
//!
//! - [`regions`] - Region builder and the canned regions used across crates
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! popsim-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use popsim_test::regions::{end_to_end_region, RegionBuilder};
//! ```

pub mod regions;

pub use regions::{Region, RegionBuilder, META, SEED, TOTAL_HH};
