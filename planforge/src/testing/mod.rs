//! Test support: deterministic mocks and shared fixtures.
//!
//! Shipped as a normal module so downstream crates can reuse the doubles
//! when testing against the provider and event seams.

pub mod fixtures;
pub mod mocks;
