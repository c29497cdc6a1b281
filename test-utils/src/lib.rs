//! Shared test utilities for the mvault crates.
//!
//! This crate provides:
//! - Proptest generators for members, mappings and timestamps
//! - A recording in-memory membership provider
//! - Sample members and export files

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
