//! Pure domain logic for the mediagen platform.
//!
//! This crate has no I/O: quota math, tariff resolution, safety-code
//! classification, and the shared result/error types. Everything with a
//! database or network dependency lives in the sibling crates.

pub mod error;
pub mod generation;
pub mod pricing;
pub mod quota;
pub mod safety;
pub mod types;
