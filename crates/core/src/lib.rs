//! CS Console Core - Shared types library.
//!
//! This crate provides common types used across all CS console components:
//! - `admin` - The staff-facing console server
//! - `cli` - Command-line tools for migrations, staff users and metrics jobs
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, phone numbers, statuses, rupiah
//!   amounts and reporting time ranges

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
