//! Core types for the CS console.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod phone;
pub mod range;
pub mod rupiah;
pub mod status;

pub use id::*;
pub use phone::{PhoneNumber, PhoneNumberError};
pub use range::{DateWindow, TimeRange, TimeRangeError, local_day};
pub use rupiah::Rupiah;
pub use status::*;
