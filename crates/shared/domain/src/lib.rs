//! # Domain Models
//!
//! Pure School Finder types with minimal dependencies (`serde`, `bitflags`).
//! Keep it lean: no I/O, networking, or evaluation logic, just data and simple helpers.

pub mod config;
pub mod constants;
pub mod features;
