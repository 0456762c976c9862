//! Core types shared across msgboard facilities
//!
//! This crate provides foundational types used by the error, logging and
//! persistence facilities:
//!
//! - **Sensitive data**: Sensitive<T> marker for automatic redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod schema;
pub mod sensitive;

pub use sensitive::Sensitive;
