//! Core types shared across modelprefs facilities
//!
//! Holds the canonical field keys and event names used by the logging
//! macros in `modelprefs-core` so that every crate emits the same shape.

pub mod schema;
