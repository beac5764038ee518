//! Shared wiring for the cascata demos.
pub mod common;
