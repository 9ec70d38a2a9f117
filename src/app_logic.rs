/*
 * This module provides the application logic layer, centered around
 * `TlpProfileManager`, which the presentation layer (the CLI in this crate) drives.
 * Unit tests for `TlpProfileManager` are in `handler_tests.rs`.
 */
pub mod handler;


pub use handler::TlpProfileManager;
