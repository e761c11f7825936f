//! Common library for the chirp backend
//!
//! This crate provides shared infrastructure used by the chirp services:
//! database connectivity and the error types that go with it.

pub mod database;
pub mod error;
