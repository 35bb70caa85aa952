//! # reload-cli
//!
//! Binary entry point for the reload harness.
//!
//! This crate provides:
//! - CLI argument parsing using `clap`
//! - Logging initialization
//! - The [`runner`] module driving the differential turn loop

pub mod runner;
