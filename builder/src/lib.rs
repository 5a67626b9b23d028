//! VPM package listing builder.
//!
//! Reads a listing source document, gathers candidate release archives from
//! explicit URLs and GitHub repositories, validates each archive's root
//! `package.json`, and writes the accepted packages to `index.json`.
//! Archives already present in the previously published listing are skipped.
//!
//! # Modules
//!
//! - [`artifact`] - Archive download, manifest extraction and hashing
//! - [`assembler`] - Candidate ordering, deduplication and listing assembly
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Build configuration from arguments and host environment
//! - [`error`] - Error types for fatal build failures
//! - [`existing`] - Previously published listing lookup
//! - [`github`] - Repository reference parsing and release resolution
//! - [`http`] - Blocking HTTP transport
//! - [`listing`] - Listing document models
//! - [`manifest`] - Package manifest model and parsing
//! - [`outcome`] - Success, soft-skip and fatal per-item outcomes
//! - [`pipeline`] - End-to-end build orchestration
//! - [`source`] - Listing source document loading
//! - [`writer`] - Listing serialisation and persistence

pub mod artifact;
pub mod assembler;
pub mod cli;
pub mod config;
pub mod error;
pub mod existing;
pub mod github;
pub mod http;
pub mod listing;
pub mod manifest;
pub mod outcome;
pub mod pipeline;
pub mod source;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod writer;
