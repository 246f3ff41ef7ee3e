//! htmlup Server Library
//!
//! Uploads HTML documents to an object store and serves them back at
//! `/up/<slug>`. The binary in main.rs wires configuration, storage and the
//! router together.
//!
//! # Modules
//!
//! - `naming`: file name normalization and the storage key scheme
//! - `storage`: object store adapters (S3-compatible and in-memory)
//! - `upload`: concurrent batch uploads with per-item results
//! - `pages`: slug enumeration and page resolution
//! - `routes`: HTTP surface

pub mod config;
pub mod error;
pub mod naming;
pub mod pages;
pub mod routes;
pub mod state;
pub mod storage;
pub mod upload;
