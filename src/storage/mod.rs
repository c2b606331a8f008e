//! Storage module
//!
//! Thin wrapper over `object_store` used by every job.
//!
//! # Overview
//!
//! This module provides:
//! - URL parsing into a store plus key prefix (S3, GCS, Azure, local)
//! - Explicit credentials loaded from a secrets file
//! - Listing with suffix filtering, existence probes, get/put/delete

mod location;

pub use location::{Storage, StorageCredentials};
pub(crate) use location::join_key;
