//! Project management module
//!
//! This module contains functionality for managing compose projects:
//! - Compose file discovery and environment snapshots
//! - `.env` parsing and serialization
//! - Project registry

pub mod compose;
pub mod env;
pub mod registry;
