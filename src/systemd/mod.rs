//! Systemd integration module
//!
//! This module contains the user unit template and the dispatcher that
//! drives registration, listing and unit creation.

pub mod commands;
pub mod unit;
