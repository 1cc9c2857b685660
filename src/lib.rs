//! Weather station daemon library.
//!
//! Exposes the daemon core, device controllers, and adapters for
//! integration testing and external inspection. Hardware-specific code is
//! guarded by the `hardware` feature within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod devices;
pub mod error;
pub mod sensors;
pub mod units;
pub mod web;
