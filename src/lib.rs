//! Sensor Chart - chart gateway for temperature, humidity and pressure series
//!
//! This library exposes the core modules for testing and reuse.

pub mod backend;
pub mod chart;
pub mod common;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod refresh;
pub mod routes;
pub mod selectors;
pub mod session;
