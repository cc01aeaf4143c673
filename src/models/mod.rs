//! Configuration model loaded from external sources.

pub mod config;
