//! # parkwatch-server
//!
//! HTTP server library for the parkwatch vehicle parking tracker.
//!
//! This library provides the API handlers and state management for parkwatch.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod api;
pub mod logging;
pub mod state;
