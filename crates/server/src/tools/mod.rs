//! MCP tool implementations.
//!
//! This module contains all tools exposed by the mentions server.

pub mod cache;
pub mod webmentions;
