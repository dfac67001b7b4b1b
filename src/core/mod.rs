//! Core types & traits: protocol-agnostic contracts for tools and errors.

pub mod error;
pub mod mcp;
pub mod tool;
