//! SoundCloud track search exposed as an MCP tool (`search_tracks`).
//!
//! - `clients`: OAuth2 token exchange and the `/tracks` search client
//! - `domain`: search filters, query-string flattening, track normalization
//! - `tools`: the `search_tracks` adapter, its registry and rmcp router
//! - `infra`: config, logging, token source, transports and the axum app

pub mod api;
pub mod cli;
pub mod clients;
pub mod core;
pub mod domain;
pub mod infra;
pub mod tools;
