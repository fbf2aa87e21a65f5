//! Campaign research daemon library - exposes modules for testing.

pub mod config;
pub mod error;
pub mod normalizer;
pub mod prompts;
pub mod recovery;
pub mod research;
pub mod routes;
pub mod server;
