//! Semantic-memory retrieval service.
//!
//! memscope stores free-text memories in an external vector database, retrieves them by
//! semantic similarity, and analyzes the corpus for near-duplicates and latent
//! relationships. Embeddings come from an external provider; nothing is indexed
//! in-process.
//!
//! # Architecture
//!
//! - **Storage**: a Chroma-compatible vector database over its v2 REST API, or an
//!   in-process brute-force store for ephemeral runs
//! - **Embeddings**: an Ollama-compatible `/api/embeddings` endpoint
//! - **Analytics**: greedy near-duplicate grouping through the vector index, and a
//!   pairwise similarity graph over a sample
//! - **Transport**: `POST /{operation}` over HTTP, or MCP tools over stdio
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`store`]: Vector store accessor trait and its backends
//! - [`embedding`]: Text-to-vector embedding via an external provider
//! - [`memory`]: Store, query, delete, listings, duplicate and graph engines
//! - [`sync`]: External sync process trigger
//! - [`service`] / [`router`] / [`http`]: Request handling

pub mod api;
pub mod config;
pub mod embedding;
pub mod error;
pub mod http;
pub mod memory;
pub mod router;
pub mod service;
pub mod store;
pub mod sync;
