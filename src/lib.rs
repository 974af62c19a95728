//! # colldb
//!
//! A networked key-value store that keeps keyed values in independently
//! named collections, each backed by one JSON snapshot file:
//! - Line-oriented text protocol (`set` / `get` / `delete` / `drop`)
//! - One lock per collection, kept for the life of the process
//! - Full-snapshot rewrite on every mutation
//! - One thread per client session
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (one session per connection)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ line in / line out
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Protocol (parse + format)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Command
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Engine                                │
//! │            lock → load → mutate → persist → unlock           │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │    Registry     │                │     Storage     │
//!   │ (name → Mutex)  │                │ (JSON snapshot) │
//!   └─────────────────┘                └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod registry;
pub mod engine;
pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use client::Client;
pub use config::{Config, CorruptPolicy};
pub use engine::Engine;
pub use error::{CollError, Result};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of colldb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
