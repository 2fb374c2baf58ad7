//! # flatstore
//!
//! An embedded object store that persists typed records to per-type flat
//! files, with:
//! - One partition directory and data file per record type
//! - Delimiter-framed JSON lines, resilient to individual corrupt records
//! - A lazily built per-type cache backing reads and existence checks
//! - Equality-conjunction filtering over record fields
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Engine Facade                          │
//! │      get / get_stack / add / update / delete / does_exist    │
//! └────────┬─────────────────┬──────────────────┬───────────────┘
//!          │                 │                  │
//!          ▼                 ▼                  ▼
//!   ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//!   │ StackCache  │   │  LineCodec  │   │   Filter     │
//!   │  (RwLock)   │   │ + Registry  │   │ (AND match)  │
//!   └──────┬──────┘   └──────┬──────┘   └──────────────┘
//!          │                 │
//!          └────────┬────────┘
//!                   ▼
//!           ┌─────────────┐
//!           │  TypeStore  │
//!           │(file / type)│
//!           └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use flatstore::{Engine, Record};
//! use serde_json::json;
//!
//! let engine = Engine::open_path(std::path::Path::new("./data")).unwrap();
//!
//! let record = Record::of_type("Widget").with("name", json!("bolt"));
//! let id = engine.add(record).unwrap();
//!
//! let stored = engine.get("Widget", &id).unwrap().unwrap();
//! assert_eq!(stored.get("name"), Some(&json!("bolt")));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod codec;
pub mod store;
pub mod cache;
pub mod filter;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FlatError, Result};
pub use config::Config;
pub use engine::Engine;
pub use filter::Requirements;
pub use record::{Record, TypeRegistry};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of flatstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
