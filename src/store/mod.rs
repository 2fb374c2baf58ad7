//! Type Store Module
//!
//! Physical file access for type partitions.
//!
//! ## Responsibilities
//! - One directory per type tag, one fixed-name data file inside
//! - Lazy partition creation on first touch
//! - Whole-file reads split into candidate lines
//! - Appends for inserts, atomic full rewrites for everything else
//!
//! ## File Layout
//! ```text
//! {db_path}/
//!   ├── Widget/
//!   │   └── records.db
//!   └── Order/
//!       └── records.db
//! ```

mod partition;

pub use partition::TypeStore;

/// Fixed leaf name of the data file inside each partition directory
pub const DATA_FILENAME: &str = "records.db";
