//! Engine Module
//!
//! The public CRUD surface that coordinates all components.
//!
//! ## Responsibilities
//! - Sequence cache loads, full-file scans, appends, and rewrites
//! - Inject the engine-managed id and type tag into incoming records
//! - Serialize mutations per type partition
//!
//! ## Concurrency Model
//!
//! - All methods take `&self`; the engine is shared freely across threads
//! - **Mutations** (add/update/delete): hold a per-type mutex across the
//!   whole read-modify-rewrite cycle, so concurrent writers to one
//!   partition cannot lose updates
//! - **Reads** (get/get_stack/does_exist): served from the cache's RwLock;
//!   a cache miss takes the partition mutex while building the stack
//! - No cross-process safety: between processes, last writer wins

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::{Stack, StackCache};
use crate::codec::LineCodec;
use crate::config::Config;
use crate::error::{FlatError, Result};
use crate::filter::{self, Requirements};
use crate::record::{Record, TypeRegistry};
use crate::store::TypeStore;

/// The main storage engine
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Flat-file access, one partition per type
    store: TypeStore,

    /// Record ⇄ JSON line conversion
    codec: LineCodec,

    /// Lazily built per-type stacks (internal RwLock)
    cache: StackCache,

    /// Concrete shapes to rebuild on read
    registry: TypeRegistry,

    /// One mutex per type partition, created on first use
    partition_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// A record that passed the shared precondition: structured, non-blank
/// (unless allowed), with id and type tag populated.
struct Validated {
    record: Record,
    type_tag: String,
    id: String,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// Validates the config and creates the base directory. Partition
    /// directories are created lazily on first touch.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.db_path)?;

        tracing::info!(db_path = %config.db_path.display(), "opening engine");

        let store = TypeStore::new(&config.db_path, &config.delimiter);
        let codec = LineCodec::new(&config.delimiter);

        Ok(Self {
            config,
            store,
            codec,
            cache: StackCache::new(),
            registry: TypeRegistry::new(),
            partition_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified base directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().db_path(path).build())
    }

    /// Register a concrete type so stored records whose class is
    /// `type_name` are rebuilt into `T` on read.
    ///
    /// Registration happens at setup, before the engine is shared.
    pub fn register_type<T>(&mut self, type_name: &str)
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        self.registry.register::<T>(type_name);
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Get a single record by id
    ///
    /// `None` is a valid not-found result, never an error.
    pub fn get(&self, type_tag: &str, id: &str) -> Result<Option<Record>> {
        tracing::debug!(type_tag, id, "get");
        let stack = self.load_stack_synced(type_tag)?;
        Ok(stack.get(id).cloned())
    }

    /// All records of a type, unfiltered
    pub fn get_all(&self, type_tag: &str) -> Result<Stack> {
        self.get_stack(type_tag, &Requirements::new())
    }

    /// All records of a type matching the given requirements
    pub fn get_stack(&self, type_tag: &str, requirements: &Requirements) -> Result<Stack> {
        tracing::debug!(type_tag, "get_stack");
        let stack = self.load_stack_synced(type_tag)?;
        Ok(stack
            .into_iter()
            .filter(|(_, record)| filter::matches(record, requirements))
            .collect())
    }

    /// Cache-backed membership test
    ///
    /// A record arriving without an id gets a fresh one, which by
    /// construction does not exist yet.
    pub fn does_exist(&self, record: &Record) -> Result<bool> {
        tracing::debug!("does_exist");
        let validated = self.check_requirements(record.clone())?;
        if let Some(hit) = self.cache.contains(&validated.type_tag, &validated.id) {
            return Ok(hit);
        }
        let stack = self.load_stack_synced(&validated.type_tag)?;
        Ok(stack.contains_key(&validated.id))
    }

    // =========================================================================
    // Mutating Operations
    // =========================================================================

    /// Add a record, returning its id
    ///
    /// Upserts: an id already stored for the type routes to [`update`].
    /// Otherwise the record is appended as one new line — the only write
    /// path that does not rewrite the whole file.
    ///
    /// [`update`]: Engine::update
    pub fn add(&self, record: Record) -> Result<String> {
        tracing::debug!("add");
        let validated = self.check_requirements(record)?;
        let lock = self.partition_lock(&validated.type_tag);
        let _guard = lock.lock();
        self.add_locked(validated)
    }

    /// Update a record in place, returning its id
    ///
    /// Replaces the stored entry and rewrites the whole partition file.
    /// Returns `Ok(None)` without touching the file when nothing is stored
    /// under the record's id.
    pub fn update(&self, record: Record) -> Result<Option<String>> {
        tracing::debug!("update");
        let validated = self.check_requirements(record)?;
        let lock = self.partition_lock(&validated.type_tag);
        let _guard = lock.lock();
        self.update_locked(validated)
    }

    /// Delete a record
    ///
    /// Removes the entry if present and rewrites the partition file.
    /// Silently no-ops when the id is absent; other records are untouched.
    pub fn delete(&self, record: &Record) -> Result<()> {
        tracing::debug!("delete");
        let validated = self.check_requirements(record.clone())?;
        let lock = self.partition_lock(&validated.type_tag);
        let _guard = lock.lock();

        let mut stack = self.load_stack(&validated.type_tag)?;
        if stack.remove(&validated.id).is_none() {
            return Ok(());
        }
        self.rewrite_stack(&validated.type_tag, &stack)?;
        self.cache.remove(&validated.type_tag, &validated.id);
        Ok(())
    }

    /// Drop the cached stack for a type so the next access re-reads the
    /// file — the escape hatch for partitions modified outside this engine.
    pub fn invalidate(&self, type_tag: &str) {
        self.cache.invalidate(type_tag);
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the base directory path
    pub fn db_path(&self) -> &Path {
        &self.config.db_path
    }

    /// Number of cached records for a type, if its stack is built
    pub fn cached_stack_len(&self, type_tag: &str) -> Option<usize> {
        self.cache.stack_len(type_tag)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Add with the partition lock held
    fn add_locked(&self, validated: Validated) -> Result<String> {
        if self.exists_locked(&validated.type_tag, &validated.id)? {
            // Upsert: the id is taken, so this is an update. The stack is
            // loaded by the existence check, so update never misses it.
            let id = validated.id.clone();
            self.update_locked(validated)?;
            return Ok(id);
        }

        let Validated { record, type_tag, id } = validated;
        let line = self.codec.encode(&record)?;
        self.store.append_line(&type_tag, &line)?;
        self.cache.update(&type_tag, &id, record);
        Ok(id)
    }

    /// Update with the partition lock held
    fn update_locked(&self, validated: Validated) -> Result<Option<String>> {
        let Validated { record, type_tag, id } = validated;
        let mut stack = self.load_stack(&type_tag)?;
        if !stack.contains_key(&id) {
            return Ok(None);
        }
        stack.insert(id.clone(), record.clone());
        self.rewrite_stack(&type_tag, &stack)?;
        self.cache.update(&type_tag, &id, record);
        Ok(Some(id))
    }

    /// Existence check with the partition lock held
    fn exists_locked(&self, type_tag: &str, id: &str) -> Result<bool> {
        if let Some(hit) = self.cache.contains(type_tag, id) {
            return Ok(hit);
        }
        Ok(self.load_stack(type_tag)?.contains_key(id))
    }

    /// Cached stack for a type; takes the partition lock on a miss so a
    /// concurrent mutation cannot interleave with the initial scan.
    fn load_stack_synced(&self, type_tag: &str) -> Result<Stack> {
        if let Some(stack) = self.cache.snapshot(type_tag) {
            return Ok(stack);
        }
        let lock = self.partition_lock(type_tag);
        let _guard = lock.lock();
        self.load_stack(type_tag)
    }

    /// Cached stack for a type, building it from disk on first access.
    /// Caller holds the partition lock.
    fn load_stack(&self, type_tag: &str) -> Result<Stack> {
        if let Some(stack) = self.cache.snapshot(type_tag) {
            return Ok(stack);
        }
        let stack = self.read_stack(type_tag)?;
        self.cache.store(type_tag, stack.clone());
        Ok(stack)
    }

    /// Full-file scan: decode every line, skip the malformed, materialize
    fn read_stack(&self, type_tag: &str) -> Result<Stack> {
        let lines = self.store.read_all(type_tag)?;
        let mut stack = Stack::with_capacity(lines.len());
        let mut skipped = 0usize;

        for line in &lines {
            let Some(record) = self.codec.decode(line) else {
                skipped += 1;
                continue;
            };
            let record = self.registry.materialize(record);
            if let Some(id) = record.id().map(str::to_string) {
                stack.insert(id, record);
            }
        }

        if skipped > 0 {
            tracing::warn!(type_tag, skipped, "skipped unparseable lines during scan");
        }
        Ok(stack)
    }

    /// Encode a stack and rewrite its partition file
    fn rewrite_stack(&self, type_tag: &str, stack: &Stack) -> Result<()> {
        let mut lines = Vec::with_capacity(stack.len());
        for record in stack.values() {
            lines.push(self.codec.encode(record)?);
        }
        self.store.rewrite_all(type_tag, &lines)
    }

    /// Mutex guarding mutations of one type partition
    fn partition_lock(&self, type_tag: &str) -> Arc<Mutex<()>> {
        let mut locks = self.partition_locks.lock();
        Arc::clone(locks.entry(type_tag.to_string()).or_default())
    }

    /// Shared precondition for add/update/delete/does_exist: reject blank
    /// records when configured to, generate a missing id, and fall back to
    /// the class name for a missing type tag.
    fn check_requirements(&self, mut record: Record) -> Result<Validated> {
        if !self.config.allow_blank && record.is_blank() {
            return Err(FlatError::Validation(
                "blank record, and allow_blank is disabled".to_string(),
            ));
        }

        let type_tag = match record.type_tag().filter(|tag| !tag.is_empty()) {
            Some(tag) => tag.to_string(),
            None => match record.class_name().filter(|class| !class.is_empty()) {
                Some(class) => class.to_string(),
                None => {
                    return Err(FlatError::Validation(
                        "record has no type tag".to_string(),
                    ))
                }
            },
        };
        record.set_type_tag(&type_tag);

        let id = match record.id().filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let id = generate_id();
                record.set_id(&id);
                id
            }
        };

        Ok(Validated { record, type_tag, id })
    }
}

/// Time-ordered unique id for records stored without one
fn generate_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
