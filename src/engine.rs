//! Engine Module
//!
//! The storage engine behind the command protocol.
//!
//! ## Responsibilities
//! - Map collection names to snapshot files in the data directory
//! - Serialize all work on one collection through the registry
//! - Run the load → mutate → persist cycle for each operation
//!
//! Nothing is cached between calls: every operation reads the snapshot
//! fresh and, when it changes something, rewrites the whole file before
//! releasing the lock.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use crate::config::{Config, CorruptPolicy};
use crate::error::{CollError, Result};
use crate::protocol::{Command, Response};
use crate::registry::Registry;
use crate::storage::{self, Collection};

/// The main storage engine
///
/// ## Concurrency Model: one lock per collection
///
/// - Every operation takes the collection's lock from the `Registry` and
///   holds it for the full load → mutate → persist span
/// - Operations on different collections never wait on each other
/// - Reads are serialized with writes; a whole-file reload dominates the
///   cost anyway
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Name → lock map, lives as long as the engine
    registry: Registry,
}

impl Engine {
    /// Open an engine over the configured data directory
    ///
    /// Creates the directory if it does not exist yet.
    pub fn open(config: Config) -> Result<Self> {
        if config.file_extension.is_empty() || config.file_extension.contains(['/', '\\']) {
            return Err(CollError::Config(format!(
                "invalid file extension {:?}",
                config.file_extension
            )));
        }

        fs::create_dir_all(&config.data_dir)?;

        tracing::debug!("Engine opened at {}", config.data_dir.display());

        Ok(Self {
            config,
            registry: Registry::new(),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Execute a parsed command and format its response
    ///
    /// Storage failures become `Response::Failure`; they never escape as
    /// errors, so a failing command does not end the session.
    pub fn execute(&self, command: Command) -> Response {
        let name = command.name();

        let outcome = match command {
            Command::Set {
                collection,
                key,
                value,
            } => self
                .upsert(&collection, &key, &value)
                .map(|()| Response::KeyAdded { collection, key }),
            Command::Get { collection, key } => {
                self.lookup(&collection, &key).map(|found| match found {
                    Some(value) => Response::Value(value),
                    None => Response::NoKey { collection, key },
                })
            }
            Command::Delete { collection, key } => {
                self.remove(&collection, &key).map(|removed| {
                    if removed {
                        Response::KeyRemoved { collection, key }
                    } else {
                        Response::KeyNotRemoved { collection, key }
                    }
                })
            }
            Command::Drop { collection } => self
                .drop_collection(&collection)
                .map(|_| Response::Dropped { collection }),
        };

        outcome.unwrap_or_else(|e| {
            tracing::warn!("'{}' failed: {}", name, e);
            Response::failure(&e)
        })
    }

    /// Insert or overwrite `key` in `collection`
    ///
    /// Creates the collection file if needed. The snapshot is rewritten
    /// unconditionally.
    pub fn upsert(&self, collection: &str, key: &str, value: &str) -> Result<()> {
        let path = self.collection_path(collection)?;
        let lock = self.registry.lock_for(collection);
        let _guard = lock.lock();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        let mut snapshot = self.read_snapshot(collection, &mut file)?;
        snapshot.upsert(key, value);
        storage::persist(&snapshot, &mut file, self.config.sync_writes)?;

        tracing::debug!("set {}/{} ({} elements)", collection, key, snapshot.len());
        Ok(())
    }

    /// Get the value of `key` in `collection`
    ///
    /// Returns `Ok(None)` if the key or the whole collection is absent.
    pub fn lookup(&self, collection: &str, key: &str) -> Result<Option<String>> {
        let path = self.collection_path(collection)?;
        let lock = self.registry.lock_for(collection);
        let _guard = lock.lock();

        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot = self.read_snapshot(collection, &mut file)?;
        Ok(snapshot.find(key).map(str::to_string))
    }

    /// Remove `key` from `collection`
    ///
    /// The snapshot is rewritten only if something was removed. Returns
    /// whether a removal happened.
    pub fn remove(&self, collection: &str, key: &str) -> Result<bool> {
        let path = self.collection_path(collection)?;
        let lock = self.registry.lock_for(collection);
        let _guard = lock.lock();

        let mut file = match OpenOptions::new().read(true).write(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let mut snapshot = self.read_snapshot(collection, &mut file)?;
        if !snapshot.remove(key) {
            return Ok(false);
        }
        storage::persist(&snapshot, &mut file, self.config.sync_writes)?;

        tracing::debug!("delete {}/{} ({} elements)", collection, key, snapshot.len());
        Ok(true)
    }

    /// Delete the snapshot file of `collection`
    ///
    /// Dropping a collection that does not exist is not an error; returns
    /// whether a file was actually deleted. The registry keeps the lock.
    pub fn drop_collection(&self, collection: &str) -> Result<bool> {
        let path = self.collection_path(collection)?;
        let lock = self.registry.lock_for(collection);
        let _guard = lock.lock();

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("drop {}", collection);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the current snapshot of `collection` under its lock
    ///
    /// An absent collection comes back empty.
    pub fn load(&self, collection: &str) -> Result<Collection> {
        let path = self.collection_path(collection)?;
        let lock = self.registry.lock_for(collection);
        let _guard = lock.lock();

        match File::open(&path) {
            Ok(mut file) => self.read_snapshot(collection, &mut file),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Collection::empty(collection)),
            Err(e) => Err(e.into()),
        }
    }

    /// Snapshot file path for `collection`
    ///
    /// Rejects names that would escape the data directory.
    pub fn collection_path(&self, collection: &str) -> Result<PathBuf> {
        let unsafe_name = collection.is_empty()
            || collection == "."
            || collection == ".."
            || collection.contains(['/', '\\', '\0']);

        if unsafe_name {
            return Err(CollError::InvalidName(collection.to_string()));
        }

        Ok(self
            .config
            .data_dir
            .join(format!("{}.{}", collection, self.config.file_extension)))
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the lock registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Read and decode the whole file, applying the corrupt-file policy
    ///
    /// Must be called with the collection lock held.
    fn read_snapshot(&self, collection: &str, file: &mut File) -> Result<Collection> {
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        // Freshly created file
        if bytes.is_empty() {
            return Ok(Collection::empty(collection));
        }

        let mut snapshot = match storage::try_decode(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => match self.config.corrupt_policy {
                CorruptPolicy::Recover => {
                    tracing::warn!(
                        "Collection '{}' is unreadable, starting empty: {}",
                        collection,
                        e
                    );
                    Collection::empty(collection)
                }
                CorruptPolicy::Fail => return Err(e),
            },
        };

        snapshot.name = collection.to_string();
        Ok(snapshot)
    }
}
