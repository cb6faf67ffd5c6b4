//! StateStore - versioned, encrypted, partitioned client-held state.
//!
//! The server keeps no session. Everything a page needs between requests
//! lives in this store, which travels to the client as an opaque token and
//! comes back on the next request.
//!
//! ## Example
//!
//! ```ignore
//! let mut store = StateStore::page(protector.clone());
//! store.load(request_token);
//! let mut state: TableState = store.get_or_create("Table", "people", TableState::new)?;
//! state.toggle_sort("Name");
//! store.set("Table", "people", &state)?;
//! if store.is_dirty() {
//!     respond_with(store.encrypted()?);
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::StateError;
use super::protector::DataProtector;

/// Reserved partition holding the version counter.
pub const META_PARTITION: &str = "__meta";
const VERSION_KEY: &str = "version";

/// Key-derivation purpose of the page-scoped store.
pub const PAGE_STATE_PURPOSE: &str = "PageState";
/// Key-derivation purpose of the global store.
pub const GLOBAL_STATE_PURPOSE: &str = "GlobalState";

type Partitions = BTreeMap<String, BTreeMap<String, String>>;

/// What `load` did with the incoming token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No token (or a blank one): started empty.
    Empty,
    /// Token decrypted and parsed.
    Restored,
    /// Token was present but unreadable: started empty.
    Reset,
}

pub struct StateStore {
    purpose: String,
    protector: Arc<dyn DataProtector>,
    partitions: Partitions,
    loaded_version: u64,
}

impl StateStore {
    pub fn new(protector: Arc<dyn DataProtector>, purpose: impl Into<String>) -> Self {
        Self {
            purpose: purpose.into(),
            protector,
            partitions: empty_partitions(),
            loaded_version: 0,
        }
    }

    /// Page-scoped store.
    pub fn page(protector: Arc<dyn DataProtector>) -> Self {
        Self::new(protector, PAGE_STATE_PURPOSE)
    }

    /// Store shared across pages.
    pub fn global(protector: Arc<dyn DataProtector>) -> Self {
        Self::new(protector, GLOBAL_STATE_PURPOSE)
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    /// Hydrate from a client token.
    ///
    /// A blank token, or one that fails to decrypt or parse, leaves the store
    /// empty at version 0. Unreadable tokens are not an error; the outcome
    /// tells the caller which case applied.
    pub fn load(&mut self, token: Option<&str>) -> LoadOutcome {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        let outcome = match token {
            None => {
                self.partitions = empty_partitions();
                LoadOutcome::Empty
            }
            Some(token) => match self.decode(token) {
                Ok(partitions) => {
                    self.partitions = partitions;
                    LoadOutcome::Restored
                }
                Err(reason) => {
                    tracing::warn!(purpose = %self.purpose, %reason, "discarding unreadable state token");
                    self.partitions = empty_partitions();
                    LoadOutcome::Reset
                }
            },
        };
        self.loaded_version = self.version();
        outcome
    }

    fn decode(&self, token: &str) -> Result<Partitions, String> {
        let sealed = URL_SAFE_NO_PAD.decode(token).map_err(|e| e.to_string())?;
        let bytes = self
            .protector
            .unprotect(&self.purpose, &sealed)
            .map_err(|e| e.to_string())?;
        let mut partitions: Partitions =
            bitcode::deserialize(&bytes).map_err(|e| e.to_string())?;
        partitions.entry(META_PARTITION.to_string()).or_default();
        Ok(partitions)
    }

    /// Serialize the full store, including the version counter.
    pub fn export(&self) -> Result<Vec<u8>, StateError> {
        bitcode::serialize(&self.partitions).map_err(|e| StateError::Encode(e.to_string()))
    }

    /// The encrypted, URL-safe token for the current content.
    pub fn encrypted(&self) -> Result<String, StateError> {
        let bytes = self.export()?;
        let sealed = self.protector.protect(&self.purpose, &bytes)?;
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    pub fn version(&self) -> u64 {
        self.partitions
            .get(META_PARTITION)
            .and_then(|meta| meta.get(VERSION_KEY))
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    pub fn loaded_version(&self) -> u64 {
        self.loaded_version
    }

    /// True when content changed since `load`.
    pub fn is_dirty(&self) -> bool {
        self.loaded_version != self.version()
    }

    fn bump(&mut self) {
        let next = self.version() + 1;
        self.partitions
            .entry(META_PARTITION.to_string())
            .or_default()
            .insert(VERSION_KEY.to_string(), next.to_string());
    }

    /// Read a value. A missing key yields `None`.
    pub fn get<T: DeserializeOwned>(&self, partition: &str, key: &str) -> Result<Option<T>, StateError> {
        let Some(raw) = self.partitions.get(partition).and_then(|p| p.get(key)) else {
            return Ok(None);
        };
        serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| serde_error(partition, key, e))
    }

    /// Read a value, falling back to the type's default when missing.
    pub fn get_or_default<T: DeserializeOwned + Default>(
        &self,
        partition: &str,
        key: &str,
    ) -> Result<T, StateError> {
        Ok(self.get(partition, key)?.unwrap_or_default())
    }

    /// Return the stored value, or create, store and return a new one.
    /// Only creation bumps the version.
    pub fn get_or_create<T, F>(&mut self, partition: &str, key: &str, factory: F) -> Result<T, StateError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(existing) = self.get(partition, key)? {
            return Ok(existing);
        }
        let value = factory();
        self.set(partition, key, &value)?;
        Ok(value)
    }

    /// Store a value. Always bumps the version.
    pub fn set<T: Serialize + ?Sized>(&mut self, partition: &str, key: &str, value: &T) -> Result<(), StateError> {
        ensure_writable(partition)?;
        let raw = serde_json::to_string(value).map_err(|e| serde_error(partition, key, e))?;
        self.partitions
            .entry(partition.to_string())
            .or_default()
            .insert(key.to_string(), raw);
        self.bump();
        Ok(())
    }

    /// Remove one key. Bumps the version only if it existed.
    pub fn clear_key(&mut self, partition: &str, key: &str) -> Result<bool, StateError> {
        ensure_writable(partition)?;
        let removed = match self.partitions.get_mut(partition) {
            Some(entries) => {
                let removed = entries.remove(key).is_some();
                if entries.is_empty() {
                    self.partitions.remove(partition);
                }
                removed
            }
            None => false,
        };
        if removed {
            self.bump();
        }
        Ok(removed)
    }

    /// Remove a whole partition. Bumps the version only if it held anything.
    pub fn clear_partition(&mut self, partition: &str) -> Result<bool, StateError> {
        ensure_writable(partition)?;
        let removed = self
            .partitions
            .remove(partition)
            .is_some_and(|entries| !entries.is_empty());
        if removed {
            self.bump();
        }
        Ok(removed)
    }

    pub fn contains(&self, partition: &str, key: &str) -> bool {
        self.partitions
            .get(partition)
            .is_some_and(|entries| entries.contains_key(key))
    }
}

fn empty_partitions() -> Partitions {
    let mut meta = BTreeMap::new();
    meta.insert(VERSION_KEY.to_string(), "0".to_string());
    let mut partitions = BTreeMap::new();
    partitions.insert(META_PARTITION.to_string(), meta);
    partitions
}

fn ensure_writable(partition: &str) -> Result<(), StateError> {
    if partition == META_PARTITION {
        return Err(StateError::ReservedPartition(partition.to_string()));
    }
    Ok(())
}

fn serde_error(partition: &str, key: &str, err: serde_json::Error) -> StateError {
    StateError::Serde {
        partition: partition.to_string(),
        key: key.to_string(),
        message: err.to_string(),
    }
}
