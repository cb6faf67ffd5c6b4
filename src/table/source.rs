use std::sync::{Arc, RwLock};

use super::error::TableError;
use super::query::{DataSource, Query};

/// In-memory data source backed by `Arc<RwLock<Vec<T>>>`.
///
/// Clone-friendly (cloning shares the same underlying rows), so the same
/// source can back a table definition and that table's CRUD closures.
pub struct InMemorySource<T> {
    rows: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for InMemorySource<T> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
        }
    }
}

impl<T> Default for InMemorySource<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> InMemorySource<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    pub fn len(&self) -> Result<usize, TableError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| TableError::Source("lock poisoned during read".into()))?;
        Ok(rows.len())
    }

    pub fn is_empty(&self) -> Result<bool, TableError> {
        Ok(self.len()? == 0)
    }

    pub fn insert(&self, row: T) -> Result<(), TableError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| TableError::Source("lock poisoned during write".into()))?;
        rows.push(row);
        Ok(())
    }

    /// Replace the first row matching `predicate`. Returns false if none matched.
    pub fn replace_where<F>(&self, predicate: F, row: T) -> Result<bool, TableError>
    where
        F: Fn(&T) -> bool,
    {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| TableError::Source("lock poisoned during write".into()))?;
        match rows.iter_mut().find(|r| predicate(r)) {
            Some(slot) => {
                *slot = row;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove every row matching `predicate`. Returns how many were removed.
    pub fn remove_where<F>(&self, predicate: F) -> Result<usize, TableError>
    where
        F: Fn(&T) -> bool,
    {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| TableError::Source("lock poisoned during write".into()))?;
        let before = rows.len();
        rows.retain(|r| !predicate(r));
        Ok(before - rows.len())
    }
}

impl<T: Clone> InMemorySource<T> {
    pub fn find<F>(&self, predicate: F) -> Result<Option<T>, TableError>
    where
        F: Fn(&T) -> bool,
    {
        let rows = self
            .rows
            .read()
            .map_err(|_| TableError::Source("lock poisoned during read".into()))?;
        Ok(rows.iter().find(|r| predicate(r)).cloned())
    }

    pub fn snapshot(&self) -> Result<Vec<T>, TableError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| TableError::Source("lock poisoned during read".into()))?;
        Ok(rows.clone())
    }
}

impl<T: Clone + Send + Sync> DataSource<T> for InMemorySource<T> {
    fn count(&self, query: &Query<T>) -> Result<usize, TableError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| TableError::Source("lock poisoned during count".into()))?;
        Ok(rows.iter().filter(|r| query.matches(r)).count())
    }

    fn fetch(&self, query: &Query<T>, skip: usize, take: usize) -> Result<Vec<T>, TableError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| TableError::Source("lock poisoned during fetch".into()))?;
        let mut matching: Vec<&T> = rows.iter().filter(|r| query.matches(r)).collect();
        // Stable sort: ties keep insertion order, so pages never overlap.
        matching.sort_by(|a, b| query.compare(a, b));
        Ok(matching.into_iter().skip(skip).take(take).cloned().collect())
    }
}
