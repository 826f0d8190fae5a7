//! Client: the entry point tying a store and a control layer together
//!
//! Operations are spread over the modules that implement them:
//! - [`crate::resolve`]: `fill`, `fill_child`
//! - [`crate::gather`]: `gather_leaves`, `gather_data`
//! - [`crate::snap`]: `snap`, `snap_all`
//! - [`crate::apply`]: `apply`, `apply_default`
//! - [`crate::diff::compare`]: `compare`
//!
//! Public operations log `log_op_start!` / `log_op_end!` and
//! `log_op_error!` on failure. Internals use `tracing::debug!` only.

use crate::config::ClientConfig;
use crate::control_layer::ControlLayer;
use crate::errors::{Result, SnapError};
use crate::model::{Child, Collection, Entry, Root, TagDef};
use crate::store::{EntryStore, Predicate, SearchTerm, SearchValue};
use crate::tolerance::isclose_bounds;
use crate::{log_op_end, log_op_error, log_op_start};

/// Driver for snapshot, restore and comparison
pub struct Client {
    store: Box<dyn EntryStore>,
    control_layer: Box<dyn ControlLayer>,
    config: ClientConfig,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(store: impl EntryStore + 'static, control_layer: impl ControlLayer + 'static) -> Self {
        Self::with_config(store, control_layer, ClientConfig::default())
    }

    pub fn with_config(
        store: impl EntryStore + 'static,
        control_layer: impl ControlLayer + 'static,
        config: ClientConfig,
    ) -> Self {
        Self {
            store: Box::new(store),
            control_layer: Box::new(control_layer),
            config,
        }
    }

    pub fn store(&self) -> &dyn EntryStore {
        self.store.as_ref()
    }

    pub fn control_layer(&self) -> &dyn ControlLayer {
        self.control_layer.as_ref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Top-level collections and snapshots
    pub fn root(&self) -> Root {
        self.store.root()
    }

    pub fn tags(&self) -> TagDef {
        self.store.get_tags()
    }

    /// Search the store for entries matching every term
    ///
    /// `IsClose` terms are expanded into `Gt(lower)` and `Lt(upper)` first.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub fn search(&self, terms: &[SearchTerm]) -> Result<Vec<Entry>> {
        log_op_start!("search", term_count = terms.len());
        let start = std::time::Instant::now();

        let expanded = expand_search_terms(terms);
        let found = self.store.search(&expanded).map_err(|e| {
            log_op_error!(
                "search",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "search",
            duration_ms = start.elapsed().as_millis() as u64,
            result_count = found.len()
        );
        Ok(found)
    }

    /// Save an entry to the store
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub fn save(&self, entry: Entry) -> Result<()> {
        tracing::debug!(entry_id = %entry.id(), kind = %entry.kind(), "saving entry");
        self.store.save_entry(entry)
    }

    /// Remove an entry from the store
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the store does not hold the entry.
    pub fn delete(&self, entry: &Entry) -> Result<()> {
        tracing::debug!(entry_id = %entry.id(), kind = %entry.kind(), "deleting entry");
        self.store.delete_entry(entry)
    }

    /// The collection an entry belongs to
    ///
    /// A collection is its own origin; a snapshot's origin is fetched from the
    /// store when only its identifier is recorded.
    ///
    /// # Errors
    ///
    /// - `NoOriginCollection` if a snapshot records no origin
    /// - `EntryNotFound` if the recorded origin is not in the store
    /// - `TypeMismatch` for leaf entries, or an origin that is not a collection
    pub fn find_origin_collection(&self, entry: &Entry) -> Result<Collection> {
        match entry {
            Entry::Collection(c) => Ok(c.clone()),
            Entry::Snapshot(s) => {
                let origin = match s.origin_collection.as_deref() {
                    None => return Err(SnapError::NoOriginCollection { entry_id: s.id }),
                    Some(Child::Unresolved(id)) => self.store.get_entry(*id)?,
                    Some(Child::Resolved(e)) => e.clone(),
                };
                match origin {
                    Entry::Collection(c) => Ok(c),
                    other => Err(SnapError::TypeMismatch {
                        expected: "Collection".to_string(),
                        found: other.kind().to_string(),
                    }),
                }
            }
            other => Err(SnapError::TypeMismatch {
                expected: "Collection or Snapshot".to_string(),
                found: other.kind().to_string(),
            }),
        }
    }
}

/// Replace each `IsClose` term by its two range terms
pub fn expand_search_terms(terms: &[SearchTerm]) -> Vec<SearchTerm> {
    let mut expanded = Vec::with_capacity(terms.len());
    for term in terms {
        match term.predicate {
            Predicate::IsClose {
                target,
                rel_tol,
                abs_tol,
            } => {
                let (lower, upper) = isclose_bounds(target, rel_tol, abs_tol);
                expanded.push(SearchTerm::new(
                    term.attr.clone(),
                    Predicate::Gt(SearchValue::Number(lower)),
                ));
                expanded.push(SearchTerm::new(
                    term.attr.clone(),
                    Predicate::Lt(SearchValue::Number(upper)),
                ));
            }
            _ => expanded.push(term.clone()),
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_is_close() {
        let terms = [
            SearchTerm::eq("pv_name", "MTR:1"),
            SearchTerm::is_close("data", 10.0, 0.1, 0.5),
        ];
        let expanded = expand_search_terms(&terms);
        assert_eq!(expanded.len(), 3);
        assert_eq!(expanded[0], terms[0]);
        assert_eq!(expanded[1].predicate, Predicate::Gt(SearchValue::Number(8.5)));
        assert_eq!(expanded[2].predicate, Predicate::Lt(SearchValue::Number(11.5)));
    }
}
