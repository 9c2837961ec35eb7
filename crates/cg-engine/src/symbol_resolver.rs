//! The Symbol Resolver: maps an identifier or member-access expression from
//! a visited function body to its declaration, with advisory memoization.

use std::path::Path;
use std::sync::Arc;

use cg_graph::{Declaration, ProviderError, SourcePos, TypeProvider};
use dashmap::DashMap;
use parking_lot::Mutex;

/// Bound on import/re-export alias unwrapping, preventing pathological
/// import chains from recursing forever.
const MAX_ALIAS_HOPS: u8 = 8;

#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Memoizes `resolve-identifier`/`resolve-member-access` results keyed by
/// (file, starting byte offset). The cache is advisory: a miss never
/// produces a wrong answer, only slower re-resolution.
///
/// Invalidation is wholesale per file: an epoch counter is bumped whenever
/// the owning file's content hash changes, and every memo entry is tagged
/// with the epoch it was computed under, so stale entries are ignored
/// without having to rehash or sweep the whole map.
pub struct SymbolResolver {
    memo: DashMap<(Arc<Path>, u32), (u64, Option<Declaration>)>,
    epochs: DashMap<Arc<Path>, u64>,
    hashes: Mutex<rustc_hash::FxHashMap<Arc<Path>, [u8; 32]>>,
}

impl Default for SymbolResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolResolver {
    pub fn new() -> Self {
        Self {
            memo: DashMap::new(),
            epochs: DashMap::new(),
            hashes: Mutex::new(rustc_hash::FxHashMap::default()),
        }
    }

    fn epoch_for(&self, file: &Arc<Path>) -> u64 {
        *self.epochs.entry(file.clone()).or_insert(0)
    }

    /// Call before resolving against `file` each time a fresh content hash is
    /// available; bumps the epoch (invalidating all memo entries for that
    /// file) if the hash changed since the last call.
    pub fn observe_content_hash(&self, file: &Arc<Path>, hash: [u8; 32]) {
        let mut hashes = self.hashes.lock();
        let changed = hashes.get(file) != Some(&hash);
        if changed {
            hashes.insert(file.clone(), hash);
            *self.epochs.entry(file.clone()).or_insert(0) += 1;
        }
    }

    /// Resolves an identifier expression, unwrapping import/re-export aliases
    /// up to [`MAX_ALIAS_HOPS`] times and stopping at namespace imports.
    pub fn resolve_identifier(
        &self,
        provider: &mut dyn TypeProvider,
        file: &Arc<Path>,
        pos: SourcePos,
    ) -> Result<Option<Declaration>, ResolverError> {
        let key = (file.clone(), pos.byte_offset);
        let epoch = self.epoch_for(file);
        if let Some(entry) = self.memo.get(&key) {
            if entry.0 == epoch {
                return Ok(entry.1.clone());
            }
        }

        let mut current = provider.resolve_identifier(file, pos)?;
        let mut hops = 0u8;
        while hops < MAX_ALIAS_HOPS {
            let Some(decl) = &current else { break };
            // A local binding whose initializer is already a function-like
            // expression, or a plain function declaration, is a terminal
            // resolution; only re-exports/import aliases recurse further.
            // The provider surfaces those as a declaration whose position
            // differs from the reference itself, so a fixed point here means
            // we have reached the underlying callable.
            let next = provider.resolve_identifier(&decl.file, decl.pos)?;
            match next {
                Some(ref next_decl) if next_decl.pos != decl.pos || next_decl.file != decl.file => {
                    current = next;
                    hops += 1;
                }
                _ => break,
            }
        }

        self.memo.insert(key, (epoch, current.clone()));
        Ok(current)
    }

    /// Resolves a member-access expression (`obj.prop`) against the
    /// receiver's static type.
    pub fn resolve_member_access(
        &self,
        provider: &mut dyn TypeProvider,
        file: &Arc<Path>,
        pos: SourcePos,
    ) -> Result<Option<Declaration>, ResolverError> {
        let key = (file.clone(), pos.byte_offset);
        let epoch = self.epoch_for(file);
        if let Some(entry) = self.memo.get(&key) {
            if entry.0 == epoch {
                return Ok(entry.1.clone());
            }
        }
        let resolved = provider.resolve_member_access(file, pos)?;
        self.memo.insert(key, (epoch, resolved.clone()));
        Ok(resolved)
    }

    /// Fully-qualified name of a declaration, per the node-id scheme — always
    /// delegated to [`cg_graph::NodeId`]'s constructors rather than formatted
    /// independently, closing the node-id-scheme ambiguity.
    pub fn fully_qualified_name(declaration: &Declaration) -> cg_graph::NodeId {
        crate::builder::node_id_for_declaration(declaration)
    }
}
