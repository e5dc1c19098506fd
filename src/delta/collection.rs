use std::collections::HashSet;

use uuid::Uuid;

use super::Patch;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemPatch<P> {
    pub id: Uuid,
    pub patch: P,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeltaRequest<N, P> {
    pub add: Vec<N>,
    pub remove: Vec<Uuid>,
    pub update: Vec<ItemPatch<P>>,
}

impl<N, P> Default for DeltaRequest<N, P> {
    fn default() -> Self {
        Self {
            add: vec![],
            remove: vec![],
            update: vec![],
        }
    }
}

impl<N, P> DeltaRequest<N, P> {
    /// Positions in `update` whose identifier is also removed, or was already
    /// updated by an earlier entry of the same request.
    pub fn conflicting_updates(&self) -> Vec<usize> {
        let removed: HashSet<Uuid> = self.remove.iter().copied().collect();
        let mut seen: HashSet<Uuid> = HashSet::new();
        let mut conflicts: Vec<usize> = vec![];
        for (idx, item) in self.update.iter().enumerate() {
            if removed.contains(&item.id) || !seen.insert(item.id) {
                conflicts.push(idx);
            }
        }
        conflicts
    }
}

/// A collection field as accepted from the client, resolved once at the
/// validation boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CollectionUpdate<N, P> {
    FullReplace(Vec<N>),
    Delta(DeltaRequest<N, P>),
}

/// `replace_all` asks the store to drop every row of the collection inside
/// the write transaction, whatever was loaded beforehand; `deletes` then only
/// records the rows known at read time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionDelta<N, P> {
    pub creates: Vec<N>,
    pub deletes: Vec<Uuid>,
    pub updates: Vec<ItemPatch<P>>,
    pub replace_all: bool,
}

impl<N, P> Default for CollectionDelta<N, P> {
    fn default() -> Self {
        Self {
            creates: vec![],
            deletes: vec![],
            updates: vec![],
            replace_all: false,
        }
    }
}

impl<N, P> CollectionDelta<N, P> {
    pub fn is_empty(&self) -> bool {
        !self.replace_all
            && self.creates.is_empty()
            && self.deletes.is_empty()
            && self.updates.is_empty()
    }
}

/// Canonical delta for one collection field.
///
/// `existing` holds the identifiers currently loaded for the collection; a
/// full replacement clears the whole collection and recreates every given
/// item. A
/// targeted delta only touches what it names: repeated removals collapse and
/// updates that change nothing are dropped. Ownership of the referenced
/// identifiers is not checked here, the store scopes every statement to the
/// profile.
pub fn normalize<N, P: Patch>(
    update: CollectionUpdate<N, P>,
    existing: &[Uuid],
) -> CollectionDelta<N, P> {
    match update {
        CollectionUpdate::FullReplace(items) => CollectionDelta {
            creates: items,
            deletes: existing.to_vec(),
            updates: vec![],
            replace_all: true,
        },
        CollectionUpdate::Delta(delta) => {
            let mut seen: HashSet<Uuid> = HashSet::new();
            let deletes: Vec<Uuid> = delta
                .remove
                .into_iter()
                .filter(|id| seen.insert(*id))
                .collect();
            let updates: Vec<ItemPatch<P>> = delta
                .update
                .into_iter()
                .filter(|x| !x.patch.is_empty())
                .collect();
            CollectionDelta {
                creates: delta.add,
                deletes,
                updates,
                replace_all: false,
            }
        }
    }
}
