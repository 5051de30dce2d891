use ahashmap::AHashSet;
use swc_atoms::Atom;

use crate::classify::{ImportKind, ImportRecord};

/// Keeps the imports whose bindings are referenced, dropping repeats.
///
/// Namespace imports always stay: their uses cannot be enumerated by name.
/// Two records are the same import when they bind the same local name the
/// same way; the first one wins.
pub(crate) fn prune_imports(
    imports: impl IntoIterator<Item = ImportRecord>,
    free_names: &AHashSet<Atom>,
) -> Vec<ImportRecord> {
    let mut seen: AHashSet<(ImportKind, Atom)> = AHashSet::default();
    imports
        .into_iter()
        .filter(|record| {
            record.kind == ImportKind::Namespace || free_names.contains(&record.local)
        })
        .filter(|record| seen.insert((record.kind, record.local.clone())))
        .collect()
}
