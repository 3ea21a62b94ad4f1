use std::collections::HashMap;

use indexmap::IndexSet;
use tracing::warn;

/// Anything that exposes the stable key it was rendered under.
pub trait KeyedElement {
    fn key(&self) -> &str;
}

/// One datum of the incoming data set together with its key and position.
#[derive(Debug, Clone, PartialEq)]
pub struct DataEntry<T> {
    /// Position among the de-duplicated new data.
    pub index: usize,
    pub key: String,
    pub datum: T,
}

/// Keyed enter / update / exit partition of a redraw.
///
/// The three groups are disjoint. `enter` and `update` follow the order of the
/// new data, `exit` the order of the previous elements.
#[derive(Debug)]
pub struct Reconciliation<'p, P, T> {
    pub enter: Vec<DataEntry<T>>,
    pub update: Vec<(&'p P, DataEntry<T>)>,
    pub exit: Vec<&'p P>,
}

impl<P, T> Reconciliation<'_, P, T> {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.enter.is_empty() && self.exit.is_empty()
    }
}

/// Partitions `new_data` against `previous` by key.
///
/// Keys present only in the new data enter, keys present in both update, keys
/// present only in `previous` exit. A key repeated in the new data keeps its
/// first occurrence.
pub fn reconcile<'p, P, T, I, F>(
    previous: impl IntoIterator<Item = &'p P>,
    new_data: I,
    key_fn: F,
) -> Reconciliation<'p, P, T>
where
    P: KeyedElement + 'p,
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> String,
{
    let previous: Vec<&'p P> = previous.into_iter().collect();
    let by_key: HashMap<&str, &'p P> = previous
        .iter()
        .map(|element| (element.key(), *element))
        .collect();

    let mut seen: IndexSet<String> = IndexSet::new();
    let mut enter = Vec::new();
    let mut update = Vec::new();

    for datum in new_data {
        let key = key_fn(&datum);
        if seen.contains(&key) {
            warn!(key = key.as_str(), "duplicate key in new data, keeping first occurrence");
            continue;
        }
        let entry = DataEntry {
            index: seen.len(),
            key: key.clone(),
            datum,
        };
        seen.insert(key);
        match by_key.get(entry.key.as_str()) {
            Some(element) => update.push((*element, entry)),
            None => enter.push(entry),
        }
    }

    let exit = previous
        .into_iter()
        .filter(|element| !seen.contains(element.key()))
        .collect();

    Reconciliation {
        enter,
        update,
        exit,
    }
}
