//! Occurrence index for `operationId` values.

use rustc_hash::FxHashMap;
use serde::Serialize;

/// One `operationId` value node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationIdOccurrence {
    pub uri: String,
    /// Pointer of the `operationId` scalar itself.
    pub pointer: String,
}

/// Maps each operationId to every place it is declared. Uniqueness rules
/// and rename fan out from here.
#[derive(Debug, Clone, Default)]
pub struct OperationIdIndex {
    map: FxHashMap<String, Vec<OperationIdOccurrence>>,
    order: Vec<String>,
}

impl OperationIdIndex {
    /// Record one declaration site. The same node may be reached twice
    /// (standalone fragment walk plus a root's `$ref` walk); identical
    /// occurrences collapse.
    pub fn record(&mut self, name: &str, occurrence: OperationIdOccurrence) {
        match self.map.get_mut(name) {
            Some(existing) => {
                if !existing.contains(&occurrence) {
                    existing.push(occurrence);
                }
            }
            None => {
                self.order.push(name.to_string());
                self.map.insert(name.to_string(), vec![occurrence]);
            }
        }
    }

    pub fn get_occurrences(&self, name: &str) -> &[OperationIdOccurrence] {
        self.map.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Names declared more than once, with their occurrences.
    pub fn duplicates(&self) -> impl Iterator<Item = (&str, &[OperationIdOccurrence])> {
        self.order.iter().filter_map(|name| {
            let occurrences = self.map.get(name)?;
            (occurrences.len() > 1).then_some((name.as_str(), occurrences.as_slice()))
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occ(uri: &str, ptr: &str) -> OperationIdOccurrence {
        OperationIdOccurrence { uri: uri.to_string(), pointer: ptr.to_string() }
    }

    #[test]
    fn test_record_and_lookup() {
        let mut index = OperationIdIndex::default();
        index.record("listUsers", occ("a.yaml", "#/paths/~1u/get/operationId"));
        index.record("listUsers", occ("b.yaml", "#/paths/~1u/get/operationId"));
        index.record("getUser", occ("a.yaml", "#/paths/~1u~1{id}/get/operationId"));

        assert_eq!(index.get_occurrences("listUsers").len(), 2);
        assert_eq!(index.get_occurrences("missing").len(), 0);
        let dups: Vec<_> = index.duplicates().collect();
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].0, "listUsers");
    }
}
