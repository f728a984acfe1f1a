//! Typed element records and the project index that holds them.

use oas_uri::node_key;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Where an element lives, separating the definition (where the node
/// actually is) from the reference location (where it is used). When no
/// `$ref` indirection exists the two are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementRef {
    /// Definition document.
    pub uri: String,
    /// Definition pointer.
    pub pointer: String,
    /// Document of the use site.
    pub reference_uri: String,
    /// Pointer of the use site.
    pub reference_pointer: String,
}

impl ElementRef {
    /// An element defined where it is used.
    pub fn direct(uri: impl Into<String>, pointer: impl Into<String>) -> Self {
        let uri = uri.into();
        let pointer = pointer.into();
        Self { reference_uri: uri.clone(), reference_pointer: pointer.clone(), uri, pointer }
    }

    /// An element reached through a `$ref`.
    pub fn referenced(
        definition_uri: impl Into<String>,
        definition_pointer: impl Into<String>,
        reference_uri: impl Into<String>,
        reference_pointer: impl Into<String>,
    ) -> Self {
        Self {
            uri: definition_uri.into(),
            pointer: definition_pointer.into(),
            reference_uri: reference_uri.into(),
            reference_pointer: reference_pointer.into(),
        }
    }

    /// `uri#pointer` identity of the definition.
    pub fn key(&self) -> String {
        node_key(&self.uri, &self.pointer)
    }

    /// True when a `$ref` sits between use and definition.
    pub fn is_referenced(&self) -> bool {
        self.uri != self.reference_uri || self.pointer != self.reference_pointer
    }
}

/// Insertion-ordered map keyed by `uri#pointer`.
///
/// Source order is preserved by the walk; duplicate keys (the same
/// definition reached from two roots) keep the first record.
#[derive(Debug, Clone)]
pub struct ElementMap<T> {
    items: Vec<T>,
    by_key: FxHashMap<String, usize>,
}

impl<T> Default for ElementMap<T> {
    fn default() -> Self {
        Self { items: Vec::new(), by_key: FxHashMap::default() }
    }
}

impl<T> ElementMap<T> {
    pub fn insert(&mut self, key: String, item: T) {
        if self.by_key.contains_key(&key) {
            return;
        }
        self.by_key.insert(key, self.items.len());
        self.items.push(item);
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.by_key.get(key).map(|i| &self.items[*i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a ElementMap<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A `paths` entry.
#[derive(Debug, Clone, Serialize)]
pub struct PathRef {
    pub path: String,
    pub element: ElementRef,
}

/// An operation under a path item or webhook.
#[derive(Debug, Clone, Serialize)]
pub struct OperationRef {
    /// Lowercase HTTP method; the definition pointer ends with it.
    pub method: String,
    /// Path string for `paths` operations, `None` for fragments.
    pub path: Option<String>,
    pub operation_id: Option<String>,
    /// Definition key of the owning path item or webhook.
    pub owner_key: String,
    pub is_webhook: bool,
    pub element: ElementRef,
}

/// Which list a parameter was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParameterLevel {
    Path,
    Operation,
    Component,
    Standalone,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterRef {
    pub name: Option<String>,
    /// The `in` field: query, header, path, cookie.
    pub location: Option<String>,
    pub level: ParameterLevel,
    pub element: ElementRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestBodyRef {
    pub element: ElementRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseRef {
    /// Status code key (`"200"`, `"default"`); `None` for fragments.
    pub status: Option<String>,
    pub element: ElementRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaTypeRef {
    pub media_type: String,
    pub element: ElementRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderRef {
    pub name: String,
    pub element: ElementRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExampleRef {
    pub name: Option<String>,
    pub element: ElementRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkRef {
    pub name: Option<String>,
    pub element: ElementRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallbackRef {
    pub name: String,
    pub element: ElementRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookRef {
    pub name: String,
    pub element: ElementRef,
}

/// A schema anywhere: components, inline under media types, nested via
/// `properties`/`items`/compositions.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaRef {
    /// Nesting depth from the schema that started the walk.
    pub depth: usize,
    /// Pointer of the enclosing schema, when nested.
    pub parent_pointer: Option<String>,
    /// Property name when reached through `properties`.
    pub property_name: Option<String>,
    /// True when the parent lists the property in `required`.
    pub required: bool,
    pub element: ElementRef,
}

/// Level of a `security` requirement list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SecurityLevel {
    Root,
    Operation,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityRef {
    pub level: SecurityLevel,
    /// Scheme names listed by this requirement entry.
    pub schemes: Vec<String>,
    pub element: ElementRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecuritySchemeRef {
    pub name: String,
    pub element: ElementRef,
}

/// A `components.<section>.<name>` entry of any section.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentRef {
    pub section: String,
    pub name: String,
    pub element: ElementRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagRef {
    pub name: Option<String>,
    pub element: ElementRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerRef {
    pub url: Option<String>,
    pub element: ElementRef,
}

/// Any node carrying `$ref`.
#[derive(Debug, Clone, Serialize)]
pub struct RefNodeRef {
    pub ref_string: String,
    pub element: ElementRef,
}

/// The typed element maps for a whole workspace.
#[derive(Debug, Clone, Default)]
pub struct ProjectIndex {
    pub paths: ElementMap<PathRef>,
    pub operations: ElementMap<OperationRef>,
    pub parameters: ElementMap<ParameterRef>,
    pub request_bodies: ElementMap<RequestBodyRef>,
    pub responses: ElementMap<ResponseRef>,
    pub media_types: ElementMap<MediaTypeRef>,
    pub headers: ElementMap<HeaderRef>,
    pub examples: ElementMap<ExampleRef>,
    pub links: ElementMap<LinkRef>,
    pub callbacks: ElementMap<CallbackRef>,
    pub webhooks: ElementMap<WebhookRef>,
    pub schemas: ElementMap<SchemaRef>,
    pub security: ElementMap<SecurityRef>,
    pub security_schemes: ElementMap<SecuritySchemeRef>,
    pub components: ElementMap<ComponentRef>,
    pub tags: ElementMap<TagRef>,
    pub servers: ElementMap<ServerRef>,
    pub refs: ElementMap<RefNodeRef>,
    /// Definition key of a path item / webhook → its operations' keys.
    pub(crate) operations_by_owner: FxHashMap<String, Vec<String>>,
}

impl ProjectIndex {
    /// Operations of one path item or webhook, by its definition key.
    pub fn operations_by_owner(&self, owner_key: &str) -> Vec<&OperationRef> {
        self.operations_by_owner
            .get(owner_key)
            .map(|keys| keys.iter().filter_map(|k| self.operations.get(k)).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_ref_direct_equates_locations() {
        let element = ElementRef::direct("a.yaml", "#/paths/~1u");
        assert!(!element.is_referenced());
        assert_eq!(element.key(), "a.yaml#/paths/~1u");
        assert_eq!(element.uri, element.reference_uri);
    }

    #[test]
    fn test_element_ref_referenced() {
        let element = ElementRef::referenced("b.yaml", "#", "a.yaml", "#/paths/~1u");
        assert!(element.is_referenced());
        assert_eq!(element.key(), "b.yaml#");
        assert_eq!(element.reference_pointer, "#/paths/~1u");
    }

    #[test]
    fn test_element_map_preserves_order_and_dedups() {
        let mut map: ElementMap<PathRef> = ElementMap::default();
        for (key, path) in [("k1", "/b"), ("k2", "/a"), ("k1", "/later")] {
            map.insert(key.to_string(), PathRef {
                path: path.to_string(),
                element: ElementRef::direct("a.yaml", key),
            });
        }
        assert_eq!(map.len(), 2);
        let paths: Vec<&str> = map.iter().map(|p| p.path.as_str()).collect();
        // Insertion order, first record wins on duplicate keys.
        assert_eq!(paths, vec!["/b", "/a"]);
        assert!(map.contains("k2"));
        assert!(map.get("k3").is_none());
    }
}
