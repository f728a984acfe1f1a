//! JSON Pointer and URI utilities for OpenAPI `$ref` resolution.
//!
//! Pointers follow RFC 6901 with the `~0`/`~1` escapes and are written in
//! fragment form throughout the workspace: the document root is `#`, and
//! `#/paths/~1users/get` names the `get` operation under `/users`.
//!
//! URI handling mirrors the rest of the ecosystem: `file://` URIs and
//! workspace-relative paths are both accepted, and every resolved URI is
//! canonicalized (dot segments removed, slashes normalized, Windows drive
//! letters lowercased) so the same file always compares equal.

use url::Url;

/// Root pointer of a document.
pub const ROOT_POINTER: &str = "#";

/// Escape one pointer token per RFC 6901: `~` → `~0`, `/` → `~1`.
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Unescape one pointer token per RFC 6901.
pub fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Split a pointer into unescaped segments.
///
/// Accepts `#`, `#/a/b`, `/a/b`, and the empty string; the root forms all
/// yield an empty segment list.
pub fn split_pointer(ptr: &str) -> Vec<String> {
    let body = ptr.strip_prefix('#').unwrap_or(ptr);
    let body = body.strip_prefix('/').unwrap_or(body);
    if body.is_empty() {
        return Vec::new();
    }
    body.split('/').map(unescape_token).collect()
}

/// Join unescaped segments into a canonical fragment pointer (`#/a/b`, or
/// `#` for no segments).
pub fn join_pointer<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::from(ROOT_POINTER);
    for seg in segments {
        out.push('/');
        out.push_str(&escape_token(seg.as_ref()));
    }
    out
}

/// Append one segment to a canonical pointer.
pub fn child_pointer(ptr: &str, token: &str) -> String {
    if ptr == ROOT_POINTER || ptr.is_empty() {
        format!("#/{}", escape_token(token))
    } else {
        format!("{}/{}", ptr, escape_token(token))
    }
}

/// Append an array index to a canonical pointer.
pub fn index_pointer(ptr: &str, index: usize) -> String {
    if ptr == ROOT_POINTER || ptr.is_empty() {
        format!("#/{index}")
    } else {
        format!("{ptr}/{index}")
    }
}

/// The parent of a canonical pointer, or `None` at the root.
pub fn parent_pointer(ptr: &str) -> Option<&str> {
    if ptr == ROOT_POINTER || ptr.is_empty() {
        return None;
    }
    match ptr.rfind('/') {
        Some(0) | None => Some(ROOT_POINTER),
        Some(i) if i == 1 && ptr.starts_with("#/") => Some(ROOT_POINTER),
        Some(i) => Some(&ptr[..i]),
    }
}

/// The last (unescaped) segment of a pointer, or `None` at the root.
pub fn last_segment(ptr: &str) -> Option<String> {
    if ptr == ROOT_POINTER || ptr.is_empty() {
        return None;
    }
    ptr.rsplit('/').next().map(unescape_token)
}

/// Combined `uri#pointer` key used by the graph and index maps.
pub fn node_key(uri: &str, pointer: &str) -> String {
    format!("{uri}{pointer}")
}

/// A resolved `$ref` target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedTarget {
    /// Canonical URI of the target document.
    pub uri: String,
    /// Canonical fragment pointer within the target (`#` when absent).
    pub pointer: String,
    /// True for `http(s)://` targets, which local traversal skips.
    pub external: bool,
}

/// Resolve a `$ref` string against the URI of the document containing it.
///
/// - `#/...` stays in the same document;
/// - `http://` / `https://` targets are returned verbatim and flagged external;
/// - anything else is a relative file reference resolved against the
///   directory of `from_uri`, preserving any fragment.
pub fn resolve_ref(from_uri: &str, ref_string: &str) -> ResolvedTarget {
    if let Some(fragment) = ref_string.strip_prefix('#') {
        return ResolvedTarget {
            uri: uri_key(from_uri),
            pointer: canonical_fragment(fragment),
            external: false,
        };
    }
    if ref_string.starts_with("http://") || ref_string.starts_with("https://") {
        let (doc, fragment) = split_fragment(ref_string);
        return ResolvedTarget {
            uri: doc.to_string(),
            pointer: canonical_fragment(fragment),
            external: true,
        };
    }
    let (path_part, fragment) = split_fragment(ref_string);
    ResolvedTarget {
        uri: resolve_relative(from_uri, path_part),
        pointer: canonical_fragment(fragment),
        external: false,
    }
}

fn split_fragment(ref_string: &str) -> (&str, &str) {
    match ref_string.find('#') {
        Some(i) => (&ref_string[..i], &ref_string[i + 1..]),
        None => (ref_string, ""),
    }
}

fn canonical_fragment(fragment: &str) -> String {
    if fragment.is_empty() {
        ROOT_POINTER.to_string()
    } else if fragment.starts_with('/') {
        format!("#{fragment}")
    } else {
        format!("#/{fragment}")
    }
}

/// Resolve `relative` against the directory of `from_uri` and canonicalize.
fn resolve_relative(from_uri: &str, relative: &str) -> String {
    if let Ok(base) = Url::parse(from_uri) {
        if let Ok(joined) = base.join(relative) {
            return uri_key(joined.as_str());
        }
    }
    // Workspace-relative fallback: plain path arithmetic.
    let dir = match from_uri.rfind('/') {
        Some(i) => &from_uri[..i],
        None => "",
    };
    let combined = if dir.is_empty() {
        relative.to_string()
    } else {
        format!("{dir}/{relative}")
    };
    normalize_path(&combined)
}

/// Collapse `.` and `..` segments and duplicate slashes.
fn normalize_path(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if out.last().is_some_and(|s| *s != "..") {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    let joined = out.join("/");
    if path.starts_with('/') { format!("/{joined}") } else { joined }
}

/// Normalize a URI to a consistent lookup key.
///
/// Valid URLs are re-serialized with safe percent-decoding of the path;
/// Windows drive letters are lowercased; non-URL inputs are treated as
/// workspace-relative paths and slash-normalized.
pub fn uri_key(uri: &str) -> String {
    if let Ok(u) = Url::parse(uri) {
        let s = u.as_str().to_string();
        if let Some(rest) = s.strip_prefix("file:///") {
            if rest.len() > 1
                && rest.as_bytes()[1] == b':'
                && rest.as_bytes()[0].is_ascii_alphabetic()
            {
                return format!("file:///{}{}", rest[0..1].to_ascii_lowercase(), &rest[1..]);
            }
        }
        return s;
    }
    normalize_path(uri)
}

/// Check if a URI uses the `file://` scheme.
pub fn is_file_uri(uri: &str) -> bool {
    uri.starts_with("file://")
}

/// Check if a URI points outside the local workspace (`http(s)://`).
pub fn is_external_uri(uri: &str) -> bool {
    uri.starts_with("http://") || uri.starts_with("https://")
}

/// Extract the file extension of a URI or path, if any.
pub fn uri_extension(uri: &str) -> Option<&str> {
    let last = uri.rsplit('/').next()?;
    let last = last.split('?').next()?;
    let last = last.split('#').next()?;
    let dot = last.rfind('.')?;
    let ext = &last[dot + 1..];
    if ext.is_empty() { None } else { Some(ext) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_roundtrip() {
        assert_eq!(escape_token("/users/{id}"), "~1users~1{id}");
        assert_eq!(escape_token("a~b"), "a~0b");
        assert_eq!(unescape_token(&escape_token("/a~/b")), "/a~/b");
    }

    #[test]
    fn test_split_pointer_forms() {
        assert_eq!(split_pointer("#"), Vec::<String>::new());
        assert_eq!(split_pointer(""), Vec::<String>::new());
        assert_eq!(split_pointer("#/paths/~1users/get"), vec!["paths", "/users", "get"]);
        assert_eq!(split_pointer("/components/schemas/User"), vec![
            "components", "schemas", "User"
        ]);
    }

    #[test]
    fn test_join_pointer_canonical() {
        assert_eq!(join_pointer(Vec::<&str>::new()), "#");
        assert_eq!(join_pointer(["paths", "/users", "get"]), "#/paths/~1users/get");
    }

    #[test]
    fn test_child_and_index_pointer() {
        assert_eq!(child_pointer("#", "paths"), "#/paths");
        assert_eq!(child_pointer("#/paths", "/users"), "#/paths/~1users");
        assert_eq!(index_pointer("#/servers", 0), "#/servers/0");
    }

    #[test]
    fn test_parent_and_last() {
        assert_eq!(parent_pointer("#"), None);
        assert_eq!(parent_pointer("#/paths"), Some("#"));
        assert_eq!(parent_pointer("#/paths/~1users/get"), Some("#/paths/~1users"));
        assert_eq!(last_segment("#/paths/~1users"), Some("/users".to_string()));
        assert_eq!(last_segment("#"), None);
    }

    #[test]
    fn test_resolve_same_document() {
        let target = resolve_ref("file:///spec/api.yaml", "#/components/schemas/User");
        assert_eq!(target.uri, "file:///spec/api.yaml");
        assert_eq!(target.pointer, "#/components/schemas/User");
        assert!(!target.external);
    }

    #[test]
    fn test_resolve_relative_file() {
        let target = resolve_ref("file:///spec/api.yaml", "./schemas/user.yaml#/User");
        assert_eq!(target.uri, "file:///spec/schemas/user.yaml");
        assert_eq!(target.pointer, "#/User");
        assert!(!target.external);
    }

    #[test]
    fn test_resolve_parent_directory() {
        let target = resolve_ref("file:///spec/paths/users.yaml", "../common.yaml#/Error");
        assert_eq!(target.uri, "file:///spec/common.yaml");
        assert_eq!(target.pointer, "#/Error");
    }

    #[test]
    fn test_resolve_external() {
        let target = resolve_ref("file:///spec/api.yaml", "https://example.com/pet.json#/Pet");
        assert!(target.external);
        assert_eq!(target.uri, "https://example.com/pet.json");
        assert_eq!(target.pointer, "#/Pet");
    }

    #[test]
    fn test_resolve_without_fragment() {
        let target = resolve_ref("file:///spec/api.yaml", "user.yaml");
        assert_eq!(target.uri, "file:///spec/user.yaml");
        assert_eq!(target.pointer, "#");
    }

    #[test]
    fn test_resolve_workspace_relative_base() {
        let target = resolve_ref("specs/api.yaml", "./fragments/user.yaml#/User");
        assert_eq!(target.uri, "specs/fragments/user.yaml");
        assert_eq!(target.pointer, "#/User");
    }

    #[test]
    fn test_uri_key_drive_letter() {
        assert_eq!(uri_key("file:///C:/api/spec.yaml"), "file:///c:/api/spec.yaml");
    }

    #[test]
    fn test_uri_key_same_file_compares_equal() {
        let a = resolve_ref("file:///spec/a.yaml", "./b.yaml").uri;
        let b = resolve_ref("file:///spec/sub/../b.yaml", "#").uri;
        assert_eq!(a, b);
    }

    #[test]
    fn test_uri_extension() {
        assert_eq!(uri_extension("file:///spec/api.yaml"), Some("yaml"));
        assert_eq!(uri_extension("api.jsonc"), Some("jsonc"));
        assert_eq!(uri_extension("file:///spec/api"), None);
    }

    #[test]
    fn test_node_key() {
        assert_eq!(node_key("a.yaml", "#/paths"), "a.yaml#/paths");
    }
}
