//! Property-path resolution over a [`serde_json::Value`] tree.
//!
//! Paths are dotted and bracketed, `a.b[2].c`. A digit-leading segment is
//! a numeric index only inside brackets; anywhere else it makes the
//! remaining path a literal string. A quoted segment is always a literal,
//! never a lookup. Lookup misses are not errors: they resolve to nothing
//! and the caller decides what empty means.

use serde_json::Value;

use crate::error::RenderError;

/// Substituted when an expression resolves to a map node.
pub const MAP_SENTINEL: &str = "<<<map>>>";
/// Substituted when an expression resolves to a sequence node.
pub const SEQ_SENTINEL: &str = "<<<seq>>>";

/// Outcome of walking a path: either a node in the tree or a literal
/// carried by the path itself.
#[derive(Debug)]
pub(crate) enum Resolved<'a> {
    Node(&'a Value),
    Literal(String),
}

/// Walk `path` from `root`. `Ok(None)` is a lookup miss.
pub(crate) fn resolve<'a>(
    root: &'a Value,
    path: &str,
) -> Result<Option<Resolved<'a>>, RenderError> {
    let path = path.trim_matches(' ');
    if path.is_empty() {
        return Ok(None);
    }
    let mut node = root;
    let mut rem = path;
    loop {
        if rem.is_empty() {
            return Ok(Some(Resolved::Node(node)));
        }
        if let Some(inner) = rem.strip_prefix('[') {
            let close = inner.find(']').ok_or_else(|| malformed(path))?;
            let key = inner[..close].trim_matches(' ');
            let mut rest = &inner[close + 1..];
            if let Some(r) = rest.strip_prefix('.') {
                rest = r;
            }
            if let Some(lit) = unquote(key) {
                if !rest.is_empty() {
                    return Err(malformed(path));
                }
                return Ok(Some(Resolved::Literal(lit.to_string())));
            }
            let index: usize = key.parse().map_err(|_| malformed(path))?;
            node = match node {
                Value::Array(items) => match items.get(index) {
                    Some(child) => child,
                    None => return Ok(None),
                },
                Value::Object(map) => match map.values().nth(index) {
                    Some(child) => child,
                    None => return Ok(None),
                },
                _ => return Ok(None),
            };
            rem = rest;
            continue;
        }
        if let Some(lit) = unquote(rem) {
            return Ok(Some(Resolved::Literal(lit.to_string())));
        }
        if rem.starts_with(|c: char| c.is_ascii_digit()) {
            return Ok(Some(Resolved::Literal(rem.to_string())));
        }
        let end = rem.find(['.', '[']).unwrap_or(rem.len());
        let key = &rem[..end];
        if key.is_empty() {
            return Err(malformed(path));
        }
        node = match node {
            Value::Object(map) => match map.get(key) {
                Some(child) => child,
                None => return Ok(None),
            },
            _ => return Ok(None),
        };
        rem = &rem[end..];
        if let Some(r) = rem.strip_prefix('.') {
            rem = r;
        }
    }
}

/// Resolve `path` to output text. Maps and sequences collapse to their
/// sentinels rather than being serialized.
pub(crate) fn eval(root: &Value, path: &str) -> Result<Option<String>, RenderError> {
    Ok(resolve(root, path)?.map(|resolved| match resolved {
        Resolved::Literal(text) => text,
        Resolved::Node(node) => scalar_text(node),
    }))
}

/// The output text of a single node.
pub(crate) fn scalar_text(node: &Value) -> String {
    match node {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Object(_) => MAP_SENTINEL.to_string(),
        Value::Array(_) => SEQ_SENTINEL.to_string(),
    }
}

fn malformed(path: &str) -> RenderError {
    RenderError::MalformedPath {
        path: path.to_string(),
    }
}

fn unquote(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    if s.len() >= 2 {
        let quote = bytes[0];
        if (quote == b'\'' || quote == b'"') && bytes[s.len() - 1] == quote {
            return Some(&s[1..s.len() - 1]);
        }
    }
    None
}
