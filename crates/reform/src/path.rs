//! Field path addressing over a JSON value tree.
//!
//! Paths are dotted (`address.city`) and may use brackets for indices
//! (`items[0].name`, equivalent to `items.0.name`). A segment made of a
//! canonical non-negative integer is an index; anything else is a key.

use serde_json::{Map, Value};
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

pub type Segments = SmallVec<[Segment; 4]>;

fn is_index(s: &str) -> bool {
    match s.as_bytes() {
        [b'0'] => true,
        [b'1'..=b'9', rest @ ..] => rest.iter().all(u8::is_ascii_digit),
        _ => false,
    }
}

fn segment(s: &str) -> Segment {
    if is_index(s)
        && let Ok(i) = s.parse::<usize>()
    {
        return Segment::Index(i);
    }
    Segment::Key(s.to_owned())
}

pub fn parse(path: &str) -> Segments {
    let mut out = Segments::new();
    for part in path.split('.') {
        let head_end = part.find('[').unwrap_or(part.len());
        let (head, mut rest) = part.split_at(head_end);
        if !head.is_empty() || rest.is_empty() {
            out.push(segment(head));
        }
        while !rest.is_empty() {
            let Some(inner) = rest.strip_prefix('[') else {
                // trailing text after a bracket, kept literally
                out.push(Segment::Key(rest.to_owned()));
                break;
            };
            match inner.find(']') {
                Some(close) => {
                    out.push(segment(inner[..close].trim_matches(['"', '\''])));
                    rest = &inner[close + 1..];
                }
                None => {
                    out.push(Segment::Key(rest.to_owned()));
                    break;
                }
            }
        }
    }
    out
}

/// Segment-wise prefix relation: equal paths, ancestors and descendants all
/// overlap.
pub fn overlaps(a: &str, b: &str) -> bool {
    let (a, b) = (parse(a), parse(b));
    let n = a.len().min(b.len());
    a[..n] == b[..n]
}

/// `key` lies strictly below `parent` in dotted notation.
pub fn is_strict_descendant(parent: &str, key: &str) -> bool {
    key.strip_prefix(parent).is_some_and(|rest| rest.starts_with('.'))
}

fn step<'a>(node: &'a Value, seg: &Segment) -> Option<&'a Value> {
    match (node, seg) {
        (Value::Object(map), Segment::Key(k)) => map.get(k),
        (Value::Object(map), Segment::Index(i)) => map.get(&i.to_string()),
        (Value::Array(items), Segment::Index(i)) => items.get(*i),
        _ => None,
    }
}

fn step_mut<'a>(node: &'a mut Value, seg: &Segment) -> Option<&'a mut Value> {
    match (node, seg) {
        (Value::Object(map), Segment::Key(k)) => map.get_mut(k),
        (Value::Object(map), Segment::Index(i)) => map.get_mut(&i.to_string()),
        (Value::Array(items), Segment::Index(i)) => items.get_mut(*i),
        _ => None,
    }
}

fn is_container(v: &Value) -> bool {
    v.is_object() || v.is_array()
}

fn empty_container(index_next: bool) -> Value {
    if index_next {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

/// Highest index [`set`] accepts. Paths with a larger index are rejected
/// before anything is written, rather than allocating the gap.
pub const MAX_INDEX: usize = 1 << 16;

// Slot `i`, padding the array with `null` when it is short. `i <= MAX_INDEX`.
fn slot(items: &mut Vec<Value>, i: usize) -> &mut Value {
    if i >= items.len() {
        items.resize(i + 1, Value::Null);
    }
    &mut items[i]
}

// Child for writing; scalars in the way are replaced by a fresh container.
fn child_for_write<'a>(
    node: &'a mut Value,
    seg: &Segment,
    index_next: bool,
) -> Option<&'a mut Value> {
    let child = match (node, seg) {
        (Value::Object(map), Segment::Key(k)) => map
            .entry(k.clone())
            .or_insert_with(|| empty_container(index_next)),
        (Value::Object(map), Segment::Index(i)) => map
            .entry(i.to_string())
            .or_insert_with(|| empty_container(index_next)),
        (Value::Array(items), Segment::Index(i)) => slot(items, *i),
        _ => return None,
    };
    if !is_container(child) {
        *child = empty_container(index_next);
    }
    Some(child)
}

pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    parse(path).iter().try_fold(root, step)
}

/// Write `value` at `path`, creating intermediate containers (arrays when the
/// following segment is an index). Returns `false` if the path cannot be
/// represented, e.g. a string key into an array or an index past
/// [`MAX_INDEX`].
pub fn set(root: &mut Value, path: &str, value: Value) -> bool {
    let segs = parse(path);
    let Some((last, parents)) = segs.split_last() else {
        return false;
    };
    if let Some(seg) = segs
        .iter()
        .find(|seg| matches!(seg, Segment::Index(i) if *i > MAX_INDEX))
    {
        log::warn!("set: {seg:?} in '{path}' is past index {MAX_INDEX}");
        return false;
    }

    let mut node = root;
    for (i, seg) in parents.iter().enumerate() {
        let index_next = matches!(segs[i + 1], Segment::Index(_));
        let Some(child) = child_for_write(node, seg, index_next) else {
            log::warn!("set: cannot descend into '{path}' at {seg:?}");
            return false;
        };
        node = child;
    }

    match (node, last) {
        (Value::Object(map), Segment::Key(k)) => {
            map.insert(k.clone(), value);
        }
        (Value::Object(map), Segment::Index(i)) => {
            map.insert(i.to_string(), value);
        }
        (Value::Array(items), Segment::Index(i)) => {
            *slot(items, *i) = value;
        }
        (_, seg) => {
            log::warn!("set: cannot write '{path}' at {seg:?}");
            return false;
        }
    }
    true
}

/// Remove the value at `path`. Array slots are cleared to `null` so sibling
/// indices stay stable. Returns whether anything was removed.
pub fn unset(root: &mut Value, path: &str) -> bool {
    let segs = parse(path);
    let Some((last, parents)) = segs.split_last() else {
        return false;
    };

    let mut node = root;
    for seg in parents {
        match step_mut(node, seg) {
            Some(child) => node = child,
            None => return false,
        }
    }

    match (node, last) {
        (Value::Object(map), Segment::Key(k)) => map.remove(k).is_some(),
        (Value::Object(map), Segment::Index(i)) => map.remove(&i.to_string()).is_some(),
        (Value::Array(items), Segment::Index(i)) => match items.get_mut(*i) {
            Some(slot) => !std::mem::replace(slot, Value::Null).is_null(),
            None => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_dots_and_brackets() {
        assert_eq!(
            parse("items[2].name").to_vec(),
            vec![
                Segment::Key("items".into()),
                Segment::Index(2),
                Segment::Key("name".into())
            ]
        );
        assert_eq!(parse("items.2.name"), parse("items[2].name"));
        assert_eq!(
            parse("a['b']").to_vec(),
            vec![Segment::Key("a".into()), Segment::Key("b".into())]
        );
        // not canonical indices
        assert_eq!(parse("007").to_vec(), vec![Segment::Key("007".into())]);
        assert_eq!(parse("+1").to_vec(), vec![Segment::Key("+1".into())]);
    }

    #[test]
    fn test_get() {
        let root = json!({"user": {"emails": ["a@x", "b@x"], "0": "zero"}});
        assert_eq!(get(&root, "user.emails[1]"), Some(&json!("b@x")));
        assert_eq!(get(&root, "user.0"), Some(&json!("zero")));
        assert_eq!(get(&root, "user.missing.deeper"), None);
        assert_eq!(get(&root, "user.emails.first"), None);
    }

    #[test]
    fn test_set_creates_containers() {
        let mut root = json!({});
        assert!(set(&mut root, "address.city", json!("Oslo")));
        assert!(set(&mut root, "phones[1].number", json!("123")));
        assert_eq!(
            root,
            json!({
                "address": {"city": "Oslo"},
                "phones": [null, {"number": "123"}]
            })
        );
    }

    #[test]
    fn test_set_replaces_scalar_parent() {
        let mut root = json!({"a": 5});
        assert!(set(&mut root, "a.b", json!(true)));
        assert_eq!(root, json!({"a": {"b": true}}));
    }

    #[test]
    fn test_set_rejects_key_into_array() {
        let mut root = json!({"list": [1, 2]});
        assert!(!set(&mut root, "list.name", json!("x")));
        assert_eq!(root, json!({"list": [1, 2]}));
    }

    #[test]
    fn test_set_rejects_indices_past_limit() {
        let mut root = json!({"list": [1]});
        assert!(!set(&mut root, "list.18446744073709551615", json!(1)));
        assert!(!set(&mut root, "list[3000000000]", json!(1)));
        assert!(!set(&mut root, "list.18446744073709551615.name", json!(1)));
        // nothing is created on the way to a rejected index
        assert!(!set(&mut root, "fresh[3000000000].name", json!(1)));
        assert_eq!(root, json!({"list": [1]}));

        assert!(set(&mut root, &format!("list.{MAX_INDEX}"), json!(2)));
        assert_eq!(root["list"].as_array().map(Vec::len), Some(MAX_INDEX + 1));
    }

    #[test]
    fn test_unset() {
        let mut root = json!({"a": {"b": 1, "c": 2}, "list": [1, 2, 3]});
        assert!(unset(&mut root, "a.b"));
        assert!(!unset(&mut root, "a.b"));
        assert!(unset(&mut root, "list[1]"));
        assert!(!unset(&mut root, "nope.deeper"));
        assert_eq!(root, json!({"a": {"c": 2}, "list": [1, null, 3]}));
    }

    #[test]
    fn test_overlaps() {
        assert!(overlaps("a", "a"));
        assert!(overlaps("a", "a.b"));
        assert!(overlaps("a.b[0]", "a"));
        assert!(overlaps("items[0]", "items.0.name"));
        assert!(!overlaps("a.b", "a.c"));
        assert!(!overlaps("ab", "a"));
    }

    #[test]
    fn test_is_strict_descendant() {
        assert!(is_strict_descendant("a", "a.b"));
        assert!(is_strict_descendant("a.b", "a.b.c"));
        assert!(!is_strict_descendant("a", "a"));
        assert!(!is_strict_descendant("a", "ab.c"));
    }
}
