//! Placeholder path parsing and lookup.

use serde_json::Value;

/// One step in a path below a step record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Segment {
    Key(String),
    Index(usize),
}

/// Split `a.b[0].c` into segments.
///
/// Returns `None` for empty segments or unterminated indices.
pub(crate) fn parse(path: &str) -> Option<Vec<Segment>> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        let (key, mut rest) = match part.find('[') {
            Some(pos) => part.split_at(pos),
            None => (part, ""),
        };
        if key.is_empty() && rest.is_empty() {
            return None;
        }
        if !key.is_empty() {
            segments.push(Segment::Key(key.to_owned()));
        }
        while !rest.is_empty() {
            let close = rest.find(']')?;
            let index = rest.get(1..close)?.parse().ok()?;
            segments.push(Segment::Index(index));
            rest = &rest[close + 1..];
            if !rest.is_empty() && !rest.starts_with('[') {
                return None;
            }
        }
    }
    Some(segments)
}

/// Follow `segments` from `root`.
///
/// Numeric keys also index into arrays so `items.0` and `items[0]` agree.
pub(crate) fn lookup<'a>(root: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    segments.iter().try_fold(root, |value, segment| match (segment, value) {
        (Segment::Key(key), Value::Object(map)) => map.get(key),
        (Segment::Key(key), Value::Array(items)) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        (Segment::Index(index), Value::Array(items)) => items.get(*index),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::{Segment, lookup, parse};

    #[test]
    fn parses_keys_and_indices() {
        assert_eq!(
            parse("response.items[2][0].id"),
            Some(vec![
                Segment::Key("response".into()),
                Segment::Key("items".into()),
                Segment::Index(2),
                Segment::Index(0),
                Segment::Key("id".into()),
            ])
        );
    }

    #[rstest]
    #[case("a..b")]
    #[case("a[")]
    #[case("a[x]")]
    #[case("a[0]b")]
    #[case("")]
    fn rejects_malformed_paths(#[case] path: &str) {
        assert_eq!(parse(path), None);
    }

    #[rstest]
    #[case("items[1].name", Some(json!("b")))]
    #[case("items.1.name", Some(json!("b")))]
    #[case("items[5]", None)]
    #[case("count.deeper", None)]
    #[case("count", Some(json!(2)))]
    fn looks_up_values(#[case] path: &str, #[case] expected: Option<serde_json::Value>) {
        let root = json!({"count": 2, "items": [{"name": "a"}, {"name": "b"}]});
        let segments = parse(path).expect("valid path");
        assert_eq!(lookup(&root, &segments).cloned(), expected);
    }
}
