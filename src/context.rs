//! Roll data: the read-only actor and item attributes that `@actor.level`-style references
//! resolve against.

use serde_json::{Map, Value};
use std::borrow::Cow;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("unknown roll data path {path:?}")]
pub struct PathError {
    pub path: String,
}

impl PathError {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

/// Splits `items[0].name` into `Key("items"), Index(0), Key("name")`.
fn segments(path: &str) -> Result<Vec<Segment<'_>>, PathError> {
    let mut ret = Vec::new();
    for part in path.split('.') {
        let (key, mut rest) = part.split_at(part.find('[').unwrap_or(part.len()));
        if key.is_empty() && rest.is_empty() {
            return Err(PathError::new(path));
        }
        if !key.is_empty() {
            ret.push(Segment::Key(key));
        }
        while !rest.is_empty() {
            let close = rest.find(']').ok_or_else(|| PathError::new(path))?;
            let index = rest[1..close]
                .parse()
                .map_err(|_| PathError::new(path))?;
            ret.push(Segment::Index(index));
            rest = &rest[close + 1..];
            if !rest.is_empty() && !rest.starts_with('[') {
                return Err(PathError::new(path));
            }
        }
    }
    Ok(ret)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollData {
    root: Map<String, Value>,
}

impl RollData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the entries of a JSON object as the top-level names; anything else yields no names.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(root) => Self { root },
            _ => Self::default(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.root.insert(name.into(), value);
        self
    }

    /// Roll data for a creature document, exposing it as `@actor` along with the computed
    /// `level`, `traits`, `size` and `hardness` fields.
    pub fn for_actor(data: Value) -> Self {
        let mut actor = common_fields(&data);
        let level = data
            .pointer("/system/details/level/value")
            .cloned()
            .unwrap_or(Value::Null);
        let mut traits: Vec<Value> = Vec::new();
        if let Some(Value::Array(values)) = data.pointer("/system/traits/value") {
            for value in values {
                if !traits.contains(value) {
                    traits.push(value.clone());
                }
            }
        }
        let size = data
            .pointer("/system/traits/size/value")
            .cloned()
            .unwrap_or_else(|| Value::from("med"));
        actor.insert("level".to_string(), level);
        actor.insert("traits".to_string(), Value::Array(traits));
        actor.insert("size".to_string(), size);
        Self::new().with("actor", Value::Object(actor))
    }

    /// Roll data for an item document, exposing it as `@item`.
    pub fn for_item(data: Value) -> Self {
        let item = common_fields(&data);
        Self::new().with("item", Value::Object(item))
    }

    pub fn lookup(&self, path: &str) -> Result<&Value, PathError> {
        let mut segments = segments(path)?.into_iter();
        let mut current = match segments.next() {
            Some(Segment::Key(key)) => self.root.get(key),
            _ => None,
        }
        .ok_or_else(|| PathError::new(path))?;

        for segment in segments {
            current = match (current, segment) {
                (Value::Object(map), Segment::Key(key)) => map.get(key),
                (Value::Array(values), Segment::Index(i)) => values.get(i),
                _ => None,
            }
            .ok_or_else(|| PathError::new(path))?;
        }
        Ok(current)
    }

    /// Substitutes an `@path` argument value when the path names a string or number;
    /// any other value is returned untouched.
    pub fn resolve_arg<'s>(&self, value: &'s str) -> Cow<'s, str> {
        let found = value.strip_prefix('@').and_then(|path| self.lookup(path).ok());
        match found {
            Some(Value::String(s)) => Cow::Owned(s.clone()),
            Some(Value::Number(n)) => Cow::Owned(n.to_string()),
            _ => Cow::Borrowed(value),
        }
    }
}

fn common_fields(data: &Value) -> Map<String, Value> {
    let mut fields = match data {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    let hardness = data
        .pointer("/system/attributes/hardness")
        .cloned()
        .unwrap_or_else(|| Value::from(0));
    fields.insert("hardness".to_string(), hardness);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> RollData {
        RollData::new()
            .with("actor", json!({"level": 5, "name": "Goblin", "items": [{"level": 2}]}))
            .with("item", json!({"level": 3, "damageType": "fire"}))
    }

    #[test]
    fn test_lookup() {
        let data = data();
        assert_eq!(data.lookup("actor.level"), Ok(&json!(5)));
        assert_eq!(data.lookup("actor.items[0].level"), Ok(&json!(2)));
        assert_eq!(data.lookup("item.damageType"), Ok(&json!("fire")));
    }

    #[test]
    fn test_lookup_missing() {
        let data = data();
        for path in ["actor.rank", "npc.level", "actor.items[3]", "actor.items[x]", "actor..level", ""] {
            assert_eq!(data.lookup(path), Err(PathError::new(path)), "{}", path);
        }
    }

    #[test]
    fn test_resolve_arg() {
        let data = data();
        assert_eq!(data.resolve_arg("@actor.level"), "5");
        assert_eq!(data.resolve_arg("@item.damageType"), "fire");
        assert_eq!(data.resolve_arg("@self.level"), "@self.level");
        assert_eq!(data.resolve_arg("20"), "20");
    }

    #[test]
    fn test_for_actor() {
        let data = RollData::for_actor(json!({
            "system": {
                "details": {"level": {"value": 4}},
                "traits": {"value": ["goblin", "humanoid", "goblin"]},
                "attributes": {}
            }
        }));
        assert_eq!(data.lookup("actor.level"), Ok(&json!(4)));
        assert_eq!(data.lookup("actor.traits"), Ok(&json!(["goblin", "humanoid"])));
        assert_eq!(data.lookup("actor.size"), Ok(&json!("med")));
        assert_eq!(data.lookup("actor.hardness"), Ok(&json!(0)));
    }

    #[test]
    fn test_for_item() {
        let data = RollData::for_item(json!({"system": {"attributes": {"hardness": 5}}}));
        assert_eq!(data.lookup("item.hardness"), Ok(&json!(5)));
        assert!(data.lookup("actor.level").is_err());
    }
}
