//! Named key/value enumerations that fields bind to by name.

use crate::text::TextExt;
use crate::value::Value;
use std::fmt;

/// Kind of key an enumeration uses, taken from its first key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumKeyType {
    Str,
    Int,
}

impl EnumKeyType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: String,
    pub data: Vec<(Value, Value)>,
}

impl Enum {
    pub fn new(name: impl Into<String>, data: Vec<(Value, Value)>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn keys(&self) -> Vec<&Value> {
        self.data.iter().map(|(k, _)| k).collect()
    }

    pub fn values(&self) -> Vec<&Value> {
        self.data.iter().map(|(_, v)| v).collect()
    }

    /// Pairs rendered as text, in declaration order.
    pub fn items(&self) -> Vec<(String, String)> {
        self.data
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// `None` for an empty enumeration. Mixed key kinds are not detected.
    pub fn key_type(&self) -> Option<EnumKeyType> {
        match self.data.first().map(|(k, _)| k)? {
            Value::Int(_) | Value::Bool(_) => Some(EnumKeyType::Int),
            _ => Some(EnumKeyType::Str),
        }
    }

    pub fn classname(&self) -> String {
        self.name.classname()
    }
}

impl fmt::Display for Enum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Enum '{}'>", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eye_color() -> Enum {
        Enum::new(
            "eye_color",
            vec![
                ("bl".into(), "blue".into()),
                ("br".into(), "brown".into()),
                ("gr".into(), "green".into()),
            ],
        )
    }

    #[test]
    fn test_keys_and_items() {
        let e = eye_color();
        assert_eq!(e.keys(), vec![&Value::from("bl"), &Value::from("br"), &Value::from("gr")]);
        assert_eq!(e.items()[1], ("br".to_string(), "brown".to_string()));
        assert_eq!(e.classname(), "EyeColor");
        assert_eq!(e.to_string(), "<Enum 'eye_color'>");
    }

    #[test]
    fn test_key_type() {
        assert_eq!(eye_color().key_type(), Some(EnumKeyType::Str));

        let ranks = Enum::new("rank", vec![(Value::Int(1), "low".into()), (Value::Int(2), "high".into())]);
        assert_eq!(ranks.key_type(), Some(EnumKeyType::Int));
        assert_eq!(ranks.key_type().map(EnumKeyType::as_str), Some("int"));

        assert_eq!(Enum::new("empty", Vec::new()).key_type(), None);
    }
}
