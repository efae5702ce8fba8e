//! SQL dialect lenses and the SAP ABAP lens built on the same rules.

use crate::field::{Field, FieldError, FieldType, Lens, TypeTable};
use crate::text::{display_width, ljust, rjust, TextExt};
use crate::value::Value;
use regex::Regex;
use std::sync::LazyLock;

const SQL_TYPES: TypeTable = &[
    (FieldType::Str, "varchar({})"),
    (FieldType::Txt, "text"),
    (FieldType::Date, "date"),
    (FieldType::Time, "time"),
    (FieldType::Interval, "interval"),
    (FieldType::Bool, "boolean"),
    (FieldType::Int, "integer"),
    (FieldType::Dec, "float"),
    (FieldType::Float, "float"),
    (FieldType::Double, "double"),
    (FieldType::Numeric, "numeric"),
    (FieldType::Serial, "serial"),
];

/// Constraints copied verbatim into a column definition.
static CONSTRAINT_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"^check\s*\(.+\)",
        r"^unique",
        r"^(on\s(delete|update)\scascade)(\son\s(delete|update)\scascade)?",
    ]
    .map(|pattern| Regex::new(pattern).expect("constraint pattern is valid"))
});

/// Whether the field's constraint is one SQL can carry inline.
pub fn is_valid_constraint<L: Lens>(field: &Field<L>) -> bool {
    let constraint = field.constraint().to_lowercase();
    CONSTRAINT_PATTERNS.iter().any(|re| re.is_match(&constraint))
}

fn quoted_default(default: &Value) -> String {
    match default {
        Value::Str(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}

/// `default <literal>`; numeric zero counts as a default.
fn sql_default<L: Lens>(field: &Field<L>) -> Option<String> {
    let raw = field.raw_default();
    let is_zero = matches!(raw, Value::Int(0)) || matches!(raw, Value::Float(f) if *f == 0.0);
    (is_zero || raw.truthy()).then(|| format!("default {}", quoted_default(raw)))
}

fn sql_definition<L: Lens>(field: &Field<L>) -> Result<String, FieldError> {
    let name = field.name();
    let mut args = vec![name.clone(), field.type_name()?];

    if field.is_pk() {
        args.push("primary key".to_string());
    } else if field.is_fk() || field.is_pfk() {
        let target = if field.is_self_referential() {
            field.model_name()
        } else {
            name.strip_id()
        };
        args.extend(["references".to_string(), target, "(id)".to_string()]);
    } else if let Some(default) = field.default() {
        args.push(default);
    }

    if is_valid_constraint(field) {
        args.push(field.constraint().to_string());
    }

    if field.is_required() {
        if let Some(qualifier) = field.required_qualifier() {
            args.push(qualifier);
        }
    }

    let def = format!("{}{}", args.join(" "), field.comma());
    Ok(with_comment(&def, field.offset(), field.description()))
}

/// Appends `-- description` right-aligned against `offset` columns.
fn with_comment(def: &str, offset: usize, description: &str) -> String {
    if offset == 0 || description.is_empty() {
        return def.to_string();
    }
    let comment = rjust("-- {}", offset.saturating_sub(display_width(def)));
    format!("{def} {}", comment.replacen("{}", description, 1))
}

macro_rules! sql_lens {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl Lens for $name {
            const NAME: &'static str = stringify!($name);
            const TYPES: TypeTable = SQL_TYPES;

            fn default_clause(field: &Field<Self>) -> Option<String> {
                sql_default(field)
            }

            fn required_qualifier(_field: &Field<Self>) -> Option<String> {
                Some("not null".to_string())
            }

            fn definition(field: &Field<Self>) -> Result<String, FieldError> {
                sql_definition(field)
            }
        }
    };
}

sql_lens!(
    /// Generic SQL columns.
    Sql
);
sql_lens!(Postgres);
sql_lens!(Sqlite);

/// Postgres with enum-constrained columns typed by their own enum type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgEnum;

impl Lens for PgEnum {
    const NAME: &'static str = "PgEnum";
    const TYPES: TypeTable = SQL_TYPES;

    fn type_name(field: &Field<Self>) -> Result<String, FieldError> {
        let resolved = field.typecheck()?;
        Ok(if field.is_enum() { field.name() } else { resolved })
    }

    fn default_clause(field: &Field<Self>) -> Option<String> {
        sql_default(field)
    }

    fn required_qualifier(_field: &Field<Self>) -> Option<String> {
        Some("not null".to_string())
    }

    fn definition(field: &Field<Self>) -> Result<String, FieldError> {
        sql_definition(field)
    }
}

/// SAP ABAP structure components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Abap;

impl Lens for Abap {
    const NAME: &'static str = "Abap";
    const TYPES: TypeTable = &[
        (FieldType::Str, "STRING"),
        (FieldType::Txt, "STRING"),
        (FieldType::Date, "D"),
        (FieldType::Time, "T"),
        (FieldType::Interval, "T"),
        (FieldType::Bool, "C"),
        (FieldType::Int, "I"),
        (FieldType::Dec, "F"),
        (FieldType::Float, "F"),
        (FieldType::Double, "F"),
        (FieldType::Numeric, "F"),
        (FieldType::Serial, "serial"),
    ];

    fn comma(field: &Field<Self>) -> &'static str {
        if field.is_last() { "." } else { "," }
    }

    fn default_clause(field: &Field<Self>) -> Option<String> {
        let raw = field.raw_default();
        raw.truthy().then(|| format!("VALUE {}", quoted_default(raw)))
    }

    fn required_qualifier(_field: &Field<Self>) -> Option<String> {
        Some("not null".to_string())
    }

    fn definition(field: &Field<Self>) -> Result<String, FieldError> {
        let mut def = format!("{} {}", ljust(&field.name(), 10), field.type_name()?);
        if let Some(default) = field.default() {
            def = format!("{def} {default}");
        }
        def.push_str(field.comma());
        Ok(format!("{} \" {}", ljust(&def, 30), field.description()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::field::{FieldSpec, IndexRole};
    use crate::model::Model;

    fn no_offset() -> Options {
        Options::default().with_comment_offset(0)
    }

    fn field<L: Lens>(spec: FieldSpec) -> Field<L> {
        Field::new(spec, no_offset())
    }

    #[test]
    fn test_sql_default_quoting() {
        let f = field::<Sql>(FieldSpec::new("kind", FieldType::Str).with_default("car"));
        assert_eq!(f.default().as_deref(), Some("default 'car'"));

        let zero = field::<Sql>(FieldSpec::new("count", FieldType::Int).with_default(0_i64));
        assert_eq!(zero.default().as_deref(), Some("default 0"));

        let none = field::<Sql>(FieldSpec::new("count", FieldType::Int));
        assert_eq!(none.default(), None);
    }

    #[test]
    fn test_constraint_patterns() {
        let check = field::<Sql>(
            FieldSpec::new("age", FieldType::Int).with_constraint("CHECK (age > 0)"),
        );
        assert!(is_valid_constraint(&check));

        let cascade = field::<Sql>(
            FieldSpec::new("a_id", FieldType::Int)
                .with_constraint("on delete cascade on update cascade"),
        );
        assert!(is_valid_constraint(&cascade));

        let enum_marker = field::<Sql>(FieldSpec::new("color", FieldType::Str).with_constraint("enum"));
        assert!(!is_valid_constraint(&enum_marker));
    }

    #[test]
    fn test_sql_definition_shapes() {
        let fk = field::<Sqlite>(
            FieldSpec::new("person_id", FieldType::Int)
                .with_index(IndexRole::Fk)
                .required(),
        );
        assert_eq!(
            fk.definition().unwrap(),
            "person_id integer references person (id) not null,"
        );

        let unique = field::<Sqlite>(
            FieldSpec::new("email", FieldType::Str)
                .with_length(100)
                .with_constraint("unique"),
        );
        assert_eq!(unique.definition().unwrap(), "email varchar(100) unique,");
    }

    #[test]
    fn test_self_referential_uses_model_name() {
        let model = Model::<Sqlite>::new(
            "node",
            vec![
                field(FieldSpec::new("id", FieldType::Serial).with_index(IndexRole::Pk)),
                field(FieldSpec::new("parent_id", FieldType::Int).with_index(IndexRole::Fk)),
            ],
        );
        assert_eq!(
            model.fields()[1].definition().unwrap(),
            "parent_id integer references node (id)"
        );
    }

    #[test]
    fn test_comment_alignment() {
        let f = Field::<Sql>::new(
            FieldSpec::new("id", FieldType::Int).with_description("key"),
            Options::default().with_comment_offset(20),
        );
        assert_eq!(f.definition().unwrap(), "id integer,     -- key");
    }

    #[test]
    fn test_pgenum_type_uses_name() {
        let f = field::<PgEnum>(FieldSpec::new("color", FieldType::Str).with_constraint("enum"));
        assert_eq!(f.type_name().unwrap(), "color");
    }

    #[test]
    fn test_abap_definition() {
        let f = field::<Abap>(
            FieldSpec::new("name", FieldType::Str)
                .with_default("x")
                .with_description("label"),
        );
        let def = f.definition().unwrap();
        assert!(def.starts_with("name       STRING VALUE 'x',"));
        assert!(def.ends_with("\" label"));
    }
}
