use crate::config::NOPREFIX;
use crate::field::{Field, FieldError, FieldType, Lens, TypeTable};
use crate::text::TextExt;

/// Haskell record fields in the postgresql-orm style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Haskell;

impl Lens for Haskell {
    const NAME: &'static str = "Haskell";
    const TYPES: TypeTable = &[
        (FieldType::Str, "String"),
        (FieldType::Txt, "String"),
        (FieldType::Date, "Date"),
        (FieldType::Time, "POSIXTime"),
        (FieldType::Interval, "DiffTime"),
        (FieldType::Bool, "Bool"),
        (FieldType::Int, "Int"),
        (FieldType::Serial, "Int"),
        (FieldType::Dec, "Double"),
        (FieldType::Float, "Double"),
        (FieldType::Double, "Double"),
        (FieldType::Numeric, "Double"),
    ];

    /// `modelFieldName`, or `fieldName` when the action is `noprefix`.
    fn name(field: &Field<Self>) -> String {
        if field.action() == NOPREFIX {
            field.fname().under_to_mixed()
        } else {
            format!("{}_{}", field.model_name(), field.fname()).under_to_mixed()
        }
    }

    fn required_qualifier(_field: &Field<Self>) -> Option<String> {
        Some("Maybe".to_string())
    }

    fn definition(field: &Field<Self>) -> Result<String, FieldError> {
        let name = field.name();
        let mut ty = if field.is_pk() {
            "DBKey".to_string()
        } else if field.is_enum() {
            field.fname().classname()
        } else {
            field.type_name()?
        };
        if !field.is_required() {
            if let Some(qualifier) = field.required_qualifier() {
                ty = format!("{qualifier} {ty}");
            }
        }
        let pad = 30_usize.saturating_sub(name.len() + 1);
        Ok(format!("{name}{}:: {ty}", " ".repeat(pad)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::field::{FieldSpec, IndexRole};
    use crate::model::Model;

    #[test]
    fn test_haskell_record_fields() {
        let model = Model::<Haskell>::new(
            "person",
            vec![
                Field::new(
                    FieldSpec::new("id", FieldType::Serial).with_index(IndexRole::Pk).required(),
                    Options::default(),
                ),
                Field::new(FieldSpec::new("first_name", FieldType::Str), Options::default()),
                Field::new(
                    FieldSpec::new("age", FieldType::Int).required().with_action("noprefix"),
                    Options::default(),
                ),
            ],
        );
        let defs: Vec<String> = model.fields().iter().map(|f| f.definition().unwrap()).collect();
        assert_eq!(defs[0], format!("personId{}:: DBKey", " ".repeat(21)));
        assert_eq!(
            defs[1],
            format!("personFirstName{}:: Maybe String", " ".repeat(14))
        );
        assert_eq!(defs[2], format!("age{}:: Int", " ".repeat(26)));
    }

    #[test]
    fn test_haskell_enum_uses_classname() {
        let field = Field::<Haskell>::new(
            FieldSpec::new("eye_color", FieldType::Str).required().with_constraint("enum"),
            Options::default(),
        );
        assert!(field.definition().unwrap().ends_with(":: EyeColor"));
    }
}
