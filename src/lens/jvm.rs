//! JVM bean lenses (Hibernate-annotated Java and Scala).

use crate::field::{Field, FieldError, FieldType, Lens, TypeTable};
use crate::text::TextExt;

const JVM_TYPES: TypeTable = &[
    (FieldType::Int, "Integer"),
    (FieldType::Serial, "Integer"),
    (FieldType::Dec, "Float"),
    (FieldType::Float, "Float"),
    (FieldType::Double, "Float"),
    (FieldType::Txt, "String"),
    (FieldType::Str, "String"),
    (FieldType::Bool, "Boolean"),
    (FieldType::Date, "Date"),
    (FieldType::Time, "Time"),
    (FieldType::Interval, "Duration"),
];

fn typeclass<L: Lens>(field: &Field<L>) -> Result<&'static str, FieldError> {
    field.physical(field.base_type()?)
}

/// Getter and setter pair shared by both JVM lenses.
fn accessors<L: Lens>(field: &Field<L>) -> Result<String, FieldError> {
    let fieldname = field.name();
    let camelcase = fieldname.under_to_mixed();
    let classname = fieldname.classname();
    let ty = field.type_name()?;

    let lines = [
        format!("public {ty} get{classname}() {{"),
        format!("    return this.{camelcase};"),
        "}".to_string(),
        "\n".to_string(),
        format!("public void set{classname}({ty} {fieldname}) {{"),
        format!("    this.{camelcase} = {fieldname};"),
        "}".to_string(),
        "\n".to_string(),
    ];
    Ok(lines.join("\n    "))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Java;

impl Lens for Java {
    const NAME: &'static str = "Java";
    const TYPES: TypeTable = JVM_TYPES;

    fn definition(field: &Field<Self>) -> Result<String, FieldError> {
        let fieldname = field.name();
        let mut args = Vec::new();

        if field.is_pk() {
            args.push("@Id".to_string());
            args.push("@GeneratedValue(strategy = GenerationType.IDENTITY)".to_string());
        } else if field.is_fk() {
            args.push("@ManyToOne(cascade = CascadeType.ALL)".to_string());
            args.push(format!("@JoinColumn(name = \"{fieldname}\")"));
        } else {
            args.push(format!("@Column(name=\"{fieldname}\")"));
        }

        args.push(format!(
            "private {} {};",
            typeclass(field)?,
            fieldname.under_to_mixed()
        ));
        args.push("\n".to_string());
        Ok(args.join("\n    "))
    }

    fn method(field: &Field<Self>) -> Result<String, FieldError> {
        accessors(field)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scala;

impl Lens for Scala {
    const NAME: &'static str = "Scala";
    const TYPES: TypeTable = JVM_TYPES;

    fn definition(field: &Field<Self>) -> Result<String, FieldError> {
        let fieldname = field.name();
        let camelcase = fieldname.under_to_mixed();
        let typeclass = typeclass(field)?;
        let mut args = Vec::new();

        if field.is_pk() {
            args.push("@Id".to_string());
            args.push("@GeneratedValue(strategy = GenerationType.IDENTITY)".to_string());
            args.push("@BeanProperty".to_string());
            args.push(format!("var {fieldname}: {typeclass} = _"));
        } else if field.is_fk() {
            args.push("@ManyToOne(cascade = CascadeType.ALL)".to_string());
            args.push(format!("@JoinColumn(name = \"{fieldname}\")"));
            args.push(format!("var {camelcase}: {typeclass} = {fieldname}"));
        } else {
            args.push("@BeanProperty".to_string());
            args.push(format!("var {camelcase}: {typeclass} = {fieldname}"));
        }

        args.push("\n".to_string());
        Ok(args.join("\n    "))
    }

    fn method(field: &Field<Self>) -> Result<String, FieldError> {
        accessors(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::field::{FieldSpec, IndexRole};

    #[test]
    fn test_java_definition() {
        let pk = Field::<Java>::new(
            FieldSpec::new("id", FieldType::Int).with_index(IndexRole::Pk),
            Options::default(),
        );
        assert_eq!(
            pk.definition().unwrap(),
            "@Id\n    @GeneratedValue(strategy = GenerationType.IDENTITY)\n    private Integer id;\n    \n"
        );

        let column = Field::<Java>::new(FieldSpec::new("first_name", FieldType::Str), Options::default());
        assert!(column.definition().unwrap().contains("private String firstName;"));
    }

    #[test]
    fn test_java_accessors() {
        let field = Field::<Java>::new(FieldSpec::new("first_name", FieldType::Str), Options::default());
        let method = field.method().unwrap();
        assert!(method.starts_with("public String getFirstName() {"));
        assert!(method.contains("public void setFirstName(String first_name) {"));
        assert!(method.contains("this.firstName = first_name;"));
    }

    #[test]
    fn test_numeric_is_unmapped() {
        let field = Field::<Java>::new(FieldSpec::new("amount", FieldType::Numeric), Options::default());
        assert!(matches!(field.definition(), Err(FieldError::Unmapped { .. })));
    }

    #[test]
    fn test_scala_fk() {
        let field = Field::<Scala>::new(
            FieldSpec::new("owner_id", FieldType::Int).with_index(IndexRole::Fk),
            Options::default(),
        );
        assert!(field.definition().unwrap().contains("var ownerId: Integer = owner_id"));
    }
}
