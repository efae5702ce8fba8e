//! Python lenses: SQLAlchemy declarative columns, Django model fields and
//! factory_boy declarations.

use super::py_bool;
use crate::field::{Field, FieldError, FieldType, Lens, TypeTable};
use crate::text::TextExt;

fn nullable<L: Lens>(field: &Field<L>) -> &'static str {
    py_bool(!field.required().is_some_and(|r| r != 0))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlAlchemy;

impl SqlAlchemy {
    fn fk_args(field: &Field<Self>, target: &str) -> String {
        let mut args = vec![format!("\"{target}.id\"")];
        if field.constraint().contains("on delete cascade") {
            args.push("ondelete='CASCADE'".to_string());
        }
        if field.constraint().contains("on update cascade") {
            args.push("onupdate='CASCADE'".to_string());
        }
        args.join(", ")
    }

    fn relationship(field: &Field<Self>, target: &str) -> String {
        let backref = field.model_name().plural();
        format!(
            "    {target} = relationship(\"{}\", backref=\"{backref}\")",
            target.classname()
        )
    }
}

impl Lens for SqlAlchemy {
    const NAME: &'static str = "SqlAlchemy";
    const TYPES: TypeTable = &[
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
        (FieldType::Interval, "Interval"),
    ];

    fn definition(field: &Field<Self>) -> Result<String, FieldError> {
        let name = field.name();
        let ftype = field.base_type()?;
        let mut typeclass = field.physical(ftype)?.to_string();
        let target = name.strip_id();
        let mut args = Vec::new();
        let mut relationship = None;

        if field.is_pk() {
            args.push("nullable=False".to_string());
            args.push("primary_key=True".to_string());
        } else if field.is_fk() {
            args.push(format!("ForeignKey({})", Self::fk_args(field, &target)));
            args.push(format!("nullable={}", nullable(field)));
            relationship = Some(Self::relationship(field, &target));
        } else if field.is_pfk() {
            args.push(format!("ForeignKey({})", Self::fk_args(field, &target)));
            args.push("nullable=False".to_string());
            args.push("primary_key=True".to_string());
            relationship = Some(Self::relationship(field, &target));
        } else {
            args.push(format!("nullable={}", nullable(field)));
            if field.is_enum() {
                typeclass = name.to_uppercase();
            }
            if let Some(default) = field.default() {
                args.push(format!("default=\"{default}\""));
            }
            if !field.description().is_empty() {
                args.push(format!("doc=\"{}\"", field.description()));
            }
        }

        if let (FieldType::Str, Some(length)) = (ftype, field.length()) {
            typeclass = format!("String({length})");
        }

        let definition = format!("{name} = Column({typeclass}, {})", args.join(", "));
        Ok(match relationship {
            Some(rel) => format!("{definition}\n{rel}"),
            None => definition,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Django;

impl Lens for Django {
    const NAME: &'static str = "Django";
    const TYPES: TypeTable = &[
        (FieldType::Int, "IntegerField"),
        (FieldType::Serial, "IntegerField"),
        (FieldType::Dec, "FloatField"),
        (FieldType::Float, "FloatField"),
        (FieldType::Double, "FloatField"),
        (FieldType::Txt, "TextField"),
        (FieldType::Str, "CharField"),
        (FieldType::Bool, "BooleanField"),
        (FieldType::Date, "DateField"),
        (FieldType::Time, "TimeField"),
        (FieldType::Interval, "DurationField"),
    ];

    fn definition(field: &Field<Self>) -> Result<String, FieldError> {
        let ftype = field.base_type()?;
        let mut typeclass = field.physical(ftype)?;
        let mut fieldname = field.name();
        let mut args = Vec::new();

        if field.is_pk() {
            args.push("blank=False".to_string());
            args.push("null=False".to_string());
            args.push("primary_key=True".to_string());
        } else {
            let optional = py_bool(!field.is_required());
            args.push(format!("blank={optional}"));
            args.push(format!("null={optional}"));

            if field.is_fk() {
                let refers_to = if field.is_self_referential() {
                    args.push("related_name=\"children\"".to_string());
                    "self".to_string()
                } else {
                    // PersonId -> Person
                    let classname = fieldname.classname();
                    let keep = classname.chars().count().saturating_sub(2);
                    classname.chars().take(keep).collect()
                };
                fieldname = fieldname.strip_id();
                typeclass = "ForeignKey";
                args.insert(0, format!("\"{refers_to}\""));
                args.push("on_delete=models.CASCADE".to_string());
            } else {
                if field.is_enum() {
                    args.push(format!("choices={}", fieldname.to_uppercase()));
                }
                if let Some(default) = field.default() {
                    args.push(format!("default=\"{default}\""));
                }
                if !field.description().is_empty() {
                    args.push(format!("help_text=\"{}\"", field.description()));
                }
            }
        }

        if ftype == FieldType::Str {
            match field.length() {
                Some(length) => args.push(format!("max_length={length}")),
                None => typeclass = field.physical(FieldType::Txt)?,
            }
        }

        Ok(format!(
            "{fieldname} = models.{typeclass}({})",
            args.join(", ")
        ))
    }
}

/// Field names that map onto a dedicated faker provider.
const FAKER_PROVIDERS: &[(&str, &str)] = &[
    ("address", "address"),
    ("boolean", "boolean"),
    ("building_number", "building_number"),
    ("catch_phrase", "catch_phrase"),
    ("city", "city"),
    ("location", "city"),
    ("color", "color_name"),
    ("company", "company"),
    ("company_email", "company_email"),
    ("country", "country"),
    ("country_code", "country_code"),
    ("credit_card_number", "credit_card_number"),
    ("currency_code", "currency_code"),
    ("date", "date"),
    ("date_time", "date_time"),
    ("day_of_month", "day_of_month"),
    ("day_of_week", "day_of_week"),
    ("domain_name", "domain_name"),
    ("email", "email"),
    ("file_name", "file_name"),
    ("file_path", "file_path"),
    ("first_name", "first_name"),
    ("hex_color", "hex_color"),
    ("image_url", "image_url"),
    ("ipv4", "ipv4"),
    ("ipv6", "ipv6"),
    ("isbn13", "isbn13"),
    ("job", "job"),
    ("language_code", "language_code"),
    ("last_name", "last_name"),
    ("latitude", "latitude"),
    ("license_plate", "license_plate"),
    ("locale", "locale"),
    ("longitude", "longitude"),
    ("mac_address", "mac_address"),
    ("md5", "md5"),
    ("mime_type", "mime_type"),
    ("month", "month"),
    ("month_name", "month_name"),
    ("name", "name"),
    ("paragraph", "paragraph"),
    ("password", "password"),
    ("phone_number", "phone_number"),
    ("postcode", "postcode"),
    ("prefix", "prefix"),
    ("sentence", "sentence"),
    ("sha256", "sha256"),
    ("slug", "slug"),
    ("ssn", "ssn"),
    ("state", "state"),
    ("street_address", "street_address"),
    ("street_name", "street_name"),
    ("suffix", "suffix"),
    ("text", "text"),
    ("time", "time"),
    ("timezone", "timezone"),
    ("url", "url"),
    ("user_agent", "user_agent"),
    ("user_name", "user_name"),
    ("uuid4", "uuid4"),
    ("word", "word"),
    ("year", "year"),
    ("zipcode", "zipcode"),
];

fn faker_provider(name: &str) -> Option<&'static str> {
    FAKER_PROVIDERS
        .iter()
        .find_map(|(key, provider)| (*key == name).then_some(*provider))
}

/// factory_boy declarations for test fixtures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactoryBoy;

impl Lens for FactoryBoy {
    const NAME: &'static str = "FactoryBoy";
    const TYPES: TypeTable = &[
        (FieldType::Int, "pyint"),
        (FieldType::Serial, "pyint"),
        (FieldType::Dec, "pyfloat"),
        (FieldType::Float, "pyfloat"),
        (FieldType::Double, "pyfloat"),
        (FieldType::Txt, "text"),
        (FieldType::Str, "pystr"),
        (FieldType::Bool, "pybool"),
        (FieldType::Date, "date"),
        (FieldType::Time, "time"),
        (FieldType::Interval, "time_delta"),
    ];

    fn definition(field: &Field<Self>) -> Result<String, FieldError> {
        let ftype = field.base_type()?;
        let mut provider = field.physical(ftype)?;
        let mut name = field.name();

        let declaration = if field.is_pk() && matches!(ftype, FieldType::Int | FieldType::Serial) {
            "factory.Sequence(lambda n: n)".to_string()
        } else if field.is_fk() {
            name = name.strip_id();
            let model = field.model();
            match model.filter(|m| name == "parent" && m.has_app_model_properties()) {
                Some(model) => format!(
                    "factory.SubFactory('{}.factories.{}Factory')",
                    model.properties["app"],
                    model.name.classname()
                ),
                None => format!("factory.SubFactory({}Factory)", name.classname()),
            }
        } else if field.is_enum() {
            format!("factory.Iterator(model.{})", name.to_uppercase())
        } else {
            if let Some(named) = faker_provider(&name) {
                provider = named;
            }
            format!("factory.Faker('{provider}')")
        };

        Ok(format!("{name} = {declaration}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::field::{FieldSpec, IndexRole};
    use crate::model::Model;

    fn field<L: Lens>(spec: FieldSpec) -> Field<L> {
        Field::new(spec, Options::default())
    }

    #[test]
    fn test_sqlalchemy_columns() {
        let model = Model::<SqlAlchemy>::new(
            "vehicle",
            vec![
                field(FieldSpec::new("id", FieldType::Serial).with_index(IndexRole::Pk)),
                field(
                    FieldSpec::new("person_id", FieldType::Int)
                        .with_index(IndexRole::Fk)
                        .with_constraint("on delete cascade"),
                ),
                field(FieldSpec::new("brand", FieldType::Str).with_length(30).required()),
            ],
        );
        let defs: Vec<String> = model.fields().iter().map(|f| f.definition().unwrap()).collect();
        assert_eq!(defs[0], "id = Column(Integer, nullable=False, primary_key=True)");
        assert_eq!(
            defs[1],
            "person_id = Column(Integer, ForeignKey(\"person.id\", ondelete='CASCADE'), nullable=True)\n    person = relationship(\"Person\", backref=\"vehicles\")"
        );
        assert_eq!(defs[2], "brand = Column(String(30), nullable=False)");
    }

    #[test]
    fn test_django_fields() {
        let fk = field::<Django>(FieldSpec::new("person_id", FieldType::Int).with_index(IndexRole::Fk));
        assert_eq!(
            fk.definition().unwrap(),
            "person = models.ForeignKey(\"Person\", blank=True, null=True, on_delete=models.CASCADE)"
        );

        let parent = field::<Django>(FieldSpec::new("parent_id", FieldType::Int).with_index(IndexRole::Fk));
        assert_eq!(
            parent.definition().unwrap(),
            "parent = models.ForeignKey(\"self\", blank=True, null=True, related_name=\"children\", on_delete=models.CASCADE)"
        );

        let color = field::<Django>(
            FieldSpec::new("color", FieldType::Str)
                .with_length(10)
                .required()
                .with_constraint("enum"),
        );
        assert_eq!(
            color.definition().unwrap(),
            "color = models.CharField(blank=False, null=False, choices=COLOR, max_length=10)"
        );
    }

    #[test]
    fn test_factory_declarations() {
        let pk = field::<FactoryBoy>(FieldSpec::new("id", FieldType::Int).with_index(IndexRole::Pk));
        assert_eq!(pk.definition().unwrap(), "id = factory.Sequence(lambda n: n)");

        let email = field::<FactoryBoy>(FieldSpec::new("email", FieldType::Str));
        assert_eq!(email.definition().unwrap(), "email = factory.Faker('email')");

        let location = field::<FactoryBoy>(FieldSpec::new("location", FieldType::Str));
        assert_eq!(location.definition().unwrap(), "location = factory.Faker('city')");

        let owner = field::<FactoryBoy>(FieldSpec::new("owner_id", FieldType::Int).with_index(IndexRole::Fk));
        assert_eq!(owner.definition().unwrap(), "owner = factory.SubFactory(OwnerFactory)");
    }
}
