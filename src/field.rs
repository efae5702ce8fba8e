//! Column specifications and the lens trait that renders them per target.

use crate::config::{ACTIONS, METAFIELDS, Options};
use crate::lens::Plain;
use crate::model::ModelInfo;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Field type is not specified: {field}")]
    MissingType { field: String },
    #[error("Unknown field type '{ftype}': {field}")]
    UnknownType { field: String, ftype: String },
    #[error("Unknown index '{index}': {field}")]
    UnknownIndex { field: String, index: String },
    #[error("Field type '{ftype}' has no {lens} mapping: {field}")]
    Unmapped {
        field: String,
        ftype: FieldType,
        lens: &'static str,
    },
    #[error("{lens} fields must implement {what}")]
    NotImplemented {
        lens: &'static str,
        what: &'static str,
    },
}

/// Base field types. Every lens maps these onto its own physical types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Serial,
    Str,
    Txt,
    Date,
    Time,
    Interval,
    Bool,
    Int,
    Dec,
    Float,
    Double,
    Numeric,
}

impl FieldType {
    pub const ALL: [Self; 12] = [
        Self::Serial,
        Self::Str,
        Self::Txt,
        Self::Date,
        Self::Time,
        Self::Interval,
        Self::Bool,
        Self::Int,
        Self::Dec,
        Self::Float,
        Self::Double,
        Self::Numeric,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Serial => "serial",
            Self::Str => "str",
            Self::Txt => "txt",
            Self::Date => "date",
            Self::Time => "time",
            Self::Interval => "interval",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Dec => "dec",
            Self::Float => "float",
            Self::Double => "double",
            Self::Numeric => "numeric",
        }
    }

    pub const fn is_number(self) -> bool {
        matches!(
            self,
            Self::Int | Self::Dec | Self::Float | Self::Double | Self::Numeric
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key role of a field within its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexRole {
    #[default]
    None,
    Pk,
    Fk,
    Pfk,
    Sk,
}

impl IndexRole {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Some(Self::None),
            "pk" => Some(Self::Pk),
            "fk" => Some(Self::Fk),
            "pfk" => Some(Self::Pfk),
            "sk" => Some(Self::Sk),
            _ => None,
        }
    }

    pub const fn as_str(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Pk => Some("pk"),
            Self::Fk => Some("fk"),
            Self::Pfk => Some("pfk"),
            Self::Sk => Some("sk"),
        }
    }
}

/// The ten semantic attributes of a field, in constructor order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldSpec {
    pub name: String,
    pub ftype: Option<FieldType>,
    pub length: Option<u32>,
    pub index: IndexRole,
    pub required: Option<i64>,
    pub default: Value,
    pub constraint: String,
    pub category: String,
    pub action: String,
    pub description: String,
}

impl FieldSpec {
    /// Shorthand for a field with only a name and base type.
    pub fn new(name: impl Into<String>, ftype: FieldType) -> Self {
        Self {
            name: name.into(),
            ftype: Some(ftype),
            ..Self::default()
        }
    }

    /// Builds a spec from a raw ten-cell row as delivered by a reader.
    ///
    /// Empty cells and the literal `None` leave the type unset; the error for
    /// that surfaces only when the type is resolved. Unknown types and index
    /// roles fail here.
    pub fn from_row(row: &[Value; 10]) -> Result<Self, FieldError> {
        let name = text_cell(&row[0]);

        let ftype = match text_cell(&row[1]).trim() {
            "" | "None" => None,
            t => Some(FieldType::from_str(t).ok_or_else(|| FieldError::UnknownType {
                field: name.clone(),
                ftype: t.to_string(),
            })?),
        };

        let index_text = text_cell(&row[3]);
        let index = IndexRole::from_str(&index_text).ok_or_else(|| FieldError::UnknownIndex {
            field: name.clone(),
            index: index_text.clone(),
        })?;

        let required = row[4].as_int();

        let action = text_cell(&row[8]);
        if !action.is_empty() && !ACTIONS.contains(&action.as_str()) {
            log::warn!("{name}: ignoring unknown action '{action}'");
        }

        Ok(Self {
            length: row[2]
                .as_int()
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0),
            ftype,
            index,
            required,
            default: row[5].clone(),
            constraint: text_cell(&row[6]),
            category: text_cell(&row[7]),
            action,
            description: text_cell(&row[9]),
            name,
        })
    }

    /// Builds a spec from named attributes; absent keys are empty cells.
    pub fn from_map(map: &IndexMap<String, Value>) -> Result<Self, FieldError> {
        let row = METAFIELDS.map(|key| map.get(key).cloned().unwrap_or_default());
        Self::from_row(&row)
    }

    /// The spec as a ten-cell row, inverse of [`FieldSpec::from_row`].
    pub fn values(&self) -> [Value; 10] {
        [
            Value::from(self.name.as_str()),
            Value::from(self.ftype.map(FieldType::as_str)),
            Value::from(self.length.map(i64::from)),
            Value::from(self.index.as_str()),
            Value::from(self.required),
            self.default.clone(),
            optional_text(&self.constraint),
            optional_text(&self.category),
            optional_text(&self.action),
            optional_text(&self.description),
        ]
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length).filter(|n| *n > 0);
        self
    }

    pub fn with_index(mut self, index: IndexRole) -> Self {
        self.index = index;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = Some(1);
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = constraint.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

fn text_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn optional_text(text: &str) -> Value {
    if text.is_empty() {
        Value::Null
    } else {
        Value::from(text)
    }
}

/// Physical type per base type. `str` entries may hold a `{}` length slot.
pub type TypeTable = &'static [(FieldType, &'static str)];

/// A target-language view of a field.
///
/// Each lens is a zero-sized marker carrying its own type table and the
/// rendering rules that differ from the defaults below.
pub trait Lens: fmt::Debug + Clone + Copy + Default + 'static {
    const NAME: &'static str;
    const TYPES: TypeTable;

    fn lookup(ftype: FieldType) -> Option<&'static str> {
        Self::TYPES
            .iter()
            .find_map(|(t, physical)| (*t == ftype).then_some(*physical))
    }

    fn name(field: &Field<Self>) -> String {
        field.fname().to_string()
    }

    fn type_name(field: &Field<Self>) -> Result<String, FieldError> {
        field.typecheck()
    }

    fn default_clause(field: &Field<Self>) -> Option<String> {
        let raw = field.raw_default();
        raw.truthy().then(|| raw.to_string())
    }

    fn comma(field: &Field<Self>) -> &'static str {
        if field.is_last() { "" } else { "," }
    }

    fn required_qualifier(_field: &Field<Self>) -> Option<String> {
        None
    }

    fn definition(_field: &Field<Self>) -> Result<String, FieldError> {
        Err(FieldError::NotImplemented {
            lens: Self::NAME,
            what: "definition",
        })
    }

    fn method(_field: &Field<Self>) -> Result<String, FieldError> {
        Err(FieldError::NotImplemented {
            lens: Self::NAME,
            what: "method",
        })
    }
}

/// One column of a model, rendered through lens `L`.
#[derive(Debug, Clone)]
pub struct Field<L: Lens = Plain> {
    spec: FieldSpec,
    model: Weak<ModelInfo>,
    is_last: bool,
    options: Options,
    lens: PhantomData<L>,
}

impl<L: Lens> PartialEq for Field<L> {
    fn eq(&self, other: &Self) -> bool {
        self.spec == other.spec
            && self.is_last == other.is_last
            && self.options == other.options
            && self.model_name() == other.model_name()
    }
}

impl<L: Lens> Field<L> {
    pub fn new(spec: FieldSpec, options: Options) -> Self {
        Self {
            spec,
            model: Weak::new(),
            is_last: false,
            options,
            lens: PhantomData,
        }
    }

    pub(crate) fn link(&mut self, model: &Rc<ModelInfo>, is_last: bool) {
        self.model = Rc::downgrade(model);
        self.is_last = is_last;
    }

    /// Re-creates this field under another lens from its value tuple, keeping
    /// the model link and trailing flag.
    pub fn clone_as<T: Lens>(&self, options: &Options) -> Field<T> {
        let mut field = Field::<T>::new(self.spec.clone(), options.clone());
        field.model = self.model.clone();
        field.is_last = self.is_last;
        field
    }

    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    pub fn values(&self) -> [Value; 10] {
        self.spec.values()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The owning model, if it is still alive.
    pub fn model(&self) -> Option<Rc<ModelInfo>> {
        self.model.upgrade()
    }

    /// `"model"` for fields not yet attached to one.
    pub fn model_name(&self) -> String {
        self.model()
            .map_or_else(|| "model".to_string(), |m| m.name.clone())
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.model_name(), self.spec.name)
    }

    pub const fn is_last(&self) -> bool {
        self.is_last
    }

    /// Name as rendered by the lens.
    pub fn name(&self) -> String {
        L::name(self)
    }

    /// Original name, never transformed by a lens.
    pub fn fname(&self) -> &str {
        &self.spec.name
    }

    pub const fn ftype(&self) -> Option<FieldType> {
        self.spec.ftype
    }

    pub const fn length(&self) -> Option<u32> {
        self.spec.length
    }

    pub const fn index(&self) -> IndexRole {
        self.spec.index
    }

    pub const fn required(&self) -> Option<i64> {
        self.spec.required
    }

    pub fn raw_default(&self) -> &Value {
        &self.spec.default
    }

    pub fn constraint(&self) -> &str {
        &self.spec.constraint
    }

    pub fn category(&self) -> &str {
        &self.spec.category
    }

    pub fn action(&self) -> &str {
        &self.spec.action
    }

    pub fn description(&self) -> &str {
        &self.spec.description
    }

    /// The base type, failing when unset.
    pub fn base_type(&self) -> Result<FieldType, FieldError> {
        self.spec.ftype.ok_or_else(|| FieldError::MissingType {
            field: self.qualified_name(),
        })
    }

    /// Resolves the base type through the lens type table.
    pub fn typecheck(&self) -> Result<String, FieldError> {
        match (self.base_type()?, self.spec.length) {
            (FieldType::Str, Some(length)) => Ok(self
                .physical(FieldType::Str)?
                .replace("{}", &length.to_string())),
            (FieldType::Str, None) => Ok(self.physical(FieldType::Txt)?.to_string()),
            (other, _) => Ok(self.physical(other)?.to_string()),
        }
    }

    /// Raw table entry for `ftype`, without length substitution.
    pub fn physical(&self, ftype: FieldType) -> Result<&'static str, FieldError> {
        L::lookup(ftype).ok_or_else(|| FieldError::Unmapped {
            field: self.qualified_name(),
            ftype,
            lens: L::NAME,
        })
    }

    pub fn type_name(&self) -> Result<String, FieldError> {
        L::type_name(self)
    }

    pub fn default(&self) -> Option<String> {
        L::default_clause(self)
    }

    pub fn comma(&self) -> &'static str {
        L::comma(self)
    }

    pub fn required_qualifier(&self) -> Option<String> {
        L::required_qualifier(self)
    }

    pub fn definition(&self) -> Result<String, FieldError> {
        L::definition(self)
    }

    pub fn method(&self) -> Result<String, FieldError> {
        L::method(self)
    }

    /// Column at which trailing comments are aligned; 0 disables them.
    pub const fn offset(&self) -> usize {
        self.options.comment_offset
    }

    pub fn is_pk(&self) -> bool {
        self.spec.index == IndexRole::Pk
    }

    pub fn is_fk(&self) -> bool {
        self.spec.index == IndexRole::Fk
    }

    pub fn is_pfk(&self) -> bool {
        self.spec.index == IndexRole::Pfk
    }

    pub fn is_sk(&self) -> bool {
        self.spec.index == IndexRole::Sk
    }

    /// pk, fk or pfk. Semantic keys are not keys.
    pub fn is_key(&self) -> bool {
        self.is_pk() || self.is_fk() || self.is_pfk()
    }

    pub fn is_self_referential(&self) -> bool {
        self.is_fk() && self.fname() == "parent_id"
    }

    pub fn is_enum(&self) -> bool {
        self.spec.constraint.starts_with("enum")
    }

    pub fn is_required(&self) -> bool {
        self.spec.required == Some(1)
    }

    pub fn is_number(&self) -> bool {
        self.spec.ftype.is_some_and(FieldType::is_number)
    }
}

impl<L: Lens> fmt::Display for Field<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ftype = self.spec.ftype.map_or("None", FieldType::as_str);
        write!(f, "<Field '{}' ({ftype})>", self.qualified_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NOPREFIX;
    use crate::lens::{Django, PgEnum, Plain, Postgres};

    fn pk_normal() -> FieldSpec {
        FieldSpec::new("id", FieldType::Int)
            .with_index(IndexRole::Pk)
            .required()
            .with_description("primary key")
    }

    fn str_nolength() -> FieldSpec {
        FieldSpec::new("name", FieldType::Str)
            .with_index(IndexRole::Pk)
            .with_default("sam")
    }

    fn no_offset() -> Options {
        Options::default().with_comment_offset(0)
    }

    #[test]
    fn test_from_row_rejects_unknown_type() {
        let mut row: [Value; 10] = Default::default();
        row[0] = Value::from("age");
        row[1] = Value::from("integer");
        let err = FieldSpec::from_row(&row).unwrap_err();
        assert!(matches!(err, FieldError::UnknownType { .. }));
    }

    #[test]
    fn test_from_row_normalizes_cells() {
        let mut row: [Value; 10] = Default::default();
        row[0] = Value::from("name");
        row[1] = Value::from("str");
        row[2] = Value::Int(20);
        row[3] = Value::from("sk");
        row[4] = Value::Bool(true);
        let spec = FieldSpec::from_row(&row).unwrap();
        assert_eq!(spec.ftype, Some(FieldType::Str));
        assert_eq!(spec.length, Some(20));
        assert_eq!(spec.index, IndexRole::Sk);
        assert_eq!(spec.required, Some(1));
        assert_eq!(FieldSpec::from_row(&spec.values()).unwrap(), spec);
    }

    #[test]
    fn test_required_zero_survives_row_round_trip() {
        let mut row: [Value; 10] = Default::default();
        row[0] = Value::from("nickname");
        row[1] = Value::from("str");
        row[4] = Value::Int(0);
        let spec = FieldSpec::from_row(&row).unwrap();
        assert_eq!(spec.required, Some(0));
        assert_eq!(spec.values()[4], Value::Int(0));
        assert_eq!(FieldSpec::from_row(&spec.values()).unwrap().required, Some(0));

        row[4] = Value::Bool(false);
        assert_eq!(FieldSpec::from_row(&row).unwrap().required, Some(0));
        row[4] = Value::Null;
        assert_eq!(FieldSpec::from_row(&row).unwrap().required, None);

        let field = Field::<Postgres>::new(FieldSpec::new("nickname", FieldType::Str).with_length(9), no_offset());
        let mut explicit = field.spec().clone();
        explicit.required = Some(0);
        let explicit = Field::<Postgres>::new(explicit, no_offset());
        assert!(!explicit.is_required());
        assert_eq!(explicit.definition().unwrap(), field.definition().unwrap());
    }

    #[test]
    fn test_from_row_keeps_unknown_action() {
        let mut row: [Value; 10] = Default::default();
        row[0] = Value::from("label");
        row[1] = Value::from("str");
        row[8] = Value::from("shout");
        assert_eq!(FieldSpec::from_row(&row).unwrap().action, "shout");
        row[8] = Value::from(NOPREFIX);
        assert_eq!(FieldSpec::from_row(&row).unwrap().action, NOPREFIX);
    }

    #[test]
    fn test_missing_type_raises_on_access() {
        let spec = FieldSpec {
            name: "name".into(),
            ..FieldSpec::default()
        };
        let field = Field::<PgEnum>::new(spec, Options::default());
        assert!(matches!(
            field.type_name(),
            Err(FieldError::MissingType { .. })
        ));
    }

    #[test]
    fn test_detached_field() {
        let field = Field::<Plain>::new(pk_normal(), Options::default());
        assert_eq!(field.name(), "id");
        assert_eq!(field.fname(), "id");
        assert_eq!(field.model_name(), "model");
        assert_eq!(field.to_string(), "<Field 'model.id' (int)>");
        assert!(field.is_pk());
        assert!(field.is_key());
        assert!(!field.is_sk());
        assert!(field.is_required());
        assert!(field.is_number());
    }

    #[test]
    fn test_plain_definition_not_implemented() {
        let field = Field::<Plain>::new(pk_normal(), Options::default());
        assert!(matches!(
            field.definition(),
            Err(FieldError::NotImplemented { .. })
        ));
    }

    #[test]
    fn test_postgres_definition_without_offset() {
        let field = Field::<Postgres>::new(pk_normal(), no_offset());
        assert_eq!(field.definition().unwrap(), "id integer primary key not null,");
    }

    #[test]
    fn test_str_length_resolution() {
        let sized = Field::<Postgres>::new(
            FieldSpec::new("code", FieldType::Str).with_length(20),
            no_offset(),
        );
        assert_eq!(sized.type_name().unwrap(), "varchar(20)");

        let unsized_field = Field::<Postgres>::new(FieldSpec::new("code", FieldType::Str), no_offset());
        assert_eq!(unsized_field.type_name().unwrap(), "text");
    }

    #[test]
    fn test_pgenum_nolength_is_text() {
        let field = Field::<PgEnum>::new(str_nolength(), Options::default());
        assert_eq!(field.ftype(), Some(FieldType::Str));
        assert_eq!(field.type_name().unwrap(), "text");
    }

    #[test]
    fn test_django_nolength_is_textfield() {
        let field = Field::<Django>::new(str_nolength(), Options::default());
        assert_eq!(
            field.definition().unwrap(),
            "name = models.TextField(blank=False, null=False, primary_key=True)"
        );
    }

    #[test]
    fn test_predicates() {
        let parent = Field::<Plain>::new(
            FieldSpec::new("parent_id", FieldType::Int).with_index(IndexRole::Fk),
            Options::default(),
        );
        assert!(parent.is_self_referential());
        assert!(parent.is_key());

        let color = Field::<Plain>::new(
            FieldSpec::new("color", FieldType::Str).with_constraint("enum"),
            Options::default(),
        );
        assert!(color.is_enum());
        assert!(!color.is_required());
        assert!(!color.is_number());
    }

    #[test]
    fn test_comma_follows_is_last() {
        let mut field = Field::<Plain>::new(FieldSpec::new("a", FieldType::Int), Options::default());
        assert_eq!(field.comma(), ",");
        let info = Rc::new(ModelInfo::new("m"));
        field.link(&info, true);
        assert_eq!(field.comma(), "");
        assert_eq!(field.model_name(), "m");
    }

    #[test]
    fn test_from_map_fills_missing_attributes() {
        let map = IndexMap::from([
            ("name".to_string(), Value::from("age")),
            ("type".to_string(), Value::from("int")),
            ("required".to_string(), Value::Int(1)),
        ]);
        let spec = FieldSpec::from_map(&map).unwrap();
        assert_eq!(spec.name, "age");
        assert_eq!(spec.ftype, Some(FieldType::Int));
        assert_eq!(spec.index, IndexRole::None);
        assert_eq!(spec.required, Some(1));
        assert!(spec.description.is_empty());

        let bad = IndexMap::from([("name".to_string(), Value::from("x")), ("type".to_string(), Value::from("blob"))]);
        assert!(matches!(FieldSpec::from_map(&bad), Err(FieldError::UnknownType { .. })));
    }
}
