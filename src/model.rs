//! Models: ordered fields plus optional data rows, and the algorithms derived
//! from them.

use crate::config::Options;
use crate::field::{Field, FieldError, FieldType, IndexRole, Lens};
use crate::lens::Plain;
use crate::namespace::{Namespace, NamespaceKind};
use crate::text::{unique, TextExt};
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// User visible model properties such as `app` and `model`.
pub type Properties = IndexMap<String, String>;

/// One data row, positionally aligned with a model's fields.
pub type Row = Vec<Value>;

/// System flags set by readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metadata {
    /// Name-pattern candidate for a many-to-many junction table.
    pub is_mtm: bool,
}

/// The part of a model its fields and namespace point back to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelInfo {
    pub name: String,
    pub properties: Properties,
    pub metadata: Metadata,
    pub options: Options,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn has_app_model_properties(&self) -> bool {
        ["model", "app"].iter().all(|p| self.properties.contains_key(*p))
    }
}

#[derive(Debug, Clone)]
pub struct Model<L: Lens = Plain> {
    info: Rc<ModelInfo>,
    fields: Vec<Field<L>>,
    data: Vec<Row>,
    namespace: Option<NamespaceKind>,
}

impl<L: Lens> PartialEq for Model<L> {
    fn eq(&self, other: &Self) -> bool {
        self.info == other.info
            && self.fields == other.fields
            && self.data == other.data
            && self.namespace == other.namespace
    }
}

impl<L: Lens> Model<L> {
    pub fn new(name: impl Into<String>, fields: Vec<Field<L>>) -> Self {
        Self::from_parts(ModelInfo::new(name), fields, Vec::new(), None)
    }

    pub fn from_parts(
        info: ModelInfo,
        fields: Vec<Field<L>>,
        data: Vec<Row>,
        namespace: Option<NamespaceKind>,
    ) -> Self {
        let mut model = Self {
            info: Rc::new(info),
            fields,
            data,
            namespace,
        };
        model.setup();
        model
    }

    /// Links every field to this model and flags the trailing one. Junction
    /// tables get no trailing field: their composite key line closes the list.
    fn setup(&mut self) {
        let trailing = if self.is_mtm() {
            None
        } else {
            self.fields.len().checked_sub(1)
        };
        let info = Rc::clone(&self.info);
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.link(&info, Some(i) == trailing);
        }
    }

    /// Rebuilds this model under lens `T`, re-creating every field from its
    /// value tuple.
    pub fn clone_as<T: Lens>(&self, namespace: Option<NamespaceKind>, options: &Options) -> Model<T> {
        let fields = self.fields.iter().map(|f| f.clone_as::<T>(options)).collect();
        let info = ModelInfo {
            options: options.clone(),
            ..(*self.info).clone()
        };
        Model::from_parts(info, fields, self.data.clone(), namespace)
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn info(&self) -> &Rc<ModelInfo> {
        &self.info
    }

    pub fn fields(&self) -> &[Field<L>] {
        &self.fields
    }

    pub fn data(&self) -> &[Row] {
        &self.data
    }

    pub fn properties(&self) -> &Properties {
        &self.info.properties
    }

    pub fn metadata(&self) -> Metadata {
        self.info.metadata
    }

    pub fn options(&self) -> &Options {
        &self.info.options
    }

    /// Naming and path view, present when the model was specialized with a
    /// namespace kind.
    pub fn nspace(&self) -> Option<Namespace<'_, L>> {
        self.namespace.map(|kind| Namespace::new(self, kind))
    }

    fn fields_of(&self, index: IndexRole) -> Vec<&Field<L>> {
        self.fields.iter().filter(|f| f.index() == index).collect()
    }

    fn has_field(&self, index: IndexRole) -> bool {
        self.fields.iter().any(|f| f.index() == index)
    }

    /// Junction table: name-pattern candidate that also carries a `pfk` field.
    pub fn is_mtm(&self) -> bool {
        self.info.metadata.is_mtm && self.has_pfk()
    }

    pub fn fieldnames(&self) -> Vec<String> {
        self.fields.iter().map(Field::name).collect()
    }

    /// Field names with the `_id` suffix dropped from foreign keys.
    pub fn fieldnames_stripped(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| if f.is_fk() { f.name().strip_id() } else { f.name() })
            .collect()
    }

    /// Pairs field names with row values, double-quoting text when asked.
    pub fn row_zip(&self, row: &[Value], quote: bool) -> Vec<(String, Value)> {
        self.fieldnames()
            .into_iter()
            .zip(row)
            .map(|(name, value)| {
                let value = if quote { value.quoted() } else { value.clone() };
                (name, value)
            })
            .collect()
    }

    /// `name=value, ...` rendering of a row.
    pub fn row_dict(&self, row: &[Value], sep: &str, quote: bool) -> String {
        self.row_zip(row, quote)
            .iter()
            .map(|(name, value)| format!("{name}{sep}{value}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Normalizes raw cells by each field's base type.
    pub fn row_clean(&self, row: &[Value]) -> Row {
        self.fields
            .iter()
            .zip(row)
            .map(|(field, value)| clean_cell(field.ftype(), value))
            .collect()
    }

    /// Every field definition, followed by the composite key line for
    /// junction tables.
    pub fn definitions(&self) -> Result<Vec<String>, FieldError> {
        let mut defs = self
            .fields
            .iter()
            .map(Field::definition)
            .collect::<Result<Vec<_>, _>>()?;
        if self.is_mtm() {
            defs.push(self.pfk_definition());
        }
        Ok(defs)
    }

    pub fn methods(&self) -> Result<Vec<String>, FieldError> {
        self.fields.iter().map(Field::method).collect()
    }

    /// Fields with a type that are not the primary key.
    pub fn mapped_fields(&self) -> Vec<&Field<L>> {
        self.fields
            .iter()
            .filter(|f| f.ftype().is_some() && !f.is_pk())
            .collect()
    }

    pub fn required_fields(&self) -> Vec<&Field<L>> {
        self.fields
            .iter()
            .filter(|f| f.required().is_some_and(|r| r != 0))
            .collect()
    }

    pub fn pk_field(&self) -> Option<&Field<L>> {
        self.fields.iter().find(|f| f.is_pk())
    }

    pub fn pk_fields(&self) -> Vec<&Field<L>> {
        self.fields_of(IndexRole::Pk)
    }

    pub fn has_pk(&self) -> bool {
        self.has_field(IndexRole::Pk)
    }

    pub fn has_fk(&self) -> bool {
        self.has_field(IndexRole::Fk)
    }

    pub fn fk_fields(&self) -> Vec<&Field<L>> {
        self.fields_of(IndexRole::Fk)
    }

    /// `--REQ tables/<target>` lines, one per foreign key.
    pub fn dependencies(&self) -> Vec<String> {
        self.fk_fields()
            .iter()
            .map(|f| {
                let name = f.name();
                let keep = name.chars().count().saturating_sub(3);
                format!("--REQ tables/{}", name.chars().take(keep).collect::<String>())
            })
            .collect()
    }

    /// Semantic keys are human-meaningful, searchable columns (a company
    /// name, not a surrogate id).
    pub fn has_sk(&self) -> bool {
        self.has_field(IndexRole::Sk)
    }

    pub fn sk_field(&self) -> Option<&Field<L>> {
        self.fields.iter().find(|f| f.is_sk())
    }

    pub fn sk_fields(&self) -> Vec<&Field<L>> {
        self.fields_of(IndexRole::Sk)
    }

    pub fn has_composite_keys(&self) -> bool {
        self.pk_fields().len() > 1
    }

    pub fn has_pfk(&self) -> bool {
        self.has_field(IndexRole::Pfk)
    }

    pub fn pfk_fields(&self) -> Vec<&Field<L>> {
        self.fields_of(IndexRole::Pfk)
    }

    pub fn pfk_definition(&self) -> String {
        let names: Vec<String> = self.pfk_fields().iter().map(|f| f.name()).collect();
        format!("primary key({})", names.join(", "))
    }

    pub fn enum_fields(&self) -> Vec<&Field<L>> {
        self.fields.iter().filter(|f| f.is_enum()).collect()
    }

    pub fn enum_fieldnames(&self) -> Vec<String> {
        self.enum_fields().iter().map(|f| f.name()).collect()
    }

    pub fn category_fields(&self) -> Vec<&Field<L>> {
        self.fields.iter().filter(|f| !f.category().is_empty()).collect()
    }

    pub fn noncategory_fields(&self) -> Vec<&Field<L>> {
        self.fields.iter().filter(|f| f.category().is_empty()).collect()
    }

    pub fn noncategory_fieldnames(&self) -> Vec<String> {
        self.noncategory_fields().iter().map(|f| f.name()).collect()
    }

    /// Non-category names without `id`, and with `_id` dropped elsewhere.
    pub fn noncategory_admin_fieldnames(&self) -> Vec<String> {
        self.noncategory_fieldnames()
            .into_iter()
            .filter(|name| name != "id")
            .map(|name| name.strip_id())
            .collect()
    }

    pub fn number_fields(&self) -> Vec<&Field<L>> {
        self.fields.iter().filter(|f| f.is_number()).collect()
    }

    /// Category labels in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        unique(self.category_fields().into_iter().map(Field::category))
    }

    pub fn fields_for_category(&self, category: &str) -> Vec<&Field<L>> {
        self.fields.iter().filter(|f| f.category() == category).collect()
    }

    pub fn fieldnames_for_category(&self, category: &str) -> Vec<String> {
        self.fields_for_category(category)
            .iter()
            .map(|f| f.name())
            .collect()
    }

    /// Rendered type of every field.
    pub fn types(&self) -> Result<Vec<String>, FieldError> {
        self.fields.iter().map(Field::type_name).collect()
    }

    pub fn has_defaults(&self) -> bool {
        self.fields.iter().any(|f| f.raw_default().truthy())
    }

    pub fn has_actions(&self) -> bool {
        self.fields.iter().any(|f| !f.action().is_empty())
    }

    /// Has a `parent_id` foreign key.
    pub fn is_hierarchical(&self) -> bool {
        self.fields.iter().any(Field::is_self_referential)
    }

    pub fn classname(&self) -> String {
        self.name().classname()
    }

    /// Underline for reStructuredText and markdown headings.
    pub fn line(&self, symbol: &str, txt: Option<&str>) -> String {
        let width = self.name().chars().count();
        match txt {
            Some(txt) => symbol.repeat(width + 1 + txt.chars().count()),
            None => symbol.repeat(width),
        }
    }

    pub fn has_app_model_properties(&self) -> bool {
        self.info.has_app_model_properties()
    }
}

impl<L: Lens> fmt::Display for Model<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Model '{}'>", self.name())
    }
}

fn clean_cell(ftype: Option<FieldType>, value: &Value) -> Value {
    match (ftype, value) {
        (Some(FieldType::Date), Value::Null) => Value::Null,
        (Some(FieldType::Date), other) => Value::Str(other.to_string().replace(" 00:00:00", "")),
        (Some(FieldType::Time | FieldType::Interval), Value::Null) => Value::Null,
        (Some(FieldType::Time | FieldType::Interval), other) => Value::Str(other.to_string()),
        (Some(FieldType::Bool), other) => Value::Bool(other.truthy()),
        (_, other) => other.clone(),
    }
}
