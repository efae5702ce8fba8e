//! The parsed schema and its specialization into target lenses.

use crate::config::Options;
use crate::enums::Enum;
use crate::field::{FieldError, FieldType, Lens};
use crate::lens::Plain;
use crate::model::Model;
use crate::namespace::NamespaceKind;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Enum field '{model}.{field}' has no matching enum named '{field}'")]
    MissingEnum { model: String, field: String },
    #[error(transparent)]
    Field(#[from] FieldError),
}

pub type Enums = IndexMap<String, Rc<Enum>>;

/// Target of a specialization: the lens `L` to re-create fields under, the
/// namespace kind attached to every model, and render options.
#[derive(Debug, Clone)]
pub struct Specialization<L: Lens> {
    pub options: Options,
    pub namespace: Option<NamespaceKind>,
    lens: PhantomData<L>,
}

impl<L: Lens> Specialization<L> {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            namespace: None,
            lens: PhantomData,
        }
    }

    pub fn with_namespace(mut self, kind: NamespaceKind) -> Self {
        self.namespace = Some(kind);
        self
    }
}

impl<L: Lens> Default for Specialization<L> {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

#[derive(Debug, Clone)]
pub struct Schema<L: Lens = Plain> {
    name: String,
    models: Vec<Model<L>>,
    enums: Enums,
    types: BTreeSet<String>,
    options: Options,
}

impl<L: Lens> PartialEq for Schema<L> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.models == other.models
            && self.enums == other.enums
            && self.types == other.types
            && self.options == other.options
    }
}

impl<L: Lens> Schema<L> {
    /// Assembles a schema, failing if any enum-constrained field lacks an
    /// enum of the same name.
    pub fn new(
        name: impl Into<String>,
        models: Vec<Model<L>>,
        enums: impl IntoIterator<Item = Enum>,
    ) -> Result<Self, SchemaError> {
        let enums = enums
            .into_iter()
            .map(|e| (e.name.clone(), Rc::new(e)))
            .collect();
        Self::from_parts(name.into(), models, enums, BTreeSet::new(), Options::default())
    }

    fn from_parts(
        name: String,
        models: Vec<Model<L>>,
        enums: Enums,
        types: BTreeSet<String>,
        options: Options,
    ) -> Result<Self, SchemaError> {
        let schema = Self {
            name,
            models,
            enums,
            types,
            options,
        };
        schema.validate()?;
        Ok(schema)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        for model in &self.models {
            for field in model.enum_fields() {
                if !self.enums.contains_key(field.fname()) {
                    log::error!(
                        "{}: enum field has no matching enum '{}'",
                        field.qualified_name(),
                        field.fname()
                    );
                    return Err(SchemaError::MissingEnum {
                        model: model.name().to_string(),
                        field: field.fname().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Records the rendered base type names used across the schema.
    pub fn with_types(mut self, types: BTreeSet<String>) -> Self {
        self.types = types;
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Options the schema was read or last specialized with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn models(&self) -> &[Model<L>] {
        &self.models
    }

    pub fn model(&self, name: &str) -> Option<&Model<L>> {
        self.models.iter().find(|m| m.name() == name)
    }

    pub fn enums(&self) -> &Enums {
        &self.enums
    }

    pub fn types(&self) -> &BTreeSet<String> {
        &self.types
    }

    /// Base field types present across every model.
    pub fn dtypes(&self) -> BTreeSet<FieldType> {
        self.models
            .iter()
            .flat_map(|m| m.fields().iter().filter_map(|f| f.ftype()))
            .collect()
    }

    /// Re-derives the whole schema under lens `T`. Enums are shared with the
    /// source, everything else is rebuilt; `self` is left untouched.
    pub fn specialize<T: Lens>(&self, target: &Specialization<T>) -> Result<Schema<T>, SchemaError> {
        log::debug!("specializing schema '{}' as {}", self.name, T::NAME);
        let models = self
            .models
            .iter()
            .map(|m| m.clone_as::<T>(target.namespace, &target.options))
            .collect();
        Schema::from_parts(
            self.name.clone(),
            models,
            self.enums.clone(),
            self.types.clone(),
            target.options.clone(),
        )
    }
}

impl<L: Lens> fmt::Display for Schema<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Schema '{}'>", self.name)
    }
}
