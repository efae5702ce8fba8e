//! YAML schema reader.
//!
//! A document holds an optional `name`, a list of `enums` and a list of
//! `models`:
//!
//! ```yaml
//! enums:
//!   - name: color
//!     data: [[red, Red], [blue, Blue]]      # or [{key: red, value: Red}]
//! models:
//!   - name: person
//!     properties: {app: app.core, model: app.core.models.Person}
//!     fields:
//!       - {name: id, type: serial, index: pk, required: 1}
//!       - {name: color, type: str, length: 10, constraint: enum}
//!     data:
//!       - [1, red]                           # or {id: 1, color: red}
//! ```

use crate::config::Options;
use crate::enums::Enum;
use crate::field::{Field, FieldError, FieldSpec};
use crate::model::{Metadata, Model, ModelInfo, Properties, Row};
use crate::schema::{Schema, SchemaError};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to read schema: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("In model '{model}': {source}")]
    Field {
        model: String,
        #[source]
        source: FieldError,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Model '{model}' row {row}: {reason}")]
    InvalidRow {
        model: String,
        row: usize,
        reason: String,
    },
}

/// The on-disk document shape, shared with the YAML writer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub(crate) struct SchemaDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub enums: Vec<EnumDoc>,
    #[serde(default)]
    pub models: Vec<ModelDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct EnumDoc {
    pub name: String,
    #[serde(default)]
    pub data: Vec<EnumEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum EnumEntry {
    Pair((Value, Value)),
    Map { key: Value, value: Value },
}

impl EnumEntry {
    fn into_pair(self) -> (Value, Value) {
        match self {
            Self::Pair(pair) => pair,
            Self::Map { key, value } => (key, value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ModelDoc {
    pub name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: Properties,
    pub fields: Vec<IndexMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<RowDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum RowDoc {
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
}

/// Junction table candidates: names splitting on `_` into an even number of
/// words whose two halves both name models in `model_names`.
pub fn identify_mtm_tables(model_names: &[String]) -> Vec<String> {
    let mut tables = Vec::new();
    for name in model_names {
        let words: Vec<&str> = name.split('_').collect();
        if words.len() < 2 || words.len() % 2 != 0 {
            continue;
        }
        let mid = words.len() / 2;
        let (left, right) = (words[..mid].join("_"), words[mid..].join("_"));
        if model_names.contains(&left) && model_names.contains(&right) {
            log::debug!("{name} is a many-to-many table of {left} and {right}");
            tables.push(name.clone());
        }
    }
    tables
}

/// Reads YAML schema documents into [`Schema`]s of plain fields.
#[derive(Debug, Clone, Default)]
pub struct YamlReader {
    options: Options,
}

impl YamlReader {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Reads a file; the schema is named after the file stem unless the
    /// document names itself.
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<Schema, ReadError> {
        let path = path.as_ref();
        log::debug!("processing {}", path.display());
        let source = fs::read_to_string(path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "schema".to_string());
        self.read_str(&source, &stem)
    }

    pub fn read_str(&self, source: &str, default_name: &str) -> Result<Schema, ReadError> {
        let doc: SchemaDoc = serde_yaml::from_str(source)?;
        self.build(doc, default_name)
    }

    fn build(&self, doc: SchemaDoc, default_name: &str) -> Result<Schema, ReadError> {
        let enums: Vec<Enum> = doc
            .enums
            .into_iter()
            .map(|e| {
                let data = e.data.into_iter().map(EnumEntry::into_pair).collect();
                Enum::new(e.name, data)
            })
            .collect();

        let model_names: Vec<String> = doc.models.iter().map(|m| m.name.clone()).collect();
        let mtm_tables = identify_mtm_tables(&model_names);

        let mut models = Vec::with_capacity(doc.models.len());
        let mut types = BTreeSet::new();
        for raw in doc.models {
            log::debug!("processing model: {}", raw.name);
            let model = self.build_model(raw, &mtm_tables)?;
            for field in model.fields() {
                let ty = field.type_name().map_err(|source| ReadError::Field {
                    model: model.name().to_string(),
                    source,
                })?;
                types.insert(ty);
            }
            models.push(model);
        }

        let name = doc.name.unwrap_or_else(|| default_name.to_string());
        Ok(Schema::new(name, models, enums)?
            .with_types(types)
            .with_options(self.options.clone()))
    }

    fn build_model(&self, raw: ModelDoc, mtm_tables: &[String]) -> Result<Model, ReadError> {
        let specs = raw
            .fields
            .iter()
            .map(FieldSpec::from_map)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| ReadError::Field {
                model: raw.name.clone(),
                source,
            })?;

        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        let data = raw
            .data
            .into_iter()
            .enumerate()
            .map(|(i, row)| order_row(&raw.name, i, row, &names))
            .collect::<Result<Vec<_>, _>>()?;

        let fields = specs
            .into_iter()
            .map(|spec| Field::new(spec, self.options.clone()))
            .collect();

        let info = ModelInfo::new(raw.name.as_str())
            .with_properties(raw.properties)
            .with_metadata(Metadata {
                is_mtm: mtm_tables.contains(&raw.name),
            })
            .with_options(self.options.clone());

        Ok(Model::from_parts(info, fields, data, None))
    }
}

/// Puts a data row into field order.
fn order_row(model: &str, index: usize, row: RowDoc, names: &[&str]) -> Result<Row, ReadError> {
    let invalid = |reason: String| ReadError::InvalidRow {
        model: model.to_string(),
        row: index,
        reason,
    };
    match row {
        RowDoc::List(cells) if cells.len() == names.len() => Ok(cells),
        RowDoc::List(cells) => Err(invalid(format!(
            "expected {} cells, found {}",
            names.len(),
            cells.len()
        ))),
        RowDoc::Map(mut cells) => names
            .iter()
            .map(|name| {
                cells
                    .swap_remove(*name)
                    .ok_or_else(|| invalid(format!("missing value for '{name}'")))
            })
            .collect(),
    }
}
