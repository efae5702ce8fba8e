//! Code generators: each writer specializes the parsed schema into its lens
//! and renders one output file.

use crate::config::{Options, METAFIELDS};
use crate::field::{Field, FieldError, Lens};
use crate::lens::{
    py_bool, Abap, Django, FactoryBoy, Haskell, Java, PgEnum, Postgres, Scala, Sql, SqlAlchemy,
    Sqlite,
};
use crate::model::Model;
use crate::namespace::{NamespaceError, NamespaceKind};
use crate::reader::{EnumDoc, EnumEntry, ModelDoc, RowDoc, SchemaDoc};
use crate::schema::{Schema, SchemaError, Specialization};
use crate::text::TextExt;
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Unknown writer '{0}'")]
    UnknownWriter(String),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Namespace(#[from] NamespaceError),
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Registered output formats, addressed as `<suffix>/<method>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterKind {
    Sql,
    Sqlite,
    Postgres,
    PgEnum,
    Yaml,
    Haskell,
    Hibernate,
    Scala,
    SqlAlchemy,
    DjangoModels,
    DjangoFactories,
    Abap,
}

impl WriterKind {
    pub const ALL: [Self; 12] = [
        Self::Sql,
        Self::Sqlite,
        Self::Postgres,
        Self::PgEnum,
        Self::Yaml,
        Self::Haskell,
        Self::Hibernate,
        Self::Scala,
        Self::SqlAlchemy,
        Self::DjangoModels,
        Self::DjangoFactories,
        Self::Abap,
    ];

    /// Parse from `suffix/method` or the bare method name.
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| s == kind.key() || s == kind.method())
    }

    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Sql | Self::Sqlite | Self::Postgres | Self::PgEnum => "sql",
            Self::Yaml => "yml",
            Self::Haskell => "hs",
            Self::Hibernate => "java",
            Self::Scala => "scala",
            Self::SqlAlchemy | Self::DjangoModels | Self::DjangoFactories => "py",
            Self::Abap => "abap",
        }
    }

    pub const fn method(self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
            Self::PgEnum => "pgenum",
            Self::Yaml => "yaml",
            Self::Haskell => "haskell",
            Self::Hibernate => "hibernate",
            Self::Scala => "scala",
            Self::SqlAlchemy => "sqlalchemy",
            Self::DjangoModels => "djmodels",
            Self::DjangoFactories => "djfactories",
            Self::Abap => "abap",
        }
    }

    pub fn key(self) -> String {
        format!("{}/{}", self.suffix(), self.method())
    }
}

/// Renders one schema in one format.
#[derive(Debug, Clone)]
pub struct Writer<'a> {
    schema: &'a Schema,
    kind: WriterKind,
    options: Options,
    namespace: Option<NamespaceKind>,
}

impl<'a> Writer<'a> {
    pub fn new(schema: &'a Schema, kind: WriterKind, options: Options) -> Self {
        Self {
            schema,
            kind,
            options,
            namespace: None,
        }
    }

    pub fn with_namespace(mut self, kind: NamespaceKind) -> Self {
        self.namespace = Some(kind);
        self
    }

    pub const fn kind(&self) -> WriterKind {
        self.kind
    }

    /// `<output>/<schema>_<method>.<suffix>`
    pub fn path(&self) -> PathBuf {
        self.options.output.join(format!(
            "{}_{}.{}",
            self.schema.name(),
            self.kind.method(),
            self.kind.suffix()
        ))
    }

    fn specialize<T: Lens>(&self) -> Result<Schema<T>, SchemaError> {
        let mut target = Specialization::<T>::new(self.options.clone());
        target.namespace = self.namespace;
        self.schema.specialize(&target)
    }

    pub fn render(&self) -> Result<String, WriteError> {
        match self.kind {
            WriterKind::Sql => render_sql(&self.specialize::<Sql>()?, false),
            WriterKind::Sqlite => render_sql(&self.specialize::<Sqlite>()?, false),
            WriterKind::Postgres => render_sql(&self.specialize::<Postgres>()?, false),
            WriterKind::PgEnum => render_sql(&self.specialize::<PgEnum>()?, true),
            WriterKind::Yaml => render_yaml(self.schema),
            WriterKind::Haskell => render_haskell(&self.specialize::<Haskell>()?),
            WriterKind::Hibernate => render_java(&self.specialize::<Java>()?),
            WriterKind::Scala => render_scala(&self.specialize::<Scala>()?),
            WriterKind::SqlAlchemy => render_sqlalchemy(&self.specialize::<SqlAlchemy>()?),
            WriterKind::DjangoModels => render_django(&self.specialize::<Django>()?),
            WriterKind::DjangoFactories => render_factories(&self.specialize::<FactoryBoy>()?),
            WriterKind::Abap => render_abap(&self.specialize::<Abap>()?),
        }
    }

    /// Renders and writes to [`Writer::path`], creating parent directories.
    pub fn write(&self) -> Result<PathBuf, WriteError> {
        let output = self.render()?;
        let path = self.path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, output)?;
        log::info!("{} written to {}", self.kind.key(), path.display());
        Ok(path)
    }
}

fn sql_literal(value: &Value) -> String {
    match value {
        Value::Str(s) => format!("'{}'", s.replace('\'', "''")),
        other => other.to_string(),
    }
}

/// Insert cell; empty and `n/a` text count as missing.
fn sql_cell(value: &Value) -> String {
    match value {
        Value::Str(s) if s.is_empty() || s == "n/a" => "null".to_string(),
        other => sql_literal(other),
    }
}

fn py_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(b) => py_bool(*b).to_string(),
        other => other.to_string(),
    }
}

/// Field definitions alone; the composite key line is SQL-only.
fn field_definitions<L: Lens>(model: &Model<L>) -> Result<Vec<String>, FieldError> {
    model.fields().iter().map(Field::definition).collect()
}

fn push_lines(output: &mut String, indent: &str, lines: &[String]) {
    for line in lines {
        output.push_str(indent);
        output.push_str(line);
        output.push('\n');
    }
}

/// Table definitions with inserts for seeded rows; `create_types` emits one
/// enum type per schema enum first.
fn render_sql<L: Lens>(schema: &Schema<L>, create_types: bool) -> Result<String, WriteError> {
    let mut output = format!("-- {} ({})\n", schema.name(), L::NAME);

    if create_types {
        for e in schema.enums().values() {
            let keys: Vec<String> = e.keys().into_iter().map(|k| sql_literal(&Value::from(k.to_string()))).collect();
            output.push_str(&format!(
                "\ncreate type {} as enum ({});\n",
                e.name,
                keys.join(", ")
            ));
        }
    }

    for model in schema.models() {
        for dependency in model.dependencies() {
            output.push_str(&format!("\n{dependency}"));
        }
        output.push_str(&format!(
            "\ndrop table if exists {name};\ncreate table {name} (\n",
            name = model.name()
        ));
        push_lines(&mut output, "    ", &model.definitions()?);
        output.push_str(");\n");

        if !model.data().is_empty() {
            let rows: Vec<String> = model
                .data()
                .iter()
                .map(|row| {
                    let cells: Vec<String> = model.row_clean(row).iter().map(sql_cell).collect();
                    format!("({})", cells.join(", "))
                })
                .collect();
            output.push_str(&format!(
                "\ninsert into {} ({}) values\n    {};\n",
                model.name(),
                model.fieldnames().join(", "),
                rows.join(",\n    ")
            ));
        }
    }
    Ok(output)
}

fn render_yaml(schema: &Schema) -> Result<String, WriteError> {
    let enums = schema
        .enums()
        .values()
        .map(|e| EnumDoc {
            name: e.name.clone(),
            data: e.data.iter().cloned().map(EnumEntry::Pair).collect(),
        })
        .collect();

    let models = schema
        .models()
        .iter()
        .map(|model| ModelDoc {
            name: model.name().to_string(),
            properties: model.properties().clone(),
            fields: model
                .fields()
                .iter()
                .map(|f| {
                    METAFIELDS
                        .into_iter()
                        .zip(f.values())
                        .filter(|(_, value)| !value.is_null())
                        .map(|(key, value)| (key.to_string(), value))
                        .collect::<IndexMap<_, _>>()
                })
                .collect(),
            data: model.data().iter().cloned().map(RowDoc::List).collect(),
        })
        .collect();

    let doc = SchemaDoc {
        name: Some(schema.name().to_string()),
        enums,
        models,
    };
    Ok(serde_yaml::to_string(&doc)?)
}

fn render_haskell(schema: &Schema<Haskell>) -> Result<String, WriteError> {
    let mut output = format!(
        "-- {} records\n{{-# LANGUAGE DeriveGeneric #-}}\nmodule {} where\n\nimport Data.Time\nimport GHC.Generics\n",
        schema.name(),
        schema.name().classname()
    );

    for e in schema.enums().values() {
        let constructors: Vec<String> = e.keys().iter().map(|k| k.to_string().classname()).collect();
        output.push_str(&format!(
            "\ndata {} = {} deriving (Show, Eq, Generic)\n",
            e.classname(),
            constructors.join(" | ")
        ));
    }

    for model in schema.models() {
        let classname = model.classname();
        output.push_str(&format!("\ndata {classname} = {classname}\n"));
        for (i, definition) in field_definitions(model)?.iter().enumerate() {
            let lead = if i == 0 { "{" } else { "," };
            output.push_str(&format!("    {lead} {definition}\n"));
        }
        output.push_str("    } deriving (Show, Generic)\n");
    }
    Ok(output)
}

fn java_class<L: Lens>(model: &Model<L>, keyword: &str, with_methods: bool) -> Result<String, WriteError> {
    let mut output = format!(
        "\n@Entity\n@Table(name = \"{}\")\n{keyword} {} {{\n",
        model.name(),
        model.classname()
    );
    push_lines(&mut output, "    ", &field_definitions(model)?);
    if with_methods {
        push_lines(&mut output, "    ", &model.methods()?);
    }
    output.push_str("}\n");
    Ok(output)
}

fn render_java(schema: &Schema<Java>) -> Result<String, WriteError> {
    let mut output = format!(
        "// {} entities\nimport javax.persistence.*;\n",
        schema.name()
    );
    for model in schema.models() {
        output.push_str(&java_class(model, "public class", true)?);
    }
    Ok(output)
}

fn render_scala(schema: &Schema<Scala>) -> Result<String, WriteError> {
    let mut output = format!(
        "// {} entities\nimport javax.persistence._\nimport scala.beans.BeanProperty\n",
        schema.name()
    );
    for model in schema.models() {
        output.push_str(&java_class(model, "class", false)?);
    }
    Ok(output)
}

fn render_sqlalchemy(schema: &Schema<SqlAlchemy>) -> Result<String, WriteError> {
    let mut imports: BTreeSet<&str> = schema
        .dtypes()
        .into_iter()
        .map(SqlAlchemy::lookup)
        .collect::<Option<_>>()
        .ok_or_else(|| unmapped_import(schema))?;
    imports.insert("Column");
    if schema.models().iter().any(Model::has_fk) {
        imports.insert("ForeignKey");
    }

    let mut output = format!(
        "\"\"\"{} models.\"\"\"\nfrom sqlalchemy import {}\nfrom sqlalchemy.orm import declarative_base, relationship\n\nBase = declarative_base()\n",
        schema.name(),
        imports.into_iter().collect::<Vec<_>>().join(", ")
    );

    for model in schema.models() {
        output.push_str(&format!(
            "\n\nclass {}(Base):\n    __tablename__ = \"{}\"\n\n",
            model.classname(),
            model.name()
        ));
        push_lines(&mut output, "    ", &field_definitions(model)?);
    }

    let seeded: Vec<&Model<SqlAlchemy>> = schema.models().iter().filter(|m| !m.data().is_empty()).collect();
    if !seeded.is_empty() {
        output.push_str("\n\ndef seed(session):\n");
        for model in seeded {
            for row in model.data() {
                let args: Vec<String> = model
                    .row_zip(&model.row_clean(row), true)
                    .iter()
                    .map(|(name, value)| format!("{name}={}", py_literal(value)))
                    .collect();
                output.push_str(&format!(
                    "    session.add({}({}))\n",
                    model.classname(),
                    args.join(", ")
                ));
            }
        }
    }
    Ok(output)
}

/// The first field whose base type has no SQLAlchemy mapping.
fn unmapped_import(schema: &Schema<SqlAlchemy>) -> FieldError {
    schema
        .models()
        .iter()
        .flat_map(|m| m.fields())
        .find_map(|f| f.type_name().err())
        .unwrap_or(FieldError::NotImplemented {
            lens: SqlAlchemy::NAME,
            what: "imports",
        })
}

fn render_django(schema: &Schema<Django>) -> Result<String, WriteError> {
    let mut output = format!(
        "\"\"\"{} models.\"\"\"\nfrom django.db import models\n",
        schema.name()
    );

    for e in schema.enums().values() {
        output.push_str(&format!("\n{} = [\n", e.name.to_uppercase()));
        for (key, value) in &e.data {
            output.push_str(&format!("    ({}, {}),\n", key.quoted(), value.quoted()));
        }
        output.push_str("]\n");
    }

    for model in schema.models() {
        output.push_str(&format!("\n\nclass {}(models.Model):\n", model.classname()));
        push_lines(&mut output, "    ", &field_definitions(model)?);

        output.push_str(&format!("\n    class Meta:\n        db_table = \"{}\"\n", model.name()));
        if let Some(nspace) = model.nspace() {
            output.push_str(&format!(
                "        verbose_name = \"{}\"\n        verbose_name_plural = \"{}\"\n",
                nspace.model_classname_title()?,
                nspace.model_classname_plural_title()?
            ));
        }

        if let Some(label) = model.sk_field().or_else(|| model.pk_field()) {
            output.push_str(&format!(
                "\n    def __str__(self):\n        return str(self.{})\n",
                label.name()
            ));
        }
    }
    Ok(output)
}

fn render_factories(schema: &Schema<FactoryBoy>) -> Result<String, WriteError> {
    let mut output = format!(
        "\"\"\"{} factories.\"\"\"\nimport factory\n\nfrom . import models as model\n",
        schema.name()
    );

    for model in schema.models() {
        let target = match model.nspace() {
            Some(nspace) => format!("\"{}.{}\"", nspace.app_name()?, nspace.model_classname()?),
            None => format!("model.{}", model.classname()),
        };
        output.push_str(&format!(
            "\n\nclass {}Factory(factory.django.DjangoModelFactory):\n    class Meta:\n        model = {target}\n\n",
            model.classname()
        ));
        push_lines(&mut output, "    ", &field_definitions(model)?);
    }
    Ok(output)
}

fn render_abap(schema: &Schema<Abap>) -> Result<String, WriteError> {
    let mut output = format!("* {} structures\n", schema.name());
    for model in schema.models() {
        output.push_str(&format!("\nTYPES: BEGIN OF ty_{},\n", model.name()));
        push_lines(&mut output, "  ", &field_definitions(model)?);
        output.push_str(&format!("TYPES: END OF ty_{}.\n", model.name()));
    }
    Ok(output)
}
