//! Package naming and output paths derived from a model's `app` and `model`
//! properties, for generators that lay code out in packages.

use crate::field::Lens;
use crate::model::Model;
use crate::text::TextExt;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NamespaceError {
    #[error("Model '{model}' has no '{property}' property required for namespaces")]
    MissingProperty {
        model: String,
        property: &'static str,
    },
    #[error("Failed to serialize namespace: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Which family of derived values a namespace exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceKind {
    /// Core app/model/path values.
    Package,
    /// Core values plus Django urls, templates and static paths.
    DjangoApp,
}

impl NamespaceKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "package" | "core" => Some(Self::Package),
            "djapp" | "django" => Some(Self::DjangoApp),
            _ => None,
        }
    }
}

/// A value in [`Namespace::to_dict`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NsValue {
    Str(String),
    List(Vec<String>),
    Int(usize),
}

impl From<String> for NsValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for NsValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<PathBuf> for NsValue {
    fn from(p: PathBuf) -> Self {
        Self::Str(p.display().to_string())
    }
}

impl From<Vec<String>> for NsValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

impl From<usize> for NsValue {
    fn from(n: usize) -> Self {
        Self::Int(n)
    }
}

/// Borrowed view over a model; every value is derived on demand.
#[derive(Debug, Clone, Copy)]
pub struct Namespace<'a, L: Lens> {
    parent: &'a Model<L>,
    kind: NamespaceKind,
}

impl<'a, L: Lens> Namespace<'a, L> {
    pub fn new(parent: &'a Model<L>, kind: NamespaceKind) -> Self {
        Self { parent, kind }
    }

    pub const fn kind(&self) -> NamespaceKind {
        self.kind
    }

    fn property(&self, property: &'static str) -> Result<&'a str, NamespaceError> {
        self.parent
            .properties()
            .get(property)
            .map(String::as_str)
            .ok_or_else(|| NamespaceError::MissingProperty {
                model: self.parent.name().to_string(),
                property,
            })
    }

    /// Output root joined with `parts`.
    fn under_output<'p>(&self, parts: impl IntoIterator<Item = &'p str>) -> PathBuf {
        let mut path = self.path_output();
        path.extend(parts);
        path
    }

    pub fn app(&self) -> Result<&'a str, NamespaceError> {
        self.property("app")
    }

    pub fn app_structure(&self) -> Result<Vec<&'a str>, NamespaceError> {
        Ok(self.app()?.split('.').collect())
    }

    pub fn app_name(&self) -> Result<&'a str, NamespaceError> {
        Ok(self.app_structure()?.last().copied().unwrap_or_default())
    }

    pub fn app_name_plural(&self) -> Result<String, NamespaceError> {
        Ok(self.app_name()?.plural())
    }

    /// Depth of nesting.
    pub fn app_level(&self) -> Result<usize, NamespaceError> {
        Ok(self.app_structure()?.len())
    }

    pub fn app_parent(&self) -> Result<String, NamespaceError> {
        Ok(parent_of(&self.app_structure()?))
    }

    pub fn app_parent_name(&self) -> Result<String, NamespaceError> {
        let parent = self.app_parent()?;
        Ok(parent.rsplit('.').next().unwrap_or_default().to_string())
    }

    pub fn model(&self) -> Result<&'a str, NamespaceError> {
        self.property("model")
    }

    pub fn model_structure(&self) -> Result<Vec<&'a str>, NamespaceError> {
        Ok(self.model()?.split('.').collect())
    }

    pub fn model_classname(&self) -> Result<&'a str, NamespaceError> {
        Ok(self.model_structure()?.last().copied().unwrap_or_default())
    }

    pub fn model_parent(&self) -> Result<String, NamespaceError> {
        Ok(parent_of(&self.model_structure()?))
    }

    pub fn model_classname_title(&self) -> Result<String, NamespaceError> {
        Ok(self.model_classname()?.title_words())
    }

    pub fn model_classname_plural(&self) -> Result<String, NamespaceError> {
        Ok(self.model_classname()?.plural())
    }

    pub fn model_classname_plural_title(&self) -> Result<String, NamespaceError> {
        Ok(self.model_classname_title()?.plural())
    }

    pub fn path_output(&self) -> PathBuf {
        self.parent.options().output.clone()
    }

    /// App path relative to the output root, without the top-level package.
    pub fn path_base(&self) -> Result<PathBuf, NamespaceError> {
        Ok(self.app_structure()?.iter().skip(1).collect())
    }

    pub fn path(&self) -> Result<PathBuf, NamespaceError> {
        Ok(self.under_output(self.app_structure()?.into_iter().skip(1)))
    }

    pub fn path_parent(&self) -> Result<PathBuf, NamespaceError> {
        let structure = self.app_structure()?;
        let inner = structure.get(1..structure.len().saturating_sub(1)).unwrap_or_default();
        Ok(self.under_output(inner.iter().copied()))
    }

    pub fn url(&self) -> Result<String, NamespaceError> {
        Ok(self.app_structure()?.get(1..).unwrap_or_default().join("-"))
    }

    pub fn url_parent(&self) -> Result<String, NamespaceError> {
        let structure = self.app_structure()?;
        let inner = structure.get(1..structure.len().saturating_sub(1)).unwrap_or_default();
        Ok(inner.join("-"))
    }

    fn url_for(&self, prefix: &str) -> Result<String, NamespaceError> {
        Ok(format!("{prefix}-{}", self.url()?))
    }

    pub fn list_display(&self) -> Vec<String> {
        self.parent.fieldnames()
    }

    pub fn search_fields(&self) -> Vec<String> {
        self.parent.sk_fields().iter().map(|f| f.name()).collect()
    }

    pub fn templates_root(&self) -> Result<PathBuf, NamespaceError> {
        Ok(self.path_output().join("templates").join(self.path_base()?))
    }

    pub fn templates_app(&self) -> Result<PathBuf, NamespaceError> {
        Ok(self.path()?.join("templates").join(self.app_name()?))
    }

    pub fn static_app(&self) -> Result<PathBuf, NamespaceError> {
        Ok(self.path()?.join("static").join(self.app_name()?))
    }

    pub fn widgets_app(&self) -> Result<PathBuf, NamespaceError> {
        Ok(self.path()?.join("templates").join("widgets"))
    }

    pub fn widgets_root(&self) -> PathBuf {
        self.under_output(["templates", "widgets"])
    }

    pub fn fixtures(&self) -> Result<PathBuf, NamespaceError> {
        Ok(self.path()?.join("fixtures"))
    }

    pub fn templatetags(&self) -> Result<PathBuf, NamespaceError> {
        Ok(self.path()?.join("templatetags"))
    }

    /// Flat map of every derived value, in a stable order.
    pub fn to_dict(&self) -> Result<IndexMap<&'static str, NsValue>, NamespaceError> {
        let owned = |parts: Vec<&str>| parts.into_iter().map(str::to_string).collect::<Vec<_>>();

        let mut nspace: IndexMap<&'static str, NsValue> = IndexMap::new();
        nspace.insert("app", self.app()?.into());
        nspace.insert("app_name", self.app_name()?.into());
        nspace.insert("app_name_plural", self.app_name_plural()?.into());
        nspace.insert("app_parent", self.app_parent()?.into());
        nspace.insert("app_parent_name", self.app_parent_name()?.into());
        nspace.insert("app_structure", owned(self.app_structure()?).into());
        nspace.insert("app_level", self.app_level()?.into());

        nspace.insert("model", self.model()?.into());
        nspace.insert("model_parent", self.model_parent()?.into());
        nspace.insert("model_classname", self.model_classname()?.into());
        nspace.insert("model_classname_title", self.model_classname_title()?.into());
        nspace.insert("model_classname_plural", self.model_classname_plural()?.into());
        nspace.insert(
            "model_classname_plural_title",
            self.model_classname_plural_title()?.into(),
        );
        nspace.insert("model_structure", owned(self.model_structure()?).into());

        nspace.insert("path", self.path()?.into());
        nspace.insert("path_base", self.path_base()?.into());
        nspace.insert("path_parent", self.path_parent()?.into());
        nspace.insert("path_output", self.path_output().into());

        if self.kind == NamespaceKind::DjangoApp {
            nspace.insert("url", self.url()?.into());
            nspace.insert("url_parent", self.url_parent()?.into());
            for (key, action) in [
                ("url_index", "index"),
                ("url_list", "list"),
                ("url_create", "create"),
                ("url_detail", "detail"),
                ("url_update", "update"),
                ("url_delete", "delete"),
            ] {
                nspace.insert(key, self.url_for(action)?.into());
            }

            let static_app = self.static_app()?;
            nspace.insert("templates_app", self.templates_app()?.into());
            nspace.insert("templates_root", self.templates_root()?.into());
            nspace.insert("static_app_css", static_app.join("css").into());
            nspace.insert("static_app_js", static_app.join("js").into());
            nspace.insert("static_app_img", static_app.join("img").into());
            nspace.insert("static_app", static_app.into());
            nspace.insert("widgets_app", self.widgets_app()?.into());
            nspace.insert("widgets_root", self.widgets_root().into());
            nspace.insert("fixtures", self.fixtures()?.into());
            nspace.insert("templatetags", self.templatetags()?.into());
            nspace.insert("list_display", self.list_display().into());
            nspace.insert("search_fields", self.search_fields().into());
        }

        Ok(nspace)
    }

    pub fn to_yaml(&self) -> Result<String, NamespaceError> {
        Ok(serde_yaml::to_string(&self.to_dict()?)?)
    }
}

impl<L: Lens> fmt::Display for Namespace<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Namespace model:'{}' app:'{}'>",
            self.model().unwrap_or_default(),
            self.app().unwrap_or_default()
        )
    }
}

fn parent_of(structure: &[&str]) -> String {
    structure
        .get(..structure.len().saturating_sub(1))
        .unwrap_or_default()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::field::{Field, FieldSpec, FieldType, IndexRole};
    use crate::lens::Sqlite;
    use crate::model::{ModelInfo, Properties};
    use std::path::Path;

    const OUTPUT: &str = "out/data";

    fn node(properties: Properties, kind: NamespaceKind) -> Model<Sqlite> {
        let options = Options::default().with_output(OUTPUT);
        Model::from_parts(
            ModelInfo::new("node")
                .with_properties(properties)
                .with_options(options.clone()),
            vec![
                Field::new(FieldSpec::new("id", FieldType::Serial).with_index(IndexRole::Pk), options.clone()),
                Field::new(FieldSpec::new("name", FieldType::Str).with_index(IndexRole::Sk), options),
            ],
            Vec::new(),
            Some(kind),
        )
    }

    fn props() -> Properties {
        Properties::from([
            ("app".to_string(), "app.core".to_string()),
            ("model".to_string(), "app.core.models.Node".to_string()),
        ])
    }

    #[test]
    fn test_namespace_core_values() {
        let model = node(props(), NamespaceKind::Package);
        let nspace = model.nspace().unwrap();

        assert_eq!(nspace.model().unwrap(), "app.core.models.Node");
        assert_eq!(nspace.app().unwrap(), "app.core");
        assert_eq!(nspace.model_classname().unwrap(), "Node");
        assert_eq!(nspace.app_name().unwrap(), "core");
        assert_eq!(
            nspace.to_string(),
            "<Namespace model:'app.core.models.Node' app:'app.core'>"
        );
        assert_eq!(nspace.app_level().unwrap(), 2);
        assert_eq!(nspace.model_classname_title().unwrap(), "Node");
        assert_eq!(nspace.model_classname_plural().unwrap(), "Nodes");
        assert_eq!(nspace.model_classname_plural_title().unwrap(), "Nodes");
        assert_eq!(nspace.app_name_plural().unwrap(), "cores");
        assert_eq!(nspace.app_parent().unwrap(), "app");
        assert_eq!(nspace.app_parent_name().unwrap(), "app");
        assert_eq!(nspace.model_parent().unwrap(), "app.core.models");

        assert_eq!(nspace.path_base().unwrap(), Path::new("core"));
        assert_eq!(nspace.path().unwrap(), Path::new(OUTPUT).join("core"));
        assert_eq!(nspace.path_parent().unwrap(), Path::new(OUTPUT));

        let dict = nspace.to_dict().unwrap();
        assert_eq!(dict["app_level"], NsValue::Int(2));
        assert!(!dict.contains_key("url"));
    }

    #[test]
    fn test_django_app_values() {
        let model = node(props(), NamespaceKind::DjangoApp);
        let nspace = model.nspace().unwrap();
        let dict = nspace.to_dict().unwrap();

        assert_eq!(dict["url"], NsValue::from("core"));
        assert_eq!(dict["url_list"], NsValue::from("list-core"));
        assert_eq!(
            dict["search_fields"],
            NsValue::List(vec!["name".to_string()])
        );
        assert_eq!(
            nspace.widgets_app().unwrap(),
            Path::new(OUTPUT).join("core").join("templates").join("widgets")
        );
        assert!(nspace.to_yaml().unwrap().contains("url_delete: delete-core"));
    }

    #[test]
    fn test_missing_properties_fail_distinctly() {
        let model = node(Properties::new(), NamespaceKind::Package);
        let nspace = model.nspace().unwrap();
        let err = nspace.to_dict().unwrap_err();
        assert!(matches!(
            err,
            NamespaceError::MissingProperty { property: "app", .. }
        ));
        assert!(err.to_string().contains("'node'"));
    }

    #[test]
    fn test_no_namespace_without_kind() {
        let model = Model::<Sqlite>::new("plain", Vec::new());
        assert!(model.nspace().is_none());
    }
}
