//! Render-time options and static configuration.

use std::path::PathBuf;

/// Column at which trailing definition comments are right-aligned.
pub const TEMPLATE_COMMENT_OFFSET: usize = 55;

/// Action that drops the model prefix from rendered field names.
pub const NOPREFIX: &str = "noprefix";

/// Recognised values of a field's `action` column.
pub const ACTIONS: &[&str] = &[NOPREFIX];

/// Field attributes in constructor order.
pub const METAFIELDS: [&str; 10] = [
    "name",
    "type",
    "length",
    "index",
    "required",
    "default",
    "constraint",
    "category",
    "action",
    "description",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Root directory generated files and namespace paths are relative to.
    pub output: PathBuf,
    /// 0 disables trailing comments on rendered definitions.
    pub comment_offset: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            output: PathBuf::from(".xlschema/data/output"),
            comment_offset: TEMPLATE_COMMENT_OFFSET,
        }
    }
}

impl Options {
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_comment_offset(mut self, offset: usize) -> Self {
        self.comment_offset = offset;
        self
    }
}
