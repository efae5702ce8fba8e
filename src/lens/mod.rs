//! Target-language lenses: one marker type per output flavor.

mod haskell;
mod jvm;
mod python;
mod sql;

use crate::field::{FieldType, Lens, TypeTable};

pub use haskell::Haskell;
pub use jvm::{Java, Scala};
pub use python::{Django, FactoryBoy, SqlAlchemy};
pub use sql::{Abap, PgEnum, Postgres, Sql, Sqlite};

/// Language-neutral lens produced by readers. Types map onto their own names
/// and nothing can be rendered until the schema is specialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Plain;

impl Lens for Plain {
    const NAME: &'static str = "Plain";
    const TYPES: TypeTable = &[
        (FieldType::Serial, "serial"),
        (FieldType::Str, "str"),
        (FieldType::Txt, "txt"),
        (FieldType::Date, "date"),
        (FieldType::Time, "time"),
        (FieldType::Interval, "interval"),
        (FieldType::Bool, "bool"),
        (FieldType::Int, "int"),
        (FieldType::Dec, "dec"),
        (FieldType::Float, "float"),
        (FieldType::Double, "double"),
        (FieldType::Numeric, "numeric"),
    ];
}

/// Python-style boolean literal.
pub(crate) const fn py_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_is_identity() {
        for ftype in FieldType::ALL {
            assert_eq!(Plain::lookup(ftype), Some(ftype.as_str()));
        }
    }
}
