pub mod config;
pub mod enums;
pub mod field;
pub mod lens;
pub mod model;
pub mod namespace;
pub mod reader;
pub mod schema;
pub mod text;
pub mod value;
pub mod writer;

use wasm_bindgen::prelude::*;

use config::Options;
use reader::YamlReader;
use writer::{WriteError, Writer, WriterKind};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Render a YAML schema with the writer registered as `writer`
/// (e.g. `sql/sqlite`).
#[wasm_bindgen(js_name = "yamlToCode")]
pub fn yaml_to_code(source: &str, writer: &str) -> Result<String, String> {
    let kind = WriterKind::from_str(writer)
        .ok_or_else(|| WriteError::UnknownWriter(writer.to_string()).to_string())?;
    let options = Options::default();
    let schema = YamlReader::new(options.clone())
        .read_str(source, "schema")
        .map_err(|e| e.to_string())?;
    Writer::new(&schema, kind, options)
        .render()
        .map_err(|e| e.to_string())
}
