//! Template output: serialization, fingerprinting, and file writes.

use super::error::{Error, Result};
use super::types::Template;
use std::path::Path;

/// Output document format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

/// Serialize a template. JSON output is pretty-printed with a trailing newline.
pub fn render(template: &Template, format: Format) -> Result<String> {
    match format {
        Format::Json => {
            let mut out = serde_json::to_string_pretty(template)?;
            out.push('\n');
            Ok(out)
        }
        Format::Yaml => Ok(serde_yaml_ng::to_string(template)?),
    }
}

/// BLAKE3 digest of rendered output. Returns `"blake3:{hex}"`.
pub fn fingerprint(text: &str) -> String {
    format!("blake3:{}", blake3::hash(text.as_bytes()).to_hex())
}

/// Write a file atomically (write to temp, then rename).
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io("create dir", parent, e))?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, contents).map_err(|e| Error::io("write", &tmp_path, e))?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(Error::io("rename", &tmp_path, e));
    }
    Ok(())
}
