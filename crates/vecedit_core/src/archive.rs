//! Save archive codec: a single gzip member wrapping a UTF-8 JSON document.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::core_api::{CoreError, CoreErrorCode};
use crate::document::Document;

/// The game writes its saves indented by four spaces.
const JSON_INDENT: &[u8] = b"    ";

pub fn decode(bytes: &[u8]) -> Result<Document, CoreError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut payload = Vec::new();
    decoder.read_to_end(&mut payload).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Format,
            format!("failed to decompress save archive: {e}"),
        )
    })?;

    let value: Value = serde_json::from_slice(&payload).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Format,
            format!("save payload is not valid JSON: {e}"),
        )
    })?;
    let document = Document::from_value(value)?;

    tracing::debug!(
        target: "vecedit::archive",
        compressed_len = bytes.len(),
        payload_len = payload.len(),
        top_level_keys = document.root().len(),
        "archive.decoded"
    );
    Ok(document)
}

pub fn encode(document: &Document) -> Result<Vec<u8>, CoreError> {
    let payload = to_json_pretty(document)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&payload).map_err(compress_error)?;
    let bytes = encoder.finish().map_err(compress_error)?;

    tracing::debug!(
        target: "vecedit::archive",
        payload_len = payload.len(),
        compressed_len = bytes.len(),
        "archive.encoded"
    );
    Ok(bytes)
}

fn compress_error(e: std::io::Error) -> CoreError {
    CoreError::new(
        CoreErrorCode::Io,
        format!("failed to compress save archive: {e}"),
    )
}

/// Uncompressed JSON text of the document, indented the way the game writes it.
pub fn to_json_pretty(document: &Document) -> Result<Vec<u8>, CoreError> {
    let mut payload = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut payload, PrettyFormatter::with_indent(JSON_INDENT));
    document.root().serialize(&mut serializer).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Format,
            format!("failed to serialize save document: {e}"),
        )
    })?;
    Ok(payload)
}

pub fn load(path: &Path) -> Result<Document, CoreError> {
    let bytes = fs::read(path).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Io,
            format!("failed to read {}: {e}", path.display()),
        )
    })?;
    decode(&bytes)
}

/// Encodes and writes the document. The archive is written to a sibling
/// temporary file first and renamed over `path`, so a failed save never
/// leaves a truncated file behind.
pub fn save(document: &Document, path: &Path) -> Result<(), CoreError> {
    let bytes = encode(document)?;
    let temp_path = temp_sibling_path(path);

    let written = fs::write(&temp_path, &bytes).and_then(|_| fs::rename(&temp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(CoreError::new(
            CoreErrorCode::Io,
            format!("failed to write {}: {e}", path.display()),
        ));
    }

    tracing::info!(
        target: "vecedit::archive",
        path = %path.display(),
        len = bytes.len(),
        "archive.saved"
    );
    Ok(())
}

fn temp_sibling_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}
