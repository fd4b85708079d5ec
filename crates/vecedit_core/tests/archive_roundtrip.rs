use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use flate2::Compression;
use flate2::write::GzEncoder;
use proptest::prelude::*;
use serde_json::{Map, Value, json};
use vecedit_core::archive;
use vecedit_core::core_api::CoreErrorCode;
use vecedit_core::document::Document;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_document() -> Document {
    let path = workspace_root().join("tests/fixtures/world_1.json");
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    let value: Value = serde_json::from_str(&text).expect("fixture should be valid JSON");
    Document::from_value(value).expect("fixture root should be a mapping")
}

fn gzip(payload: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload).expect("failed to compress payload");
    encoder.finish().expect("failed to finish gzip stream")
}

fn temp_dir(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "vecedit_{label}_{}_{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn keys(map: &Map<String, Value>) -> Vec<&str> {
    map.keys().map(String::as_str).collect()
}

fn region_entity_keys<'a>(doc: &'a Document, region: &str) -> Vec<&'a str> {
    let path = format!("regions.{region}.entities");
    keys(
        doc.get(path.as_str())
            .expect("region entities should exist")
            .as_object()
            .expect("entities should be a mapping"),
    )
}

#[test]
fn fixture_survives_encode_decode_with_key_order() {
    let doc = fixture_document();
    let bytes = archive::encode(&doc).expect("failed to encode fixture");
    let decoded = archive::decode(&bytes).expect("failed to decode fixture archive");

    assert_eq!(decoded, doc);
    assert_eq!(keys(decoded.root()), keys(doc.root()));
    assert_eq!(
        region_entity_keys(&decoded, "region_the_abyss"),
        region_entity_keys(&doc, "region_the_abyss")
    );
}

#[test]
fn reencoded_archive_decompresses_to_equivalent_json() {
    let doc = fixture_document();
    let original = gzip(&serde_json::to_vec(&doc.to_value()).expect("serialize fixture"));

    let reencoded = archive::encode(&archive::decode(&original).expect("decode original"))
        .expect("re-encode");
    let mut decoder = flate2::read::GzDecoder::new(reencoded.as_slice());
    let mut payload = String::new();
    std::io::Read::read_to_string(&mut decoder, &mut payload).expect("decompress re-encoded");
    let value: Value = serde_json::from_str(&payload).expect("re-encoded payload is JSON");

    assert_eq!(value, doc.to_value());
}

#[test]
fn pretty_payload_uses_four_space_indent() {
    let doc = Document::from_value(json!({"Name": "a", "Seed": 1})).expect("mapping root");
    let text = String::from_utf8(archive::to_json_pretty(&doc).expect("pretty json"))
        .expect("utf-8 payload");
    assert_eq!(text, "{\n    \"Name\": \"a\",\n    \"Seed\": 1\n}");
}

#[test]
fn decode_rejects_bytes_that_are_not_gzip() {
    let err = archive::decode(b"{\"Name\": \"plain json\"}").expect_err("plain JSON is not an archive");
    assert_eq!(err.code, CoreErrorCode::Format);
}

#[test]
fn decode_rejects_gzip_of_non_json() {
    let err = archive::decode(&gzip(b"not json at all")).expect_err("payload is not JSON");
    assert_eq!(err.code, CoreErrorCode::Format);
}

#[test]
fn decode_rejects_non_mapping_root() {
    let err = archive::decode(&gzip(b"[1, 2, 3]")).expect_err("root must be a mapping");
    assert_eq!(err.code, CoreErrorCode::Format);
    assert!(err.message.contains("a sequence"));
}

#[test]
fn decode_accepts_mapping_without_known_keys() {
    let doc = archive::decode(&gzip(b"{\"Unrelated\": true}")).expect("schema is checked lazily");
    assert_eq!(doc.get_bool("Unrelated"), Ok(true));
}

#[test]
fn save_then_load_returns_same_document() {
    let dir = temp_dir("save_load");
    let path = dir.join("world_1.sav");
    let doc = fixture_document();

    archive::save(&doc, &path).expect("failed to save archive");
    let loaded = archive::load(&path).expect("failed to load saved archive");
    assert_eq!(loaded, doc);

    let leftovers: Vec<_> = fs::read_dir(&dir)
        .expect("read temp dir")
        .filter_map(Result::ok)
        .map(|entry| entry.file_name())
        .collect();
    assert_eq!(leftovers.len(), 1, "only the saved archive should remain");

    fs::remove_dir_all(&dir).expect("failed to clean temp dir");
}

#[test]
fn save_into_missing_directory_is_io_error() {
    let dir = temp_dir("save_missing");
    let missing = dir.join("no_such_dir");
    let path = missing.join("world_1.sav");

    let err = archive::save(&fixture_document(), &path).expect_err("directory does not exist");
    assert_eq!(err.code, CoreErrorCode::Io);
    assert!(!path.exists());
    assert!(!missing.exists());

    fs::remove_dir_all(&dir).expect("failed to clean temp dir");
}

#[test]
fn load_of_missing_file_is_io_error() {
    let err = archive::load(Path::new("/nonexistent/vecedit/world.sav"))
        .expect_err("file does not exist");
    assert_eq!(err.code, CoreErrorCode::Io);
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e9f64..1.0e9).prop_map(Value::from),
        "[ -~]{0,12}".prop_map(Value::String),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[A-Za-z_]{1,8}", inner), 0..6)
                .prop_map(|entries| Value::Object(entries.into_iter().collect())),
        ]
    })
}

fn arb_document() -> impl Strategy<Value = Document> {
    prop::collection::vec(("[A-Za-z_]{1,8}", arb_value()), 0..8).prop_map(|entries| {
        Document::from_value(Value::Object(entries.into_iter().collect::<Map<_, _>>()))
            .expect("generated root is a mapping")
    })
}

proptest! {
    #[test]
    fn decode_inverts_encode(doc in arb_document()) {
        let bytes = archive::encode(&doc).expect("encode generated document");
        let decoded = archive::decode(&bytes).expect("decode generated archive");
        prop_assert_eq!(keys(decoded.root()), keys(doc.root()));
        prop_assert_eq!(decoded, doc);
    }
}
