use std::fs;
use std::io::Write;
use tempfile::TempDir;

use sitebot_core::data_processor::DocumentLoader;
use sitebot_core::types::Chunk;

#[test]
fn load_directory_single_small_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let file_path = dir.join("a.txt");
    let mut f = fs::File::create(&file_path).unwrap();
    writeln!(f, "Short text").unwrap();

    let loader = DocumentLoader::new();
    let docs = loader.load_directory(dir).expect("load");

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].source_id, "a.txt");
    assert_eq!(docs[0].text.trim(), "Short text");
}

#[test]
fn load_directory_skips_other_extensions_and_recurses() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("bridges")).unwrap();
    fs::write(dir.join("bridges/abutment.txt"), "abutment notes").unwrap();
    fs::write(dir.join("drawing.pdf"), [0u8, 159, 146, 150]).unwrap();
    fs::write(dir.join("b.txt"), "beam notes").unwrap();

    let docs = DocumentLoader::new().load_directory(dir).expect("load");
    let ids: Vec<&str> = docs.iter().map(|d| d.source_id.as_str()).collect();
    assert_eq!(ids, vec!["b.txt", "abutment.txt"]);
}

#[test]
fn load_directory_limited_two_files_limit_one() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.txt"), "alpha bravo").unwrap();
    fs::write(dir.join("b.txt"), "charlie delta").unwrap();

    let docs = DocumentLoader::with_limit(1).load_directory(dir).expect("load limited");
    assert_eq!(docs.len(), 1, "limited to one source document");
}

#[test]
fn invalid_utf8_is_read_lossily() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.txt");
    fs::write(&path, [b'o', b'k', 0xff, b'!']).unwrap();

    let doc = DocumentLoader::new().load_file(&path).expect("load");
    assert!(doc.text.starts_with("ok"));
    assert!(doc.text.ends_with('!'));
}

#[test]
fn chunk_ids_are_unique_and_serializable() {
    let a = Chunk::new("doc.pdf", 0, "first");
    let b = Chunk::new("doc.pdf", 1, "second");
    assert_ne!(a.id, b.id);

    let json = serde_json::to_string(&a).unwrap();
    let back: Chunk = serde_json::from_str(&json).unwrap();
    assert_eq!(back, a);
}
