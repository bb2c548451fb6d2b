use std::fs;
use std::path::PathBuf;

pub fn read_test_file(filename: &str) -> String {
    let path = PathBuf::from("src/cfu/parsing/tests/data").join(filename);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read test file {}: {}", path.display(), e))
}
