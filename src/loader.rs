use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value;
use tracing::warn;

use crate::error::LoadError;

/// Loads a JSON array of posts, retrying as Latin-1 when the file is not UTF-8.
pub fn load_json_file(path: &Path) -> Result<Vec<Value>, LoadError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let data = match String::from_utf8(bytes) {
        Ok(text) => serde_json::from_str(&text).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?,
        Err(utf8) => {
            warn!(path = %path.display(), error = %utf8, "file is not UTF-8, retrying as Latin-1");
            let text: String = utf8.as_bytes().iter().map(|&b| char::from(b)).collect();
            serde_json::from_str(&text).map_err(|latin1| LoadError::Encoding {
                path: path.to_path_buf(),
                utf8,
                latin1,
            })?
        }
    };

    match data {
        Value::Array(posts) => Ok(posts),
        other => Err(LoadError::NotAList(kind(&other))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        fs::write(&path, r#"[{"code": "a"}, {"code": "b"}]"#).unwrap();
        assert_eq!(load_json_file(&path).unwrap().len(), 2);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert!(matches!(load_json_file(&path), Err(LoadError::NotFound(p)) if p == path));
    }

    #[test]
    fn object_is_not_a_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"after_cursor": null, "post_count": 0}"#).unwrap();
        assert!(matches!(
            load_json_file(&path),
            Err(LoadError::NotAList("object"))
        ));
    }

    #[test]
    fn invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        fs::write(&path, "[{").unwrap();
        assert!(matches!(load_json_file(&path), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn latin1_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        // "café" with a single 0xE9 byte.
        fs::write(&path, b"[{\"caption\": \"caf\xe9\"}]").unwrap();
        let posts = load_json_file(&path).unwrap();
        assert_eq!(posts[0]["caption"], "café");
    }

    #[test]
    fn neither_utf8_nor_latin1_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        fs::write(&path, b"\xff\xfe[").unwrap();
        assert!(matches!(
            load_json_file(&path),
            Err(LoadError::Encoding { .. })
        ));
    }
}
