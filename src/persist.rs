use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tempfile::Builder;

use crate::error::StoreError;

/// Writes `value` as four-space-indented JSON, replacing `path` in one rename.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let mut serializer =
        Serializer::with_formatter(Vec::new(), PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .map_err(|source| StoreError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
    let bytes = serializer.into_inner();

    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut builder = Builder::new();
    // Temp files default to 0600; new files get 0666 less the umask like fs::write.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut file = builder.tempfile_in(dir).map_err(write_err)?;
    if let Ok(existing) = fs::metadata(path) {
        file.as_file()
            .set_permissions(existing.permissions())
            .map_err(write_err)?;
    }
    file.write_all(&bytes).map_err(write_err)?;
    file.persist(path).map_err(|err| write_err(err.error))?;
    Ok(())
}

#[test]
fn writes_four_space_indent_and_replaces() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");
    fs::write(&path, "stale").unwrap();

    write_json(&path, &serde_json::json!({"after_cursor": "é", "post_count": 3})).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "{\n    \"after_cursor\": \"é\",\n    \"post_count\": 3\n}"
    );
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[cfg(unix)]
#[test]
fn keeps_regular_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let mode = |path: &Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;

    let plain = dir.path().join("plain.json");
    fs::write(&plain, "[]").unwrap();
    let fresh = dir.path().join("fresh.json");
    write_json(&fresh, &serde_json::json!([])).unwrap();
    assert_eq!(mode(&fresh), mode(&plain));

    let shared = dir.path().join("shared.json");
    fs::write(&shared, "[]").unwrap();
    fs::set_permissions(&shared, fs::Permissions::from_mode(0o640)).unwrap();
    write_json(&shared, &serde_json::json!([1])).unwrap();
    assert_eq!(mode(&shared), 0o640);
}
