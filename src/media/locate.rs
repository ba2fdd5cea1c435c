use std::{
    io,
    path::{Path, PathBuf},
};

use tokio::fs;

use crate::errors::{ConvertError, ConvertResult};

/// A file found on disk after acquisition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedFile {
    pub filename: String,
    pub path: PathBuf,
}

/// Finds the produced file.
///
/// The exact `expected_path` is the normal case. When it is absent, falls
/// back to a best-effort scan of `directory` for any regular file named
/// `{sanitized_title}*` with an accepted extension; the first hit in
/// listing order wins.
pub async fn locate(
    expected_path: &Path,
    directory: &Path,
    sanitized_title: &str,
    accepted_extensions: &[&str],
) -> ConvertResult<LocatedFile> {
    if is_file(expected_path).await? {
        return Ok(LocatedFile {
            filename: file_name(expected_path),
            path: expected_path.to_path_buf(),
        });
    }

    // best-effort fallback
    let mut entries = match fs::read_dir(directory).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ConvertError::artifact_not_found(sanitized_title));
        }
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(sanitized_title) || !has_accepted_extension(&name, accepted_extensions) {
            continue;
        }

        let path = entry.path();
        if is_file(&path).await? {
            log::warn!(
                "Expected {} was not produced, using {} instead",
                expected_path.display(),
                path.display()
            );
            return Ok(LocatedFile { filename: name, path });
        }
    }

    Err(ConvertError::artifact_not_found(sanitized_title))
}

fn has_accepted_extension(name: &str, accepted_extensions: &[&str]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            accepted_extensions
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

async fn is_file(path: &Path) -> ConvertResult<bool> {
    match fs::metadata(path).await {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
