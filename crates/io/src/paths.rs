// Output naming

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::IoError;

/// `"<dir>/<input stem> - <file_name> - <suffix>.xlsx"`, where `dir` is
/// `out_dir` or the input's own directory.
pub fn output_path_for_institution(
    input: &Path,
    out_dir: Option<&Path>,
    file_name: &str,
    suffix: &str,
) -> PathBuf {
    output_dir(input, out_dir).join(format!("{} - {} - {}.xlsx", stem(input), file_name, suffix))
}

/// `"<dir>/<input stem> - <suffix>.xlsx"`, the single-workbook counterpart.
pub fn output_path_single(input: &Path, out_dir: Option<&Path>, suffix: &str) -> PathBuf {
    output_dir(input, out_dir).join(format!("{} - {}.xlsx", stem(input), suffix))
}

fn stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn output_dir(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    }
}

/// Write `bytes` to `path` without replacing anything on disk.
///
/// When `path` exists, `"<stem> (1).<ext>"`, `"<stem> (2).<ext>"`, ... are
/// tried in turn. Files are created exclusively, so a file appearing between
/// the check and the write is never clobbered. Returns the path written.
pub fn write_new_file(path: &Path, bytes: &[u8]) -> Result<PathBuf, IoError> {
    let mut candidate = path.to_path_buf();
    let mut n = 0u32;
    loop {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut file) => {
                file.write_all(bytes).map_err(|e| IoError::Write {
                    path: candidate.clone(),
                    message: e.to_string(),
                })?;
                if n > 0 {
                    log::warn!(
                        "{} exists, wrote {} instead",
                        path.display(),
                        candidate.display()
                    );
                }
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                n += 1;
                candidate = numbered(path, n);
            }
            Err(e) => {
                return Err(IoError::Write {
                    path: candidate,
                    message: e.to_string(),
                })
            }
        }
    }
}

fn numbered(path: &Path, n: u32) -> PathBuf {
    let stem = stem(path);
    let name = match path.extension() {
        Some(ext) => format!("{} ({}).{}", stem, n, ext.to_string_lossy()),
        None => format!("{} ({})", stem, n),
    };
    path.with_file_name(name)
}
