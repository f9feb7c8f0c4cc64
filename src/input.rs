use std::fs;
use std::io::{self, Read};
use std::path::Path;

use tracing::debug;

use crate::error::{FlameError, Result};

const PERF_HEADER: &[u8; 8] = b"PERFILE2";

/// Reads a folded stack file.
///
/// Raw `perf.data` recordings are rejected: they have to be turned into
/// folded stacks (`perf script | stackcollapse-perf`) first.
pub fn from_file(path: &Path) -> Result<String> {
    let file = fs::File::open(path).map_err(|e| FlameError::io(path, e))?;
    from_reader(file, path)
}

pub fn from_stdin() -> Result<String> {
    from_reader(io::stdin().lock(), Path::new("<stdin>"))
}

/// Reads everything from `reader`. Bytes that aren't valid UTF-8 are
/// replaced rather than failing the build; `source` names the input in errors.
pub fn from_reader<R: Read>(mut reader: R, source: &Path) -> Result<String> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| FlameError::io(source, e))?;
    if bytes.starts_with(PERF_HEADER) {
        return Err(FlameError::UnsupportedInput {
            path: source.to_path_buf(),
        });
    }
    debug!(source = %source.display(), bytes = bytes.len(), "read input");
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Concatenates the given files in order, or reads stdin when there are none.
pub fn read_all<P: AsRef<Path>>(paths: &[P]) -> Result<String> {
    if paths.is_empty() {
        return from_stdin();
    }
    let mut text = String::new();
    for path in paths {
        text.push_str(&from_file(path.as_ref())?);
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
    }
    Ok(text)
}
