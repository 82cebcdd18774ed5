// src/output.rs
//! Sample path export
//!
//! Each exported path becomes one line: every price followed by a comma,
//! then a newline. There is no header row.
//! ```text
//! 100,101.3,99.8,...,104.2,
//! ```

use crate::error::{McError, McResult};
use crate::mc::paths::PathMatrix;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Number of paths written by [`export_sample_paths`]
pub const SAMPLE_PATH_ROWS: usize = 10;

/// File name used when no export target is given
pub const DEFAULT_PATHS_FILE: &str = "paths.csv";

/// Write the first `rows` paths (or all of them, if fewer) to `out`
pub fn write_sample_paths<W: Write>(
    out: &mut W,
    paths: &PathMatrix,
    rows: usize,
) -> io::Result<()> {
    for row in paths.rows().take(rows) {
        for price in row.iter() {
            write!(out, "{},", price)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Write the first [`SAMPLE_PATH_ROWS`] paths to `filename`
pub fn export_sample_paths<P: AsRef<Path>>(filename: P, paths: &PathMatrix) -> McResult<()> {
    let filename = filename.as_ref();
    let to_error = |e: io::Error| McError::Export {
        path: filename.display().to_string(),
        reason: e.to_string(),
    };

    let file = File::create(filename).map_err(to_error)?;
    let mut out = BufWriter::new(file);
    write_sample_paths(&mut out, paths, SAMPLE_PATH_ROWS).map_err(to_error)?;
    out.flush().map_err(to_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let matrix = PathMatrix::try_zeros(2, 3).expect("small allocation");
        let mut buffer = Vec::new();
        write_sample_paths(&mut buffer, &matrix, 10).expect("in-memory write");

        let text = String::from_utf8(buffer).expect("utf-8 output");
        assert_eq!(text, "0,0,0,\n0,0,0,\n");
    }

    #[test]
    fn test_row_limit() {
        let matrix = PathMatrix::try_zeros(25, 4).expect("small allocation");
        let mut buffer = Vec::new();
        write_sample_paths(&mut buffer, &matrix, SAMPLE_PATH_ROWS).expect("in-memory write");

        let text = String::from_utf8(buffer).expect("utf-8 output");
        assert_eq!(text.lines().count(), SAMPLE_PATH_ROWS);
        assert!(text.lines().all(|line| line.split(',').count() == 5));
    }

    #[test]
    fn test_export_to_unwritable_location() {
        let matrix = PathMatrix::try_zeros(1, 2).expect("small allocation");
        let err = export_sample_paths("/nonexistent-dir/paths.csv", &matrix).unwrap_err();
        assert!(matches!(err, McError::Export { .. }));
    }
}
