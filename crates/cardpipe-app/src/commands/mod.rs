//! Subcommand handlers. Each writes to a caller-supplied sink so it can run
//! against stdout or an in-memory buffer.

mod export;
mod fields;
mod import;

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

pub use export::{ExportSummary, read_contacts, run_export};
pub use fields::run_fields;
pub use import::{ImportSummary, run_import};

/// ## Summary
/// Opens `path` for reading; `-` is stdin.
///
/// ## Errors
/// Returns an error if the file cannot be opened.
pub fn open_input(path: &Path) -> io::Result<Box<dyn Read + Send>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(io::stdin()));
    }
    Ok(Box::new(BufReader::new(File::open(path)?)))
}
