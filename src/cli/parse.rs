//! Parse command implementation.

use super::CliError;
use std::fs;
use std::path::Path;

/// Execute the parse command: print the program in canonical form.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub(crate) fn execute(file: &Path) -> Result<(), CliError> {
    let text = fs::read_to_string(file)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", file.display())))?;
    let program = critterworld::parse(&text)?;
    print!("{program}");
    Ok(())
}
