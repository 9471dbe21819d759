pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Resolve command input: `--input` file first, then piped stdin.
///
/// Returns `None` when neither is available so the caller can fall back
/// to building the input from flags.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_document(path)?));
    }
    match stdin::read_stdin()? {
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
        None => Ok(None),
    }
}
