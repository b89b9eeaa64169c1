use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Opens a local input file, gunzipping it when the name ends in `.gz`.
#[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn open_input(path: impl AsRef<Path>) -> Result<Box<dyn Read>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open input '{}'", path.display()))?;
    let reader = BufReader::new(file);

    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}
