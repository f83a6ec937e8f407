use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::cv::form::CvForm;

/// Reads a CV form from a JSON file. Missing lists come back with one blank item.
pub fn load_form(path: &Path) -> Result<CvForm> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read CV form from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid CV form", path.display()))
}

/// Writes a CV form as pretty-printed JSON, replacing the file.
pub fn save_form(path: &Path, form: &CvForm) -> Result<()> {
    let json = serde_json::to_string_pretty(form).context("Failed to serialize CV form")?;
    fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write CV form to {}", path.display()))
}
