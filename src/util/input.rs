//! Small input helpers shared by the command runners.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::application::error::AppError;

/// Inline value or file contents; the file wins when both are given.
pub fn read_opt_value(
    value: Option<String>,
    file: Option<PathBuf>,
) -> Result<Option<String>, AppError> {
    if let Some(path) = file {
        let data = fs::read_to_string(&path).map_err(|err| {
            AppError::validation(format!(
                "failed to read input file {}: {err}",
                path.display()
            ))
        })?;
        return Ok(Some(data));
    }
    Ok(value)
}

/// Parse "lat,lon" coordinates.
pub fn parse_coords(raw: &str) -> Result<(f64, f64), AppError> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| AppError::validation("coordinates must look like \"lat,lon\""))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|err| AppError::validation(format!("invalid latitude: {err}")))?;
    let lon = lon
        .trim()
        .parse::<f64>()
        .map_err(|err| AppError::validation(format!("invalid longitude: {err}")))?;
    Ok((lat, lon))
}

/// Synchronous y/N confirmation on stdin. Anything but an explicit yes
/// declines.
pub fn confirm(prompt: &str) -> Result<bool, AppError> {
    print!("{prompt} [y/N] ");
    io::stdout()
        .flush()
        .map_err(|err| AppError::unexpected(err.to_string()))?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .map_err(|err| AppError::unexpected(err.to_string()))?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
