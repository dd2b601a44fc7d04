use std::fs;
use std::io::{self, prelude::*};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use fragtoprec::{LinkingReport, PrecursorSearchReport};

use crate::driver::FragToPrecerError;

pub const SPECIES_FILE: &str = "species.json";
pub const PRECURSORS_FILE: &str = "precursors.json";

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), FragToPrecerError> {
    let mut handle = io::BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut handle, value)?;
    handle.write_all(b"\n")?;
    handle.flush()?;
    Ok(())
}

/// Write the species keyed by identifier to `species.json` in `output_dir`
pub fn write_species(
    output_dir: &Path,
    report: &LinkingReport,
) -> Result<PathBuf, FragToPrecerError> {
    let path = output_dir.join(SPECIES_FILE);
    write_json(&path, &report.species)?;
    info!("Wrote {} species to {}", report.len(), path.display());
    Ok(path)
}

/// Write the precursor match groups keyed by identifier to `precursors.json` in `output_dir`
pub fn write_precursors(
    output_dir: &Path,
    report: &PrecursorSearchReport,
) -> Result<PathBuf, FragToPrecerError> {
    let path = output_dir.join(PRECURSORS_FILE);
    write_json(&path, &report.groups)?;
    info!(
        "Wrote {} precursor groups to {}",
        report.len(),
        path.display()
    );
    Ok(path)
}
