use std::fs::{self, DirEntry, File};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{debug, warn};
use thiserror::Error;

use crate::data::{Condition, ConditionSet, Sample, Shot};

/// Sub-directory that the acquisition software writes Langmuir shots into.
pub const LANGMUIR_SUBDIR: &str = "DLP";

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("{path:?} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed delimited data in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path:?} line {line}: expected time and voltage columns")]
    MissingColumn { path: PathBuf, line: u64 },

    #[error("{path:?} line {line}: failed to parse {column} from value '{value}'")]
    ParseNumber {
        path: PathBuf,
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("{path:?} contains no samples")]
    EmptyShot { path: PathBuf },

    #[error("{path:?} is not valid UTF-8 and cannot name a condition or shot")]
    NonUtf8Name { path: PathBuf },

    #[error("failed to load condition '{condition}'")]
    Condition {
        condition: String,
        #[source]
        source: Box<LoaderError>,
    },
}

/// Use the `DLP` child of `input` when present, otherwise `input` itself.
pub fn resolve_data_root(input: &Path) -> PathBuf {
    let nested = input.join(LANGMUIR_SUBDIR);
    if nested.is_dir() {
        debug!("descending into {:?}", nested);
        nested
    } else {
        input.to_path_buf()
    }
}

/// Load every condition folder directly below `root`.
///
/// Conditions and the shots inside them are visited in file-name order so the
/// result does not depend on how the platform enumerates directories.
pub fn load_conditions(root: &Path) -> Result<ConditionSet, LoaderError> {
    let mut conditions = ConditionSet::new();
    for entry in sorted_entries(root)? {
        let path = entry.path();
        if !path.is_dir() {
            warn!("skipping {:?}: condition entries must be directories", path);
            continue;
        }
        let name = entry_name(&entry)?;
        let condition =
            load_condition(&path, name.clone()).map_err(|source| LoaderError::Condition {
                condition: name.clone(),
                source: Box::new(source),
            })?;
        debug!(
            "loaded condition '{}' with {} shot(s)",
            name,
            condition.shots.len()
        );
        conditions.insert(name, condition);
    }
    Ok(conditions)
}

/// Load the shot files of a single condition folder.
pub fn load_condition(dir: &Path, name: String) -> Result<Condition, LoaderError> {
    let mut shots = Vec::new();
    for entry in sorted_entries(dir)? {
        let path = entry.path();
        let file_name = entry_name(&entry)?;
        if file_name.starts_with('.') {
            warn!("skipping hidden file {:?}", path);
            continue;
        }
        if path.is_dir() {
            warn!("skipping nested directory {:?}", path);
            continue;
        }
        let mut shot = load_shot(&path)?;
        shot.name = file_name;
        shots.push(shot);
    }
    Ok(Condition { name, shots })
}

/// Parse a tab-delimited `time<TAB>voltage` file without a header row.
///
/// Columns beyond the second are ignored; blank lines are skipped.
pub fn load_shot(path: &Path) -> Result<Shot, LoaderError> {
    let file = File::open(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let mut samples = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| LoaderError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let line = record.position().map_or(0, |pos| pos.line());
        let (Some(time), Some(voltage)) = (record.get(0), record.get(1)) else {
            return Err(LoaderError::MissingColumn {
                path: path.to_path_buf(),
                line,
            });
        };
        samples.push(Sample {
            time: parse_number(path, line, "time", time)?,
            voltage: parse_number(path, line, "voltage", voltage)?,
        });
    }

    if samples.is_empty() {
        return Err(LoaderError::EmptyShot {
            path: path.to_path_buf(),
        });
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Shot { name, samples })
}

/// Parse one numeric field. `nan` and `inf` spellings are rejected along with
/// other non-numeric text.
fn parse_number(path: &Path, line: u64, column: &'static str, value: &str) -> Result<f64, LoaderError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| LoaderError::ParseNumber {
            path: path.to_path_buf(),
            line,
            column,
            value: value.to_string(),
        })
}

/// A directory entry's name, which must be valid UTF-8 to serve as a key.
fn entry_name(entry: &DirEntry) -> Result<String, LoaderError> {
    entry
        .file_name()
        .into_string()
        .map_err(|_| LoaderError::NonUtf8Name { path: entry.path() })
}

fn sorted_entries(dir: &Path) -> Result<Vec<DirEntry>, LoaderError> {
    if !dir.is_dir() {
        return Err(LoaderError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    let io_err = |source: std::io::Error| LoaderError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let entries: Vec<DirEntry> = fs::read_dir(dir)
        .map_err(io_err)?
        .collect::<Result<_, _>>()
        .map_err(io_err)?;
    Ok(entries
        .into_iter()
        .sorted_by_key(|entry| entry.file_name())
        .collect())
}
