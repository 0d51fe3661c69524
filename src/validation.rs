//! Collection-wide identity validation and per-entity structure checks.
//!
//! Identity validation walks the enabled entities of one collection and
//! fails fast on the first offender, in listing order: an id outside the
//! configured range, or an id already claimed by an earlier entity. The
//! hole check then requires every id in the range to be occupied; it is
//! applied to the challenge collection only, where the identity space is
//! expected to be densely packed.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::naming::EntityName;

/// Inclusive identity range for one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRange {
    pub min: u16,
    pub max: u16,
}

impl IdRange {
    pub fn contains(&self, id: u16) -> bool {
        id >= self.min && id <= self.max
    }
}

/// Identity validation errors.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("'{label}' has id {id} outside the allowed range {min}..={max}")]
    IdOutOfRange {
        label: String,
        id: u16,
        min: u16,
        max: u16,
    },

    #[error("id {id} is used by both '{first}' and '{second}'")]
    DuplicateId {
        id: u16,
        first: String,
        second: String,
    },

    #[error("no enabled entity occupies id {id}")]
    Hole { id: u16 },
}

/// Validates the enabled entities of one collection against `range` and
/// returns the occupied identity map. Disabled entities are skipped
/// entirely; the first out-of-range or duplicate id aborts the pass.
pub fn validate_collection<'a, I>(
    entities: I,
    range: IdRange,
) -> Result<BTreeMap<u16, String>, CollectionError>
where
    I: IntoIterator<Item = &'a EntityName>,
{
    let mut occupied: BTreeMap<u16, String> = BTreeMap::new();

    for entity in entities {
        if !entity.enabled {
            continue;
        }
        let Some(id) = entity.id else { continue };

        if !range.contains(id) {
            return Err(CollectionError::IdOutOfRange {
                label: entity.label.clone(),
                id,
                min: range.min,
                max: range.max,
            });
        }

        if let Some(first) = occupied.get(&id) {
            return Err(CollectionError::DuplicateId {
                id,
                first: first.clone(),
                second: entity.label.clone(),
            });
        }
        occupied.insert(id, entity.label.clone());
    }

    Ok(occupied)
}

/// Requires every id in `range` to be occupied; fails on the lowest
/// missing one.
pub fn check_holes(occupied: &BTreeMap<u16, String>, range: IdRange) -> Result<(), CollectionError> {
    for id in range.min..=range.max {
        if !occupied.contains_key(&id) {
            return Err(CollectionError::Hole { id });
        }
    }
    Ok(())
}

/// Per-entity structure errors.
#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    #[error("missing required files: {}", .missing.join(", "))]
    MissingFiles { missing: Vec<String> },

    #[error("failed to stat '{file}'")]
    Io {
        file: String,
        #[source]
        source: io::Error,
    },
}

/// Stats every required file under `dir`. Absent files are collected so a
/// single report covers everything the entity is missing; any other stat
/// failure aborts immediately.
pub fn check_required_files(dir: &Path, required: &[&str]) -> Result<(), StructureError> {
    let mut missing = Vec::new();

    for file in required {
        let path = dir.join(file);
        match fs::metadata(&path) {
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                missing.push((*file).to_string());
            }
            Err(err) => {
                return Err(StructureError::Io {
                    file: path.display().to_string(),
                    source: err,
                });
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(StructureError::MissingFiles { missing })
    }
}
