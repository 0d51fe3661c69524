//! Entity name encoding and decoding.
//!
//! Challenges and teams each occupy one directory under their collection
//! root. The directory name serializes the entity's state: `<id>-<label>`
//! for an enabled entity, `x-<label>` for a disabled one. The in-memory
//! [`EntityName`] record is the authoritative representation; the directory
//! name is only a derived view of it.

use std::sync::LazyLock;

use log::{error, warn};
use regex::Regex;

use crate::store::{EntityStore, StoreError};

/// Prefix marking a disabled entity's directory.
pub const DISABLED_PREFIX: &str = "x";

/// Names considered well formed: numeric-or-`x` prefix, one dash, word
/// characters only in the label.
static WELL_FORMED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{1,3}|x)-\w+$").expect("Invalid well-formed regex"));

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("Invalid identifier regex"));

/// Errors raised while decoding a directory name.
#[derive(Debug, thiserror::Error)]
pub enum NameError {
    #[error("invalid entity name '{name}' (expected <number>-<name> or x-<name>)")]
    MissingSeparator { name: String },

    #[error("invalid numeric prefix in '{name}'")]
    InvalidId { name: String },
}

/// Decoded identity of a challenge or team.
///
/// `id` is present exactly when the entity is enabled; a disabled entity is
/// addressed purely by its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityName {
    pub id: Option<u16>,
    pub label: String,
    pub enabled: bool,
}

impl EntityName {
    pub fn enabled(id: u16, label: &str) -> Self {
        Self {
            id: Some(id),
            label: label.to_string(),
            enabled: true,
        }
    }

    pub fn disabled(label: &str) -> Self {
        Self {
            id: None,
            label: label.to_string(),
            enabled: false,
        }
    }

    /// Parses a directory name into its entity record.
    pub fn decode(name: &str) -> Result<EntityName, NameError> {
        let Some((prefix, label)) = name.split_once('-') else {
            return Err(NameError::MissingSeparator {
                name: name.to_string(),
            });
        };

        if prefix == DISABLED_PREFIX {
            return Ok(EntityName::disabled(label));
        }

        let id = prefix.parse::<u16>().map_err(|_| NameError::InvalidId {
            name: name.to_string(),
        })?;
        Ok(EntityName::enabled(id, label))
    }

    /// Serializes the record back into its directory name.
    ///
    /// A disabled entity always encodes as `x-<label>`, whatever id it may
    /// have carried before.
    pub fn dir_name(&self) -> String {
        match (self.enabled, self.id) {
            (true, Some(id)) => format!("{}-{}", id, self.label),
            _ => format!("{}-{}", DISABLED_PREFIX, self.label),
        }
    }
}

/// Whether `label` is usable as an entity label (letters, digits, underscore).
pub fn is_valid_label(label: &str) -> bool {
    IDENTIFIER.is_match(label)
}

/// Repairs malformed directory names in a collection.
///
/// Every name failing the well-formed pattern but consisting only of word
/// characters is renamed to its disabled form (`x-<name>`). Names that
/// contain other characters cannot be repaired automatically; they are
/// reported and returned, and the scan continues with the remaining entries.
pub fn normalize_names(store: &EntityStore) -> Result<Vec<String>, StoreError> {
    let mut unrepairable = Vec::new();

    for name in store.list_dirs()? {
        if WELL_FORMED.is_match(&name) {
            continue;
        }

        if IDENTIFIER.is_match(&name) {
            let repaired = format!("{}-{}", DISABLED_PREFIX, name);
            warn!("renaming malformed entry '{}' to '{}'", name, repaired);
            if let Err(err) = store.rename(&name, &repaired) {
                warn!("could not rename '{}': {}", name, err);
                unrepairable.push(name);
            }
        } else {
            error!(
                "cannot repair entry '{}': names may only contain letters, digits and underscore",
                name
            );
            unrepairable.push(name);
        }
    }

    Ok(unrepairable)
}
