//! Challenge management: listing, validation and enable/disable transitions.
//!
//! Challenges are authored externally and dropped into the challenges
//! directory; this module only moves them between the enabled and disabled
//! states and gates the collection before topology generation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use color_eyre::eyre::{bail, Result, WrapErr};
use log::{error, info, warn};

use crate::config::Config;
use crate::naming::{self, EntityName};
use crate::store::{EntityStore, StoreError};
use crate::validation::{self, CollectionError};

/// Files every enabled challenge directory must contain. The environment
/// file may be empty but must exist.
pub const REQUIRED_FILES: &[&str] = &["Dockerfile", ".env"];

/// Service names reserved for team infrastructure; a challenge may not
/// take one of these labels.
pub const RESERVED_LABELS: &[&str] = &["wireguard", "dnsmasq"];

/// A challenge and its on-disk locations.
#[derive(Debug, Clone)]
pub struct Challenge {
    pub name: EntityName,
    /// Directory holding the challenge's build descriptor
    pub build_path: PathBuf,
    /// Environment file passed to the challenge container
    pub env_path: PathBuf,
}

impl Challenge {
    pub fn label(&self) -> &str {
        &self.name.label
    }

    /// Network position of an enabled challenge; doubles as its host octet
    /// within every team subnet.
    pub fn network_id(&self) -> Option<u16> {
        self.name.id
    }
}

/// Handles challenge operations against one challenges directory.
pub struct ChallengeManager<'a> {
    config: &'a Config,
    store: EntityStore,
}

impl<'a> ChallengeManager<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            store: EntityStore::new(&config.paths.challenges),
        }
    }

    /// All decodable challenges, in listing order. Entries with malformed
    /// names are logged and skipped.
    pub fn list(&self) -> Result<Vec<Challenge>> {
        let mut challenges = Vec::new();
        for dir_name in self
            .store
            .list_dirs()
            .wrap_err("failed to read challenges directory")?
        {
            let name = match EntityName::decode(&dir_name) {
                Ok(name) => name,
                Err(err) => {
                    warn!("skipping invalid challenge directory '{}': {}", dir_name, err);
                    continue;
                }
            };

            let build_path = self.store.entry_path(&dir_name);
            let env_path = build_path.join(".env");
            challenges.push(Challenge {
                name,
                build_path,
                env_path,
            });
        }
        Ok(challenges)
    }

    pub fn list_enabled(&self) -> Result<Vec<Challenge>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|c| c.name.enabled)
            .collect())
    }

    /// Full gate over the challenges directory: name normalization,
    /// identity validation (range, duplicates, holes) and per-challenge
    /// structure. Returns the occupied identity map on success.
    pub fn check_directory(&self) -> Result<BTreeMap<u16, String>> {
        let root = &self.config.paths.challenges;
        if !root.is_dir() {
            bail!("challenges directory '{}' does not exist", root.display());
        }

        let unrepairable = naming::normalize_names(&self.store)?;
        if !unrepairable.is_empty() {
            bail!(
                "challenge names could not be repaired: {}",
                unrepairable.join(", ")
            );
        }

        let challenges = self.list()?;
        if challenges.iter().all(|c| !c.name.enabled) {
            bail!("no enabled challenges found in '{}'", root.display());
        }

        let occupied = validation::validate_collection(
            challenges.iter().map(|c| &c.name),
            self.config.challenges.network_ids,
        )?;
        validation::check_holes(&occupied, self.config.challenges.network_ids)?;

        // Structure failures are collected so every broken challenge gets
        // reported in one pass.
        let mut broken = Vec::new();
        for challenge in challenges.iter().filter(|c| c.name.enabled) {
            if let Err(err) =
                validation::check_required_files(&challenge.build_path, REQUIRED_FILES)
            {
                error!("challenge '{}': {}", challenge.label(), err);
                broken.push(challenge.label().to_string());
            }
        }
        if !broken.is_empty() {
            bail!("challenges with invalid structure: {}", broken.join(", "));
        }

        Ok(occupied)
    }

    /// Enables a disabled challenge under `network_id`. The rename is only
    /// attempted once every precondition holds.
    pub fn enable(&self, label: &str, network_id: u16) -> Result<()> {
        let range = self.config.challenges.network_ids;
        if !range.contains(network_id) {
            return Err(CollectionError::IdOutOfRange {
                label: label.to_string(),
                id: network_id,
                min: range.min,
                max: range.max,
            }
            .into());
        }
        if RESERVED_LABELS.contains(&label) {
            bail!("'{}' is reserved for infrastructure services", label);
        }

        let disabled_dir = EntityName::disabled(label).dir_name();
        if !self.store.exists(&disabled_dir) {
            return Err(StoreError::NotFound {
                name: format!("disabled challenge '{label}'"),
            }
            .into());
        }

        for challenge in self.list_enabled()? {
            if challenge.network_id() == Some(network_id) {
                return Err(CollectionError::DuplicateId {
                    id: network_id,
                    first: challenge.label().to_string(),
                    second: label.to_string(),
                }
                .into());
            }
        }

        let enabled_dir = EntityName::enabled(network_id, label).dir_name();
        self.store.rename(&disabled_dir, &enabled_dir)?;
        info!("challenge '{}' enabled with network id {}", label, network_id);
        Ok(())
    }

    /// Disables an enabled challenge. Its network position is discarded
    /// from the encoded name; re-enabling needs a fresh one.
    pub fn disable(&self, label: &str) -> Result<()> {
        let found = self
            .list_enabled()?
            .into_iter()
            .find(|c| c.label() == label)
            .ok_or(StoreError::NotFound {
                name: format!("enabled challenge '{label}'"),
            })?;

        let disabled_dir = EntityName::disabled(label).dir_name();
        self.store.rename(&found.name.dir_name(), &disabled_dir)?;
        info!("challenge '{}' disabled", label);
        Ok(())
    }
}
