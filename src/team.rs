//! Team management: lifecycle transitions and per-team deployment files.
//!
//! Each team directory holds the generated `compose.yml` plus a
//! `members.json` roster. Teams are created enabled with a fresh id;
//! disabling discards the id, so re-enabling requires a new one.

use std::fs;
use std::io;
use std::path::PathBuf;

use color_eyre::eyre::{bail, Result, WrapErr};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::challenge::ChallengeManager;
use crate::compose;
use crate::config::Config;
use crate::naming::{self, EntityName};
use crate::store::{EntityStore, StoreError};
use crate::validation::{self, CollectionError};

/// File holding a team's generated topology.
pub const COMPOSE_FILE: &str = "compose.yml";
/// File holding a team's member roster.
pub const ROSTER_FILE: &str = "members.json";

/// Files every deployed team directory must contain.
pub const REQUIRED_FILES: &[&str] = &[COMPOSE_FILE];

/// A single team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub username: String,
}

/// Roster persisted alongside each team's compose file.
#[derive(Debug, Serialize, Deserialize)]
pub struct Roster {
    pub members: Vec<Member>,
}

/// A team and its roster.
#[derive(Debug, Clone)]
pub struct Team {
    pub name: EntityName,
    pub members: Vec<Member>,
}

/// Handles team operations against one teams directory.
pub struct TeamManager<'a> {
    config: &'a Config,
    store: EntityStore,
}

impl<'a> TeamManager<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            store: EntityStore::new(&config.paths.teams),
        }
    }

    /// All decodable teams, in listing order. Entries with malformed names
    /// are logged and skipped.
    pub fn list(&self) -> Result<Vec<Team>> {
        let mut teams = Vec::new();
        for dir_name in self
            .store
            .list_dirs()
            .wrap_err("failed to read teams directory")?
        {
            let name = match EntityName::decode(&dir_name) {
                Ok(name) => name,
                Err(err) => {
                    warn!("skipping invalid team directory '{}': {}", dir_name, err);
                    continue;
                }
            };

            let members = self.read_roster(&dir_name);
            teams.push(Team { name, members });
        }
        Ok(teams)
    }

    fn read_roster(&self, dir_name: &str) -> Vec<Member> {
        let path = self.store.entry_path(dir_name).join(ROSTER_FILE);
        match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Roster>(&text) {
                Ok(roster) => roster.members,
                Err(err) => {
                    warn!("ignoring unreadable roster in '{}': {}", dir_name, err);
                    Vec::new()
                }
            },
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!("could not read roster in '{}': {}", dir_name, err);
                }
                Vec::new()
            }
        }
    }

    fn find_enabled(&self, label: &str) -> Result<Team> {
        let team = self
            .list()?
            .into_iter()
            .find(|t| t.name.enabled && t.name.label == label)
            .ok_or(StoreError::NotFound {
                name: format!("enabled team '{label}'"),
            })?;
        Ok(team)
    }

    /// Creates a new enabled team, writes its roster and generates its
    /// compose file from the currently enabled challenges. Returns the
    /// compose file path.
    pub fn create(&self, id: u16, label: &str, members: &[String]) -> Result<PathBuf> {
        let range = self.config.teams.ids;
        if !range.contains(id) {
            return Err(CollectionError::IdOutOfRange {
                label: label.to_string(),
                id,
                min: range.min,
                max: range.max,
            }
            .into());
        }
        if !naming::is_valid_label(label) {
            bail!(
                "team name '{}' must contain only letters, digits and underscore",
                label
            );
        }

        let teams = self.list()?;
        if teams.iter().any(|t| t.name.label == label) {
            return Err(StoreError::AlreadyExists {
                name: format!("team '{label}'"),
            }
            .into());
        }
        if let Some(holder) = teams.iter().find(|t| t.name.enabled && t.name.id == Some(id)) {
            return Err(CollectionError::DuplicateId {
                id,
                first: holder.name.label.clone(),
                second: label.to_string(),
            }
            .into());
        }

        let name = EntityName::enabled(id, label);
        let team_dir = self.store.create_dir(&name.dir_name())?;

        let roster = Roster {
            members: members
                .iter()
                .map(|m| Member {
                    username: m.clone(),
                })
                .collect(),
        };
        let roster_json = serde_json::to_string_pretty(&roster)?;
        fs::write(team_dir.join(ROSTER_FILE), roster_json)
            .wrap_err("failed to write team roster")?;

        let team = Team {
            name,
            members: roster.members,
        };
        let compose_path = self.write_compose(&team)?;

        info!(
            "team '{}' created with id {} ({} members)",
            label,
            id,
            members.len()
        );
        Ok(compose_path)
    }

    /// Rebuilds `compose.yml` for one enabled team from the currently
    /// enabled challenges.
    pub fn regenerate(&self, label: &str) -> Result<PathBuf> {
        let team = self.find_enabled(label)?;
        let path = self.write_compose(&team)?;
        info!("regenerated compose file for team '{}'", label);
        Ok(path)
    }

    fn write_compose(&self, team: &Team) -> Result<PathBuf> {
        let Some(id) = team.name.id else {
            bail!("team '{}' is disabled", team.name.label);
        };

        let challenges = ChallengeManager::new(self.config).list_enabled()?;
        let document = compose::build_compose_file(
            id,
            &team.name.label,
            team.members.len(),
            &challenges,
            self.config,
        );

        let yaml = serde_yaml::to_string(&document)?;
        let path = self.store.entry_path(&team.name.dir_name()).join(COMPOSE_FILE);
        fs::write(&path, yaml)
            .wrap_err_with(|| format!("failed to write '{}'", path.display()))?;
        Ok(path)
    }

    /// Enables a disabled team under a fresh id.
    pub fn enable(&self, label: &str, id: u16) -> Result<()> {
        let range = self.config.teams.ids;
        if !range.contains(id) {
            return Err(CollectionError::IdOutOfRange {
                label: label.to_string(),
                id,
                min: range.min,
                max: range.max,
            }
            .into());
        }

        let disabled_dir = EntityName::disabled(label).dir_name();
        if !self.store.exists(&disabled_dir) {
            return Err(StoreError::NotFound {
                name: format!("disabled team '{label}'"),
            }
            .into());
        }

        if let Some(holder) = self
            .list()?
            .iter()
            .find(|t| t.name.enabled && t.name.id == Some(id))
        {
            return Err(CollectionError::DuplicateId {
                id,
                first: holder.name.label.clone(),
                second: label.to_string(),
            }
            .into());
        }

        let enabled_dir = EntityName::enabled(id, label).dir_name();
        self.store.rename(&disabled_dir, &enabled_dir)?;
        info!("team '{}' enabled with id {}", label, id);
        Ok(())
    }

    /// Disables a team. Its id is discarded from the encoded name.
    pub fn disable(&self, label: &str) -> Result<()> {
        let team = self.find_enabled(label)?;
        let disabled_dir = EntityName::disabled(label).dir_name();
        self.store.rename(&team.name.dir_name(), &disabled_dir)?;
        info!("team '{}' disabled", label);
        Ok(())
    }

    /// Deletes an enabled team and everything in its directory.
    pub fn delete(&self, label: &str) -> Result<()> {
        let team = self.find_enabled(label)?;
        self.store.remove_all(&team.name.dir_name())?;
        info!("team '{}' deleted", label);
        Ok(())
    }

    /// Checks that an enabled team's deployment files are in place.
    pub fn validate(&self, label: &str) -> Result<()> {
        let team = self.find_enabled(label)?;
        let team_dir = self.store.entry_path(&team.name.dir_name());
        validation::check_required_files(&team_dir, REQUIRED_FILES)
            .wrap_err_with(|| format!("team '{label}'"))?;
        Ok(())
    }
}
