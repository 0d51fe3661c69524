//! Static configuration: filesystem roots, identity ranges and addressing.
//!
//! Defaults match a containerized deployment where the challenge and team
//! collections are bind-mounted at fixed paths. Every value can be
//! overridden through an optional YAML configuration file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::validation::IdRange;

/// Top-level configuration structure that mirrors the YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Collection roots on disk
    pub paths: PathsConfig,
    /// Subnet addressing
    pub network: NetworkConfig,
    /// Challenge collection constraints
    pub challenges: ChallengeConfig,
    /// Team collection constraints
    pub teams: TeamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root directory holding one subdirectory per challenge
    pub challenges: PathBuf,
    /// Root directory holding one subdirectory per team
    pub teams: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// First two octets of every generated subnet, e.g. "10.0"
    pub base_subnet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Allowed challenge network positions
    pub network_ids: IdRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    /// Allowed team ids
    pub ids: IdRange,
    /// Base port for VPN endpoints; team N is exposed on base + N
    pub base_vpn_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            network: NetworkConfig::default(),
            challenges: ChallengeConfig::default(),
            teams: TeamConfig::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            challenges: PathBuf::from("/challenges"),
            teams: PathBuf::from("/equipes"),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_subnet: "10.0".to_string(),
        }
    }
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            network_ids: IdRange { min: 11, max: 249 },
        }
    }
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            ids: IdRange { min: 1, max: 254 },
            base_vpn_port: 50000,
        }
    }
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file '{path}'")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse configuration file '{path}'")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid {what} id range: min={min} max={max}")]
    InvalidRange {
        what: &'static str,
        min: u16,
        max: u16,
    },

    #[error("invalid base subnet '{subnet}' (expected two octets, e.g. \"10.0\")")]
    InvalidBaseSubnet { subnet: String },

    #[error("challenges directory '{path}' does not exist")]
    MissingChallengesRoot { path: String },

    #[error("failed to create teams directory '{path}'")]
    CreateTeamsRoot {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl Config {
    /// Loads configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Validates ranges and addressing, and prepares the collection roots:
    /// the challenges root must already exist (it is authored content), the
    /// teams root is created when absent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.challenges.network_ids.min >= self.challenges.network_ids.max {
            return Err(ConfigError::InvalidRange {
                what: "challenge network",
                min: self.challenges.network_ids.min,
                max: self.challenges.network_ids.max,
            });
        }
        if self.teams.ids.min >= self.teams.ids.max {
            return Err(ConfigError::InvalidRange {
                what: "team",
                min: self.teams.ids.min,
                max: self.teams.ids.max,
            });
        }

        let octets: Vec<&str> = self.network.base_subnet.split('.').collect();
        if octets.len() != 2 || octets.iter().any(|o| o.parse::<u8>().is_err()) {
            return Err(ConfigError::InvalidBaseSubnet {
                subnet: self.network.base_subnet.clone(),
            });
        }

        if !self.paths.challenges.is_dir() {
            return Err(ConfigError::MissingChallengesRoot {
                path: self.paths.challenges.display().to_string(),
            });
        }
        if !self.paths.teams.exists() {
            fs::create_dir_all(&self.paths.teams).map_err(|e| ConfigError::CreateTeamsRoot {
                path: self.paths.teams.display().to_string(),
                source: e,
            })?;
        }

        Ok(())
    }

    /// Externally exposed VPN port for a team.
    pub fn vpn_port(&self, team_id: u16) -> u32 {
        u32::from(self.teams.base_vpn_port) + u32::from(team_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.paths.challenges, PathBuf::from("/challenges"));
        assert_eq!(config.challenges.network_ids, IdRange { min: 11, max: 249 });
        assert_eq!(config.teams.ids, IdRange { min: 1, max: 254 });
        assert_eq!(config.vpn_port(3), 50003);
    }

    #[test]
    fn test_partial_yaml_overrides() {
        let yaml = r#"
network:
  base_subnet: "172.16"
teams:
  ids: { min: 1, max: 16 }
  base_vpn_port: 40000
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.network.base_subnet, "172.16");
        assert_eq!(config.teams.ids, IdRange { min: 1, max: 16 });
        assert_eq!(config.vpn_port(5), 40005);
        // Untouched sections keep their defaults.
        assert_eq!(config.challenges.network_ids, IdRange { min: 11, max: 249 });
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.challenges = dir.path().to_path_buf();
        config.paths.teams = dir.path().join("teams");
        config.teams.ids = IdRange { min: 10, max: 5 };

        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidRange { what: "team", .. }
        ));
    }

    #[test]
    fn test_validate_rejects_bad_subnet() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.challenges = dir.path().to_path_buf();
        config.paths.teams = dir.path().join("teams");
        config.network.base_subnet = "10.0.0".to_string();

        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidBaseSubnet { .. }
        ));
    }

    #[test]
    fn test_validate_creates_teams_root() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.challenges = dir.path().to_path_buf();
        config.paths.teams = dir.path().join("teams");

        config.validate().unwrap();
        assert!(config.paths.teams.is_dir());
    }

    #[test]
    fn test_validate_requires_challenges_root() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.challenges = dir.path().join("missing");
        config.paths.teams = dir.path().join("teams");

        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::MissingChallengesRoot { .. }
        ));
    }
}
