use clap::{Parser, Subcommand};
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use ctfmanager::challenge::ChallengeManager;
use ctfmanager::config::Config;
use ctfmanager::team::TeamManager;

/// Management utility for dockerized CTF environments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the manager configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage CTF teams
    #[command(subcommand)]
    Team(TeamCommand),
    /// Manage CTF challenges
    #[command(subcommand)]
    Challenge(ChallengeCommand),
}

#[derive(Subcommand, Debug)]
enum TeamCommand {
    /// List all teams
    List,
    /// Create a new team and generate its compose file
    Create {
        id: u16,
        name: String,
        /// Team members (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        members: Vec<String>,
    },
    /// Delete an enabled team and all its files
    Delete { name: String },
    /// Enable a disabled team under a fresh id
    Enable { name: String, id: u16 },
    /// Disable a team
    Disable { name: String },
    /// Check that a team's deployment files are in place
    Validate { name: String },
    /// Rebuild a team's compose file from the enabled challenges
    Regenerate { name: String },
}

#[derive(Subcommand, Debug)]
enum ChallengeCommand {
    /// List challenges
    List {
        /// Also show disabled challenges
        #[arg(short, long)]
        all: bool,
    },
    /// Validate the whole challenges directory
    Validate,
    /// Enable a disabled challenge under the given network id
    Enable { name: String, network_id: u16 },
    /// Disable a challenge
    Disable { name: String },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.validate()?;

    match args.command {
        Command::Team(command) => run_team(command, &config),
        Command::Challenge(command) => run_challenge(command, &config),
    }
}

fn run_team(command: TeamCommand, config: &Config) -> Result<()> {
    let manager = TeamManager::new(config);

    match command {
        TeamCommand::List => {
            let teams = manager.list()?;
            if teams.is_empty() {
                info!("no teams found");
                return Ok(());
            }

            println!("Teams:");
            for team in teams {
                let status = if team.name.enabled { "enabled" } else { "disabled" };
                let id = team
                    .name
                    .id
                    .map_or_else(|| "N/A".to_string(), |id| id.to_string());
                println!(
                    "  [{}] {} ({}, {} members)",
                    id,
                    team.name.label,
                    status,
                    team.members.len()
                );
            }
        }
        TeamCommand::Create { id, name, members } => {
            let compose_path = manager.create(id, &name, &members)?;
            println!("Team '{}' created (id {})", name, id);
            println!("  compose file: {}", compose_path.display());
        }
        TeamCommand::Delete { name } => {
            manager.delete(&name)?;
            println!("Team '{}' deleted", name);
        }
        TeamCommand::Enable { name, id } => {
            manager.enable(&name, id)?;
            println!("Team '{}' enabled (id {})", name, id);
        }
        TeamCommand::Disable { name } => {
            manager.disable(&name)?;
            println!("Team '{}' disabled", name);
        }
        TeamCommand::Validate { name } => {
            manager.validate(&name)?;
            println!("Team '{}' is valid", name);
        }
        TeamCommand::Regenerate { name } => {
            let compose_path = manager.regenerate(&name)?;
            println!("Team '{}' compose file regenerated", name);
            println!("  compose file: {}", compose_path.display());
        }
    }

    Ok(())
}

fn run_challenge(command: ChallengeCommand, config: &Config) -> Result<()> {
    let manager = ChallengeManager::new(config);

    match command {
        ChallengeCommand::List { all } => {
            let challenges = manager.list()?;
            if challenges.is_empty() {
                info!("no challenges found");
                return Ok(());
            }

            println!("Challenges:");
            for challenge in challenges {
                if !all && !challenge.name.enabled {
                    continue;
                }
                let status = if challenge.name.enabled { "enabled" } else { "disabled" };
                let id = challenge
                    .network_id()
                    .map_or_else(|| "N/A".to_string(), |id| id.to_string());
                println!("  [{}] {} ({})", id, challenge.label(), status);
            }
        }
        ChallengeCommand::Validate => {
            let occupied = manager.check_directory()?;
            println!("All challenges are valid ({} enabled)", occupied.len());
        }
        ChallengeCommand::Enable { name, network_id } => {
            manager.enable(&name, network_id)?;
            println!("Challenge '{}' enabled (network id {})", name, network_id);
        }
        ChallengeCommand::Disable { name } => {
            manager.disable(&name)?;
            println!("Challenge '{}' disabled", name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(&[
            "ctfmanager",
            "team",
            "create",
            "3",
            "red",
            "--members",
            "alice,bob",
        ]);

        assert!(args.config.is_none());
        match args.command {
            Command::Team(TeamCommand::Create { id, name, members }) => {
                assert_eq!(id, 3);
                assert_eq!(name, "red");
                assert_eq!(members, vec!["alice", "bob"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_challenge_list_all_flag() {
        let args = Args::parse_from(&["ctfmanager", "challenge", "list", "--all"]);
        match args.command {
            Command::Challenge(ChallengeCommand::List { all }) => assert!(all),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_config_flag() {
        let args = Args::parse_from(&[
            "ctfmanager",
            "--config",
            "ctf.yaml",
            "challenge",
            "validate",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("ctf.yaml")));
    }
}
