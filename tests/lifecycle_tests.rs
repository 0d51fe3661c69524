//! End-to-end lifecycle tests over a temporary directory tree.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use ctfmanager::challenge::ChallengeManager;
use ctfmanager::config::Config;
use ctfmanager::team::TeamManager;
use ctfmanager::validation::IdRange;

fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.paths.challenges = root.join("challenges");
    config.paths.teams = root.join("teams");
    config.challenges.network_ids = IdRange { min: 11, max: 12 };
    fs::create_dir_all(&config.paths.challenges).unwrap();
    config.validate().unwrap();
    config
}

fn write_challenge(config: &Config, dir_name: &str) {
    let dir = config.paths.challenges.join(dir_name);
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("Dockerfile"), "FROM alpine").unwrap();
    fs::write(dir.join(".env"), "").unwrap();
}

#[test]
fn test_full_competition_setup() {
    let root = TempDir::new().unwrap();
    let config = test_config(root.path());

    write_challenge(&config, "11-web");
    write_challenge(&config, "12-pwn");
    write_challenge(&config, "x-secret");

    // The challenge directory gate passes with a dense range and ignores
    // the disabled entry.
    let challenges = ChallengeManager::new(&config);
    let occupied = challenges.check_directory().unwrap();
    assert_eq!(occupied.get(&11), Some(&"web".to_string()));
    assert_eq!(occupied.get(&12), Some(&"pwn".to_string()));
    assert_eq!(occupied.len(), 2);

    // Two teams, each with their own compose file.
    let teams = TeamManager::new(&config);
    teams
        .create(1, "red", &["alice".to_string(), "bob".to_string()])
        .unwrap();
    teams.create(2, "blue", &["carol".to_string()]).unwrap();

    let red_yaml =
        fs::read_to_string(config.paths.teams.join("1-red").join("compose.yml")).unwrap();
    let blue_yaml =
        fs::read_to_string(config.paths.teams.join("2-blue").join("compose.yml")).unwrap();

    // Deterministic per-team addressing: challenge ids reappear as host
    // octets inside each team's own subnet.
    assert!(red_yaml.contains("10.0.1.11"));
    assert!(red_yaml.contains("10.0.1.12"));
    assert!(red_yaml.contains("10.0.1.252"));
    assert!(red_yaml.contains("50001:51820/udp"));
    assert!(blue_yaml.contains("10.0.2.11"));
    assert!(blue_yaml.contains("50002:51820/udp"));

    // The disabled challenge never reaches a compose file.
    assert!(!red_yaml.contains("secret"));

    teams.validate("red").unwrap();
    teams.validate("blue").unwrap();
}

#[test]
fn test_compose_document_structure() {
    let root = TempDir::new().unwrap();
    let config = test_config(root.path());
    write_challenge(&config, "11-web");

    let teams = TeamManager::new(&config);
    let compose_path = teams.create(3, "red", &["a".to_string()]).unwrap();

    let document: serde_yaml::Value =
        serde_yaml::from_str(&fs::read_to_string(&compose_path).unwrap()).unwrap();

    let network = &document["networks"]["red-Network"];
    assert_eq!(network["driver"], "bridge");
    assert_eq!(network["ipam"]["config"][0]["subnet"], "10.0.3.0/24");
    assert_eq!(network["ipam"]["config"][0]["gateway"], "10.0.3.254");

    let services = document["services"].as_mapping().unwrap();
    assert_eq!(services.len(), 3);

    let web = &document["services"]["web"];
    assert_eq!(web["container_name"], "red-web");
    assert_eq!(
        web["networks"]["red-Network"]["ipv4_address"],
        "10.0.3.11"
    );
    // Challenge services build from source and carry no image.
    assert!(web.get("image").is_none());
    assert!(web.get("build").is_some());

    let wireguard = &document["services"]["wireguard"];
    assert_eq!(wireguard["image"], "linuxserver/wireguard");
    assert_eq!(
        wireguard["networks"]["red-Network"]["ipv4_address"],
        "10.0.3.252"
    );
    assert_eq!(wireguard["cap_add"][0], "NET_ADMIN");

    let dnsmasq = &document["services"]["dnsmasq"];
    assert_eq!(
        dnsmasq["networks"]["red-Network"]["ipv4_address"],
        "10.0.3.253"
    );
    assert!(dnsmasq.get("ports").is_none());
}

#[test]
fn test_challenge_toggle_then_regenerate() {
    let root = TempDir::new().unwrap();
    let config = test_config(root.path());
    write_challenge(&config, "11-web");
    write_challenge(&config, "x-pwn");

    let challenges = ChallengeManager::new(&config);
    let teams = TeamManager::new(&config);
    teams.create(1, "red", &[]).unwrap();

    let compose_path = config.paths.teams.join("1-red").join("compose.yml");
    assert!(!fs::read_to_string(&compose_path).unwrap().contains("pwn"));

    // Bring the second challenge online and refresh the team.
    challenges.enable("pwn", 12).unwrap();
    teams.regenerate("red").unwrap();
    let yaml = fs::read_to_string(&compose_path).unwrap();
    assert!(yaml.contains("10.0.1.12"));

    // Disabling removes it again on the next regeneration.
    challenges.disable("pwn").unwrap();
    teams.regenerate("red").unwrap();
    let yaml = fs::read_to_string(&compose_path).unwrap();
    assert!(!yaml.contains("pwn"));
}

#[test]
fn test_team_disable_forgets_id() {
    let root = TempDir::new().unwrap();
    let config = test_config(root.path());

    let teams = TeamManager::new(&config);
    teams.create(5, "red", &[]).unwrap();
    teams.disable("red").unwrap();

    // The old id is gone from the encoded name; a new team may take it.
    teams.create(5, "blue", &[]).unwrap();

    // Re-enabling red needs a fresh id; the old one is now occupied.
    assert!(teams.enable("red", 5).is_err());
    teams.enable("red", 6).unwrap();
    assert!(config.paths.teams.join("6-red").is_dir());
}

#[test]
fn test_malformed_challenge_directory_is_repaired() {
    let root = TempDir::new().unwrap();
    let config = test_config(root.path());
    write_challenge(&config, "11-web");
    write_challenge(&config, "12-pwn");

    // An entry without the id prefix gets parked as disabled by the gate.
    fs::create_dir(config.paths.challenges.join("stray")).unwrap();

    let challenges = ChallengeManager::new(&config);
    let occupied = challenges.check_directory().unwrap();

    assert_eq!(occupied.len(), 2);
    assert!(config.paths.challenges.join("x-stray").is_dir());
    assert!(!config.paths.challenges.join("stray").exists());
}
