//! Compose document generation.
//!
//! Builds one compose document per team from the enabled challenge set.
//! The document is a pure function of the team's identity, label and
//! member count plus the supplied challenges, so regenerating it with the
//! same inputs yields byte-identical output.
//!
//! All addresses are drawn from the team's /24 subnet
//! `<base>.<team-id>.0/24`:
//!
//! - gateway: host octet 254
//! - wireguard VPN endpoint: host octet 252
//! - dnsmasq: host octet 253
//! - each challenge: its own network position as host octet

pub mod types;

pub use types::{ComposeFile, IpamConfig, Network, NetworkIpam, Service, ServiceAddress};

use std::collections::BTreeMap;

use crate::challenge::Challenge;
use crate::config::Config;

/// Fixed host octets within a team subnet.
const WIREGUARD_HOST: u16 = 252;
const DNSMASQ_HOST: u16 = 253;
const GATEWAY_HOST: u16 = 254;

/// Port wireguard listens on inside its container.
const WIREGUARD_INTERNAL_PORT: u16 = 51820;

/// Name of a team's network.
pub fn network_name(team_label: &str) -> String {
    format!("{team_label}-Network")
}

/// CIDR subnet of a team.
pub fn team_subnet(config: &Config, team_id: u16) -> String {
    format!("{}.{}.0/24", config.network.base_subnet, team_id)
}

fn host_address(config: &Config, team_id: u16, host: u16) -> String {
    format!("{}.{}.{}", config.network.base_subnet, team_id, host)
}

fn attachment(
    config: &Config,
    team_label: &str,
    team_id: u16,
    host: u16,
) -> BTreeMap<String, ServiceAddress> {
    let mut networks = BTreeMap::new();
    networks.insert(
        network_name(team_label),
        ServiceAddress {
            ipv4_address: host_address(config, team_id, host),
        },
    );
    networks
}

fn wireguard_service(
    team_label: &str,
    team_id: u16,
    member_count: usize,
    config: &Config,
) -> Service {
    let vpn_port = config.vpn_port(team_id);
    Service {
        image: Some("linuxserver/wireguard".to_string()),
        build: None,
        container_name: format!("{team_label}-wireguard"),
        ports: vec![format!("{vpn_port}:{WIREGUARD_INTERNAL_PORT}/udp")],
        environment: vec![
            "PUID=1000".to_string(),
            "PGID=1000".to_string(),
            "TZ=Europe/Paris".to_string(),
            format!("PEERS={member_count}"),
            format!("PEERDNS={}", host_address(config, team_id, DNSMASQ_HOST)),
            format!("ALLOWEDIPS={}", team_subnet(config, team_id)),
            "SERVERURL=127.0.0.1".to_string(),
            format!("SERVERPORT={vpn_port}"),
        ],
        volumes: vec!["./config:/config".to_string()],
        cap_add: vec!["NET_ADMIN".to_string()],
        env_file: None,
        networks: attachment(config, team_label, team_id, WIREGUARD_HOST),
    }
}

fn dnsmasq_service(team_label: &str, team_id: u16, config: &Config) -> Service {
    Service {
        image: Some("strm/dnsmasq".to_string()),
        build: None,
        container_name: format!("{team_label}-dnsmasq"),
        ports: Vec::new(),
        environment: Vec::new(),
        volumes: vec!["./dns/dnsmasq.conf:/etc/dnsmasq.conf".to_string()],
        cap_add: Vec::new(),
        env_file: None,
        networks: attachment(config, team_label, team_id, DNSMASQ_HOST),
    }
}

fn challenge_service(
    team_label: &str,
    team_id: u16,
    challenge_id: u16,
    challenge: &Challenge,
    config: &Config,
) -> Service {
    Service {
        image: None,
        build: Some(challenge.build_path.display().to_string()),
        container_name: format!("{}-{}", team_label, challenge.label()),
        ports: Vec::new(),
        environment: Vec::new(),
        volumes: Vec::new(),
        cap_add: Vec::new(),
        env_file: Some(challenge.env_path.display().to_string()),
        networks: attachment(config, team_label, team_id, challenge_id),
    }
}

fn team_network(team_id: u16, config: &Config) -> Network {
    Network {
        driver: "bridge".to_string(),
        ipam: NetworkIpam {
            config: vec![IpamConfig {
                subnet: team_subnet(config, team_id),
                gateway: Some(host_address(config, team_id, GATEWAY_HOST)),
            }],
        },
    }
}

/// Builds the full compose document for one team.
///
/// Callers must pass enabled challenges only; a challenge without a
/// resolved network position contributes no service.
pub fn build_compose_file(
    team_id: u16,
    team_label: &str,
    member_count: usize,
    challenges: &[Challenge],
    config: &Config,
) -> ComposeFile {
    let mut services = BTreeMap::new();
    services.insert(
        "wireguard".to_string(),
        wireguard_service(team_label, team_id, member_count, config),
    );
    services.insert(
        "dnsmasq".to_string(),
        dnsmasq_service(team_label, team_id, config),
    );

    for challenge in challenges {
        let Some(challenge_id) = challenge.network_id() else {
            continue;
        };
        services.insert(
            challenge.label().to_string(),
            challenge_service(team_label, team_id, challenge_id, challenge, config),
        );
    }

    let mut networks = BTreeMap::new();
    networks.insert(network_name(team_label), team_network(team_id, config));

    ComposeFile { services, networks }
}
