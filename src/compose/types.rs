//! Compose document type definitions.
//!
//! These structures serialize to the YAML consumed by the container
//! runtime. Maps are BTreeMaps so that repeated generation of the same
//! document produces byte-identical output.

use serde::Serialize;
use std::collections::BTreeMap;

/// Root of a team's generated compose document.
#[derive(Serialize, Debug)]
pub struct ComposeFile {
    /// Map of service name to service definition
    pub services: BTreeMap<String, Service>,
    /// Map of network name to network definition; exactly one entry,
    /// the team's own network
    pub networks: BTreeMap<String, Network>,
}

/// A single service definition.
///
/// Infrastructure services reference a published image; challenge services
/// reference a build directory instead. The two are mutually exclusive.
#[derive(Serialize, Debug)]
pub struct Service {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Build directory for challenge services
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    pub container_name: String,
    /// Host:container port bindings, infrastructure services only
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    /// KEY=value pairs, infrastructure services only
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cap_add: Vec<String>,
    /// Environment file for challenge services
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_file: Option<String>,
    /// Network attachments; always exactly the team's network
    pub networks: BTreeMap<String, ServiceAddress>,
}

/// Static address of a service on one network.
#[derive(Serialize, Debug)]
pub struct ServiceAddress {
    pub ipv4_address: String,
}

/// A team-scoped bridge network.
#[derive(Serialize, Debug)]
pub struct Network {
    pub driver: String,
    pub ipam: NetworkIpam,
}

/// IP address management block of a network.
#[derive(Serialize, Debug)]
pub struct NetworkIpam {
    pub config: Vec<IpamConfig>,
}

/// Subnet entry of an IPAM block.
#[derive(Serialize, Debug)]
pub struct IpamConfig {
    pub subnet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
}
