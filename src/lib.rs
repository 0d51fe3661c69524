//! # CTFManager - Management utility for dockerized CTF environments
//!
//! This library provides the core functionality for managing the challenges
//! and teams of a Capture The Flag competition and for generating each
//! team's container deployment from the set of enabled challenges.
//!
//! ## Overview
//!
//! Challenges and teams live on disk as one directory per entity; the
//! directory name encodes the entity's network position and enabled state
//! (`11-web`, `x-oldweb`). CTFManager validates those collections (identity
//! ranges, uniqueness, dense packing, required files) and derives a compose
//! document per team: one isolated /24 network, a wireguard VPN endpoint, a
//! dnsmasq resolver and one service per enabled challenge, each pinned to a
//! deterministic address on the team subnet.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `config`: Static configuration (paths, identity ranges, addressing)
//! - `naming`: Entity name encoding/decoding and normalization
//! - `store`: Directory-backed entity storage
//! - `validation`: Identity-range and directory-structure validation
//! - `compose`: Compose document types and generation
//! - `challenge`: Challenge listing, validation and state transitions
//! - `team`: Team lifecycle and per-team deployment files
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ctfmanager::config::Config;
//! use ctfmanager::team::TeamManager;
//!
//! let config = Config::default();
//! config.validate()?;
//!
//! let teams = TeamManager::new(&config);
//! let compose_path = teams.create(3, "red", &["alice".to_string()])?;
//! // The team directory now contains compose.yml and members.json.
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Library modules expose typed `thiserror` errors; the managers and the
//! CLI layer wrap them into `color_eyre` reports with context.

pub mod challenge;
pub mod compose;
pub mod config;
pub mod naming;
pub mod store;
pub mod team;
pub mod validation;
