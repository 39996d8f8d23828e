//! Database layer for dejavue.
//!
//! Every catalogue entity is a plain record struct with an `id: Option<i64>`
//! plus a repository that borrows an open connection. `save` inserts a
//! record without an id and updates one that has it; validation runs first
//! and a failing record writes nothing.
//!
//! ## Usage
//!
//! ```rust
//! use dejavue::db::db::Db;
//! use dejavue::db::eras::{Era, Eras};
//!
//! let db = Db::in_memory()?;
//! let eras = Eras::new(&db);
//!
//! let mut era = Era::new("Renaissance", 1300, 1600, "Rebirth of classical learning");
//! eras.save(&mut era)?;
//! assert_eq!(era.slug, "renaissance");
//!
//! let mut duplicate = Era::new("Renaissance", 1300, 1600, "Again");
//! assert!(eras.save(&mut duplicate).unwrap_err().is_conflict());
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Domains
//!
//! - **users**: accounts, profiles, achievements and learning progress
//! - **events**: eras, locations, labels, figures, events and everything attached to them
//! - **timeline**: simplified what-if timelines and scenarios
//! - **interactions**: activity log, simulations, decisions and debates
//! - **core**: quality metrics, patterns, fact checks and permissions

/// Connection management and initialization.
pub mod db;

/// Versioned schema migrations and post-migrate hooks.
pub mod migrations;

pub mod error;
pub mod content_types;
pub mod links;
pub(crate) mod query;

// users
pub mod users;

// events
pub mod alternatives;
pub mod causality;
pub mod consequences;
pub mod documents;
pub mod entities;
pub mod eras;
pub mod events;
pub mod figures;
pub mod impacts;
pub mod labels;
pub mod locations;
pub mod predictions;
pub mod resources;
pub mod scenarios;
pub mod tags;
pub mod timelines;

// timeline
pub mod what_if;

// interactions
pub mod debates;
pub mod interactions;
pub mod simulations;

// core
pub mod fact_checks;
pub mod patterns;
pub mod permissions;
pub mod quality;
