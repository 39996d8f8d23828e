//! # dejavue
//!
//! A local catalogue of historical events, eras, figures, user-made
//! what-if scenarios, predictions, debates and learning progress, kept in
//! a single SQLite database.
//!
//! ## Features
//!
//! - **Typed records**: every entity validates itself before it is written
//! - **Schema migrations**: numbered migrations applied in one transaction
//! - **Post-migrate hooks**: the scenario permission bootstrap runs after every migration run
//! - **Generic references**: quality metrics and tags may point at any catalogue record
//! - **Command line**: configure the database, migrate and inspect permissions
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dejavue::commands::Cli;
//!
//! fn main() -> anyhow::Result<()> {
//!     Cli::menu()
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
