//! # Userhub CLI
//!
//! Administrative helpers used by the `userhub-cli` binary.
//!
//! - [`admin`]: create admin accounts and mint access tokens
//! - [`seeder`]: fill a development database with fake users
//!
//! ```ignore
//! use userhub_cli::seeder::seed_users;
//!
//! seed_users(&pool, 50).await?;
//! ```

pub mod admin;
pub mod seeder;

/// Error type shared by the CLI helpers. Messages go straight to stderr.
pub type CliError = Box<dyn std::error::Error + Send + Sync>;
