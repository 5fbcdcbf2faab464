//! Coachline - backend service library for a CSR call-coaching platform.
//!
//! The heart of the crate is the authorization policy engine: a static role
//! hierarchy, a permission catalog, scope filters, and a role-transition
//! validator, all pure functions over immutable data built once at startup.
//! Around it sits the service scaffolding that consumes it:
//!
//! - **Role / Permission / Scope / Transition**: the policy engine
//! - **Config**: Layered configuration (file → env → CLI)
//! - **Auth**: JWT sessions carrying identity, role, and branch
//! - **Database**: libsql abstraction plus scope-filter application
//! - **Router / Server**: matchit routing on a hyper server
//! - **Module**: Trait for pluggable API modules
//! - **Users / Training**: built-in modules for the user directory and
//!   recorded practice calls
//!
//! # Example
//!
//! ```ignore
//! use coachline::{Loader, Overrides, Router, Module};
//! use coachline::{training::TrainingSessions, users::UserDirectory};
//!
//! #[tokio::main]
//! async fn main() -> coachline::Result<()> {
//!     // Load config
//!     let loader = Loader::new("COACHLINE");
//!     let config = loader.load(None, Overrides::default())?;
//!
//!     // Connect to database
//!     let db = coachline::db::connect(&config.database.url).await?;
//!
//!     // Build router
//!     let mut router = Router::new();
//!     UserDirectory.routes(&mut router);
//!     TrainingSessions.routes(&mut router);
//!
//!     // Run server (builds the policy engine from config)
//!     let state = coachline::server::State::new(
//!         config,
//!         Some(std::sync::Arc::new(db)),
//!         router.into_handle(),
//!     )?;
//!     coachline::server::run(state).await
//! }
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod module;
pub mod permission;
pub mod response;
pub mod role;
pub mod router;
pub mod scope;
pub mod server;
pub mod training;
pub mod transition;
pub mod users;

// Re-export main types at crate root
pub use auth::Session;
pub use config::{Config, Loader, Overrides};
pub use db::Handle as DbHandle;
pub use error::{Error, Result};
pub use module::Module;
pub use permission::{Policy, keys};
pub use role::Role;
pub use router::{Context, Router};
pub use scope::{Caller, DataScope, ScopeFilter, ScopeRules};
pub use transition::{Decision, validate_role_transition};

// Re-export commonly used dependencies for convenience
pub use hyper::Method;
pub use serde_json::json;
