//! # grange-db
//!
//! Database layer implementing the grange-core ports with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for all repository traits
//! defined in `grange-core`. It handles:
//!
//! - Connection pool management
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations, including the transactional acceptance unit
//!
//! ## Usage
//!
//! ```rust,ignore
//! use grange_db::pool::{create_pool, DatabaseConfig};
//! use grange_db::repositories::PgMembershipRepository;
//! use grange_core::MembershipRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env();
//!     let pool = create_pool(&config).await?;
//!     let memberships = PgMembershipRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, create_pool_from_env, DatabaseConfig, PgPool};
pub use repositories::{
    PgAcceptanceUnit, PgGroupRepository, PgInvitationRepository, PgMembershipRepository,
    PgUserDirectory, PgUserStatsRepository,
};
