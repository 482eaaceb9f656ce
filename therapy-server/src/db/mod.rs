//! Database layer - connection pool, schema, query descriptors and repositories
//!
//! # Design Principles
//!
//! - Handlers depend on repository traits, never on a pool directly
//! - Label search loads stubs with JOINs - no N+1 queries
//! - Batched label changes commit inside one transaction

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod query;
pub mod repos;
pub mod unit_of_work;

pub use error::DbError;
pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_options};
pub use sqlx::PgPool;
pub use query::{LabelQuery, StubFilter};
pub use repos::*;
pub use unit_of_work::{FlushOutcome, LabelChange, UnitOfWork};
