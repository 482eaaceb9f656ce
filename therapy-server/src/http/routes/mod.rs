//! Route handlers, one module per resource

pub mod health;
pub mod labels;
pub mod main;
pub mod stubs;
