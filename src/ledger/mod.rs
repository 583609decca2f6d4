//! Operation Log Store (C2).

pub mod models;
pub mod repository;

pub use models::{NewOperation, Operation};
