//! Infrastructure layer: relational store adapter.

pub mod postgres;

pub use postgres::PostgresProductStore;
