//! `batchline-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** values (no infrastructure concerns).

pub mod id;
pub mod record;
pub mod trace;

pub use id::RunId;
pub use record::{LOYALTY_OFF, LoyaltyRecord, ProductRecord};
pub use trace::TraceContext;
