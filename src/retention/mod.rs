//! Retention decisions for logbackup
//!
//! Decides which backups to delete so that backup density falls off
//! logarithmically with age.
//!
//! # Architecture
//!
//! - `RetentionPolicy`: validated parameters (interval, cap, horizon, strategy)
//! - `RetentionEngine`: pure function from records + `now` to a plan
//! - `RetentionPlan`: what to keep, what to delete and why, and the bucket
//!   assignment of every record
//!
//! # Example
//!
//! ```rust,ignore
//! use logbackup::retention::{RetentionEngine, RetentionPolicy};
//!
//! let engine = RetentionEngine::new(RetentionPolicy::default());
//! let plan = engine.plan(&records, chrono::Utc::now());
//! for deletion in &plan.deletions {
//!     println!("{} ({})", deletion.record.identifier, deletion.reason);
//! }
//! ```

pub mod bucket;
mod decay;
mod engine;
mod plan;
mod policy;

pub use bucket::{bucket_bounds_secs, bucket_index};
pub use engine::RetentionEngine;
pub use plan::{BucketAssignment, DeletionReason, PlannedDeletion, RetentionPlan};
pub use policy::{RetentionPolicy, RetentionStrategy};
