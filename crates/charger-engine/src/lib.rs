//! Decision engine
//!
//! This crate turns one tick's worth of inputs into a single charger
//! command.
//!
//! # Architecture
//!
//! ```text
//! TELEMETRY + SAFETY + STAGING + HOME → RULES (first match wins) → DIRECTION
//! ```
//!
//! - [`rules`]: the ordered rule table and the pure [`decide`] function
//! - [`staging`]: the one-shot pre-drop window and the condition that arms it
//!
//! The engine holds no memory between ticks. Clearing an expired staging
//! window is the caller's job, via [`StagingTimer::advance`].

pub mod rules;
pub mod staging;

pub use rules::{decide, evaluate, Decision, DecisionInput, Rule, RULES};
pub use staging::{
    staging_condition, StagingState, StagingTimer, STAGING_DURATION, STAGING_HEADING_ARC,
};
