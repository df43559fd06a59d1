//! Plan/apply engine for declared workspaces
//!
//! 1. Planning - compare the declaration against tracked state
//! 2. Executing - run lifecycle calls in parallel and collect state changes

pub mod differ;
pub mod executor;

pub use differ::{compute_destroy_plans, compute_plans, display_plans};
pub use executor::{ExecuteOptions, execute};
