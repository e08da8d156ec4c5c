//! # trycatcher Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and
//! traits. Import it to declare categories, implement [`Categorized`] and build a
//! [`TryCatcher`] without individual imports.

/// The error type for failures the dispatcher does not catch
pub use crate::Error;

/// The result type returned by [`TryCatcher::execute`]
pub use crate::Result;

/// Category hierarchy and the trait failures implement to join it
pub use crate::category::{Categorized, Category};

/// Handler storage and its handler type
pub use crate::catchmap::{CatchBlock, CatchMap};

/// The dispatcher and its lifecycle state
pub use crate::trycatcher::{ExecutionState, TryCatcher};
