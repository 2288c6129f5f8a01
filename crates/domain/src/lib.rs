//! Shared data model for the opportunity pipeline.
//!
//! Pure types only: everything here serializes cleanly and carries no I/O.
//! Adapters build these fresh on every fetch; nothing is mutated after
//! construction.

pub mod message;
pub mod opportunity;

pub use message::{ChatMessage, MessageRole, NewMessage};
pub use opportunity::{Category, Deadline, Opportunity, OpportunityType, ParseCategoryError};
