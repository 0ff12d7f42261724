//! Algorithmic core: cost model, rotation selection and fairness math.
//!
//! # Responsibility
//! - Keep the scheduling rules pure and side-effect free.
//! - Leave ledger application and persistence to repositories/services.
//!
//! # Invariants
//! - Every function here is deterministic for identical inputs.
//! - Tie-breaks always resolve to the first-encountered element in roster
//!   or history order.

pub mod cost;
pub mod fairness;
pub mod rotation;
