//! Search: typed conditions compiled into backend-neutral predicates.

pub mod compiler;
pub mod condition;
pub mod predicate;

pub use compiler::{compile_condition, compile_search};
pub use condition::{Condition, ConditionOperator};
pub use predicate::{CompareOp, Predicate};
