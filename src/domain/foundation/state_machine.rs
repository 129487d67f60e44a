//! State machine trait for lifecycle enums.

use super::InvalidTransition;

/// Trait for status enums whose changes must follow a fixed set of edges.
///
/// Implementors list the allowed edges in `can_transition_to` and get a
/// checked `transition_to` for free.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, InvalidTransition> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(InvalidTransition::between(self, target))
        }
    }
}
