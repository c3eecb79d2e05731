//! State machine trait for status enums.

use super::ValidationError;

/// Status enums with a fixed transition table.
///
/// Implementors list their edges; callers go through [`transition_to`]
/// so an illegal change surfaces as a validation error.
///
/// [`transition_to`]: StateMachine::transition_to
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    fn can_transition_to(&self, target: &Self) -> bool;

    fn valid_transitions(&self) -> Vec<Self>;

    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self == &target || self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "status",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// True when no outgoing transitions exist.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
