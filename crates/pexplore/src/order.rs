//! Variable orderings
//!
//! Three orderings are tracked for one automaton. `original` is fixed at
//! build time and is the solver's reference frame. `current` follows the
//! user's drag actions and changes optimistically before the solver has
//! answered. `committed` is the ordering the cached solutions and diagram
//! were actually produced under; a failed reorder rolls `current` back to it.

use std::collections::BTreeSet;

use crate::error::SessionError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableOrder {
    original: Vec<String>,
    current: Vec<String>,
    committed: Vec<String>,
}

impl VariableOrder {
    /// Start from the solver's ordering for a fresh build
    pub fn new(variables: Vec<String>) -> Self {
        Self {
            current: variables.clone(),
            committed: variables.clone(),
            original: variables,
        }
    }

    pub fn original(&self) -> &[String] {
        &self.original
    }

    pub fn current(&self) -> &[String] {
        &self.current
    }

    pub fn committed(&self) -> &[String] {
        &self.committed
    }

    /// True when `candidate` holds exactly the build's variables, each once
    pub fn is_permutation(&self, candidate: &[String]) -> bool {
        if candidate.len() != self.original.len() {
            return false;
        }
        let expected: BTreeSet<&str> = self.original.iter().map(String::as_str).collect();
        let seen: BTreeSet<&str> = candidate.iter().map(String::as_str).collect();
        seen.len() == candidate.len() && seen == expected
    }

    /// Ordering produced by dragging the variable at `from` to position `to`
    pub fn moved(&self, from: usize, to: usize) -> Result<Vec<String>, SessionError> {
        let len = self.current.len();
        if from >= len || to >= len {
            return Err(SessionError::InvalidOrder(format!(
                "position out of range (from {}, to {}, {} variables)",
                from, to, len
            )));
        }
        let mut order = self.current.clone();
        let variable = order.remove(from);
        order.insert(to, variable);
        Ok(order)
    }

    /// Optimistically adopt `order` as current
    pub fn set_current(&mut self, order: Vec<String>) -> Result<(), SessionError> {
        if !self.is_permutation(&order) {
            return Err(SessionError::InvalidOrder(format!(
                "[{}] is not a permutation of [{}]",
                order.join(", "),
                self.original.join(", ")
            )));
        }
        self.current = order;
        Ok(())
    }

    /// The solver produced a result for `order`; make it the committed one
    pub fn commit(&mut self, order: Vec<String>) {
        self.committed = order;
    }

    /// Undo optimistic changes after a failed reorder
    pub fn roll_back(&mut self) {
        self.current = self.committed.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_order_is_settled() {
        let order = VariableOrder::new(vars(&["x", "y", "z"]));
        assert_eq!(order.original(), order.current());
        assert_eq!(order.committed(), order.current());
    }

    #[test]
    fn test_moved_drag_semantics() {
        let order = VariableOrder::new(vars(&["x", "y", "z"]));
        assert_eq!(order.moved(0, 2).unwrap(), vars(&["y", "z", "x"]));
        assert_eq!(order.moved(2, 0).unwrap(), vars(&["z", "x", "y"]));
        assert_eq!(order.moved(1, 1).unwrap(), vars(&["x", "y", "z"]));
        assert!(order.moved(3, 0).is_err());
    }

    #[test]
    fn test_rejects_non_permutations() {
        let mut order = VariableOrder::new(vars(&["x", "y", "z"]));
        assert!(order.set_current(vars(&["x", "y"])).is_err());
        assert!(order.set_current(vars(&["x", "x", "y"])).is_err());
        assert!(order.set_current(vars(&["x", "y", "w"])).is_err());
        assert_eq!(order.current(), vars(&["x", "y", "z"]).as_slice());
    }

    #[test]
    fn test_commit_and_roll_back() {
        let mut order = VariableOrder::new(vars(&["x", "y", "z"]));
        order.set_current(vars(&["z", "y", "x"])).unwrap();
        assert_ne!(order.current(), order.committed());

        order.roll_back();
        assert_eq!(order.current(), vars(&["x", "y", "z"]).as_slice());

        order.set_current(vars(&["y", "x", "z"])).unwrap();
        order.commit(vars(&["y", "x", "z"]));
        assert_eq!(order.current(), order.committed());
        assert_eq!(order.original(), vars(&["x", "y", "z"]).as_slice());
    }
}
