//! The ordered buffer of queued command ids.

use serde::{Deserialize, Serialize};

/// The learner's program: command ids in insertion order, repeats
/// allowed.
///
/// The buffer itself imposes no usability constraint; callers gate
/// appends on the unlock rules, which keeps replay and stepping simple.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program(Vec<String>);

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command_id: impl Into<String>) {
        self.0.push(command_id.into());
    }

    /// Removes the most recently appended command. `None` when empty.
    pub fn pop_last(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Program {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order_and_repeats() {
        let mut program = Program::new();
        program.push("right");
        program.push("right");
        program.push("jump");

        assert_eq!(program.len(), 3);
        assert_eq!(program.get(0), Some("right"));
        assert_eq!(program.get(1), Some("right"));
        assert_eq!(program.get(2), Some("jump"));
    }

    #[test]
    fn test_pop_last_on_empty_is_noop() {
        let mut program = Program::new();
        assert_eq!(program.pop_last(), None);

        program.push("up");
        assert_eq!(program.pop_last(), Some("up".to_string()));
        assert!(program.is_empty());
    }

    #[test]
    fn test_clear_empties_buffer() {
        let mut program: Program = ["up", "down"].into_iter().collect();
        program.clear();
        assert!(program.is_empty());
    }
}
