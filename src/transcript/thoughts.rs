/// Label shown while the thoughts are collapsed.
pub const SHOW_THOUGHTS_LABEL: &str = "Show thoughts 🤔";
/// Label shown while the thoughts are expanded.
pub const HIDE_THOUGHTS_LABEL: &str = "Hide thoughts";

/// A disclosure control holding the assistant's reasoning steps for one reply.
///
/// Starts collapsed. Only constructible from a non-empty list of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thoughts {
    steps: Vec<String>,
    expanded: bool,
}

impl Thoughts {
    /// Returns `None` when there is nothing to disclose.
    pub fn new(steps: Vec<String>) -> Option<Self> {
        if steps.is_empty() {
            return None;
        }
        Some(Self {
            steps,
            expanded: false,
        })
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub const fn label(&self) -> &'static str {
        if self.expanded {
            HIDE_THOUGHTS_LABEL
        } else {
            SHOW_THOUGHTS_LABEL
        }
    }

    /// Flips visibility and returns the new state.
    pub const fn toggle(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    /// Steps separated by blank lines, the way they are displayed.
    pub fn joined(&self) -> String {
        self.steps.join("\n\n")
    }
}
