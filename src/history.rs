//! Bounded conversation context.
//!
//! Each category (or chat session) owns one `ConversationHistory` holding
//! the last ten query/response turns, rendered into the prompt so the
//! model sees recent context without unbounded growth.

use serde::{Deserialize, Serialize};

/// Turns retained per category.
const MAX_TURNS: usize = 10;

/// One query/response exchange. Immutable once pushed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub query: String,
    pub response: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, evicting the oldest once the cap is exceeded.
    pub fn push(&mut self, query: String, response: String) {
        self.turns.push(Turn { query, response });
        if self.turns.len() > MAX_TURNS {
            self.turns.remove(0);
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Render the transcript used as prompt context.
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("Human: {}\nAI: {}", t.query, t.response))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_ten_turns() {
        let mut history = ConversationHistory::new();
        for i in 0..25 {
            history.push(format!("q{i}"), format!("a{i}"));
            assert!(history.len() <= MAX_TURNS);
        }
        assert_eq!(history.len(), MAX_TURNS);
    }

    #[test]
    fn eviction_is_fifo() {
        let mut history = ConversationHistory::new();
        for i in 0..12 {
            history.push(format!("q{i}"), format!("a{i}"));
        }
        // q0 and q1 evicted, q2 now oldest
        assert_eq!(history.turns()[0].query, "q2");
        assert_eq!(history.turns().last().unwrap().query, "q11");
    }

    #[test]
    fn renders_human_ai_transcript() {
        let mut history = ConversationHistory::new();
        history.push("What is Rust?".into(), "A systems language.".into());
        history.push("Is it fast?".into(), "Yes.".into());
        assert_eq!(
            history.render(),
            "Human: What is Rust?\nAI: A systems language.\nHuman: Is it fast?\nAI: Yes."
        );
    }

    #[test]
    fn empty_history_renders_empty() {
        assert_eq!(ConversationHistory::new().render(), "");
    }
}
