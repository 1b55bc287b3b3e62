use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Exchanges kept per user unless configured otherwise
pub const DEFAULT_MEMORY_WINDOW: usize = 3;

/// One question and the reply the user got for it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exchange {
    pub question: String,
    pub reply: String,
}

/// Rolling window over the most recent exchanges with one user.
///
/// Only the last `window` exchanges are retained; older ones are dropped
/// as new ones arrive.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    window: usize,
    turns: VecDeque<Exchange>,
}

impl ConversationMemory {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            turns: VecDeque::with_capacity(window),
        }
    }

    pub fn record(&mut self, question: impl Into<String>, reply: impl Into<String>) {
        if self.window == 0 {
            return;
        }
        while self.turns.len() >= self.window {
            self.turns.pop_front();
        }
        self.turns.push_back(Exchange {
            question: question.into(),
            reply: reply.into(),
        });
    }

    /// Oldest first
    pub fn exchanges(&self) -> impl Iterator<Item = &Exchange> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_last_k() {
        let mut memory = ConversationMemory::new(3);
        for i in 0..5 {
            memory.record(format!("q{i}"), format!("a{i}"));
        }
        assert_eq!(memory.len(), 3);
        let questions: Vec<_> = memory.exchanges().map(|e| e.question.as_str()).collect();
        assert_eq!(questions, ["q2", "q3", "q4"]);
    }

    #[test]
    fn zero_window_keeps_nothing() {
        let mut memory = ConversationMemory::new(0);
        memory.record("q", "a");
        assert!(memory.is_empty());
    }
}
