use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Shown when the fact source yields no facts at all.
pub const EMPTY_PLACEHOLDER: &str = "Add facts to facts.txt (one fact per line).";

/// A fact resolved from the deck, with its 1-based position in the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fact<'a> {
    pub text: &'a str,
    pub position: usize,
    pub total: usize,
}

impl Fact<'_> {
    /// Text placed on the clipboard for this fact.
    pub fn share_text(&self) -> String {
        format!("Fact #{}: {}", self.position, self.text)
    }
}

/// Random, non-repeating traversal over a fixed list of facts.
///
/// Every cycle visits each fact exactly once in a freshly shuffled order.
/// Advancing past the end of a cycle reshuffles and starts over.
pub struct Deck {
    facts: Vec<String>,
    order: Vec<usize>,
    cursor: Option<usize>,
    avoid_boundary_repeat: bool,
    rng: StdRng,
}

impl Deck {
    pub fn new(facts: Vec<String>) -> Self {
        Self::with_rng(facts, StdRng::from_entropy())
    }

    pub fn with_rng(facts: Vec<String>, rng: StdRng) -> Self {
        let facts = if facts.is_empty() {
            vec![EMPTY_PLACEHOLDER.to_string()]
        } else {
            facts
        };
        let mut deck = Self {
            order: (0..facts.len()).collect(),
            facts,
            cursor: None,
            avoid_boundary_repeat: false,
            rng,
        };
        deck.order.shuffle(&mut deck.rng);
        deck
    }

    /// Keep the fact shown last in a cycle out of the first slot of the next one.
    pub fn avoid_boundary_repeat(mut self, enabled: bool) -> Self {
        self.avoid_boundary_repeat = enabled;
        self
    }

    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Current traversal order (indices into the fact list).
    #[cfg(test)]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    #[cfg(test)]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn advance(&mut self) -> Fact<'_> {
        let next = match self.cursor {
            Some(c) if c + 1 >= self.order.len() => {
                let last = self.order[c];
                self.reshuffle(last);
                0
            }
            Some(c) => c + 1,
            None => 0,
        };
        self.cursor = Some(next);
        self.resolve(next)
    }

    pub fn retreat(&mut self) -> Fact<'_> {
        let prev = self.cursor.map_or(0, |c| c.saturating_sub(1));
        self.cursor = Some(prev);
        self.resolve(prev)
    }

    pub fn current(&self) -> Option<Fact<'_>> {
        self.cursor.map(|c| self.resolve(c))
    }

    fn reshuffle(&mut self, last_shown: usize) {
        self.order.shuffle(&mut self.rng);
        if self.avoid_boundary_repeat && self.order.len() > 1 && self.order[0] == last_shown {
            let swap = self.rng.gen_range(1..self.order.len());
            self.order.swap(0, swap);
        }
        tracing::debug!(facts = self.order.len(), "deck reshuffled");
    }

    fn resolve(&self, cursor: usize) -> Fact<'_> {
        Fact {
            text: &self.facts[self.order[cursor]],
            position: cursor + 1,
            total: self.order.len(),
        }
    }
}
