use crate::*;
use indexmap::IndexMap;

/// Per-choice counts of successfully revealed votes.
///
/// Backed by an IndexMap keyed in declared-choice order - hashmaps are not
/// allowed because their unstable ordering leads to non-determinism in
/// serialized state.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Tally {
    totals: IndexMap<String, u64>,
}

/// The resolved result of a ballot
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A single choice holds strictly more votes than every other
    Winner(String),
    /// The maximum count is shared - all choices holding it, in declared order
    Tie(Vec<String>),
}

impl Tally {
    /// Create a zeroed tally over the declared choices
    pub fn new(choices: &[String]) -> Self {
        let mut totals = IndexMap::with_capacity(choices.len());
        for choice in choices {
            totals.insert(choice.clone(), 0);
        }

        Tally { totals }
    }

    /// Count one revealed vote for a choice
    pub fn record(&mut self, choice: &str) -> Result<(), ValidationError> {
        match self.totals.get_mut(choice) {
            Some(count) => {
                *count += 1;
                Ok(())
            }
            None => Err(ValidationError::UnknownChoice(choice.to_string())),
        }
    }

    /// Number of revealed votes for a single choice (0 for undeclared choices)
    pub fn votes_for(&self, choice: &str) -> u64 {
        self.totals.get(choice).copied().unwrap_or(0)
    }

    /// Total revealed votes across all choices
    pub fn total(&self) -> u64 {
        self.totals.values().sum()
    }

    pub fn totals(&self) -> &IndexMap<String, u64> {
        &self.totals
    }

    /// Resolve the outcome: the unique choice with the most votes, or the
    /// set of choices sharing the maximum count.
    pub fn outcome(&self) -> Outcome {
        let max = self.totals.values().max().copied().unwrap_or(0);

        let mut leaders: Vec<String> = self
            .totals
            .iter()
            .filter(|(_, count)| **count == max)
            .map(|(choice, _)| choice.clone())
            .collect();

        if leaders.len() == 1 {
            Outcome::Winner(leaders.remove(0))
        } else {
            Outcome::Tie(leaders)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn records_only_declared_choices() {
        let mut tally = Tally::new(&choices(&["1", "2"]));

        tally.record("1").unwrap();
        tally.record("2").unwrap();
        tally.record("2").unwrap();
        assert!(matches!(
            tally.record("3"),
            Err(ValidationError::UnknownChoice(_))
        ));

        assert_eq!(tally.votes_for("1"), 1);
        assert_eq!(tally.votes_for("2"), 2);
        assert_eq!(tally.votes_for("3"), 0);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn unique_maximum_wins() {
        let mut tally = Tally::new(&choices(&["1", "2", "3"]));
        tally.record("2").unwrap();
        tally.record("2").unwrap();
        tally.record("3").unwrap();

        assert_eq!(tally.outcome(), Outcome::Winner("2".to_string()));
    }

    #[test]
    fn shared_maximum_is_a_tie() {
        let mut tally = Tally::new(&choices(&["1", "2", "3"]));
        tally.record("1").unwrap();
        tally.record("2").unwrap();

        assert_eq!(tally.outcome(), Outcome::Tie(choices(&["1", "2"])));
    }

    #[test]
    fn no_reveals_ties_every_choice() {
        let tally = Tally::new(&choices(&["1", "2"]));

        assert_eq!(tally.outcome(), Outcome::Tie(choices(&["1", "2"])));
    }
}
