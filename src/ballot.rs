use crate::*;
use indexmap::{IndexMap, IndexSet};
use tracing::debug;
use uuid::Uuid;

/// Phase of a commit-reveal ballot
///
/// The phase is never stored - every operation derives it from the clock at
/// invocation time by comparing against the window boundaries fixed at
/// creation.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Accepting vote commitments
    Commit,
    /// Accepting vote reveals
    Reveal,
    /// Reveal window elapsed, results are final
    Ended,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Phase::Commit => "commit",
            Phase::Reveal => "reveal",
            Phase::Ended => "ended",
        };
        write!(f, "{}", name)
    }
}

/// A single commit-reveal voting round.
///
/// Voters commit an opaque hash of `(choice, nonce)` during the commit
/// window, then reveal the preimage during the reveal window; a reveal is
/// tallied only if it hashes to exactly the stored commitment. Once the
/// reveal window elapses the outcome is stable and repeatable.
///
/// The ballot owns all round state. Mutating operations take `&mut self`,
/// which is the serialization guarantee - each call is one indivisible
/// check-then-mutate step, and a rejected call changes nothing. Commitments
/// and reveal records persist after the round ends so the tally can be
/// audited against them.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Ballot {
    id: Uuid,

    /// Choice identifiers voters may commit to, fixed at creation
    choices: Vec<String>,

    /// Commits are accepted while `now < commit_window_end`
    commit_window_end: Timestamp,

    /// Reveals are accepted while `commit_window_end <= now < reveal_window_end`
    reveal_window_end: Timestamp,

    commitments: IndexMap<VoterId, Commitment>,
    revealed: IndexSet<VoterId>,
    tally: Tally,

    votes_cast: usize,
    votes_revealed: usize,
}

impl Ballot {
    /// Create a ballot with absolute window boundaries
    pub fn new(
        choices: Vec<String>,
        commit_window_end: Timestamp,
        reveal_window_end: Timestamp,
    ) -> Result<Self, Error> {
        if choices.is_empty() {
            return Err(Error::NoChoices);
        }
        for (i, choice) in choices.iter().enumerate() {
            if choices[..i].contains(choice) {
                return Err(Error::DuplicateChoice(choice.clone()));
            }
        }
        if reveal_window_end <= commit_window_end {
            return Err(Error::InvalidWindows);
        }

        let tally = Tally::new(&choices);

        Ok(Ballot {
            id: Uuid::new_v4(),
            choices,
            commit_window_end,
            reveal_window_end,
            commitments: IndexMap::new(),
            revealed: IndexSet::new(),
            tally,
            votes_cast: 0,
            votes_revealed: 0,
        })
    }

    /// Create a ballot whose windows start now and run for the given durations
    pub fn open<C: Clock>(
        clock: &C,
        choices: Vec<String>,
        commit_duration_millis: i64,
        reveal_duration_millis: i64,
    ) -> Result<Self, Error> {
        let now = clock.now();

        Self::new(
            choices,
            now + commit_duration_millis,
            now + commit_duration_millis + reveal_duration_millis,
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn commit_window_end(&self) -> Timestamp {
        self.commit_window_end
    }

    pub fn reveal_window_end(&self) -> Timestamp {
        self.reveal_window_end
    }

    /// Derive the current phase from the clock
    pub fn phase<C: Clock>(&self, clock: &C) -> Phase {
        let now = clock.now();

        if now < self.commit_window_end {
            Phase::Commit
        } else if now < self.reveal_window_end {
            Phase::Reveal
        } else {
            Phase::Ended
        }
    }

    fn require_phase<C: Clock>(&self, clock: &C, required: Phase) -> Result<(), ValidationError> {
        let current = self.phase(clock);
        if current != required {
            return Err(ValidationError::PhaseViolation { required, current });
        }

        Ok(())
    }

    /// Store a voter's commitment
    ///
    /// One-shot per voter: a second commit is rejected and the original
    /// commitment is left intact. The hash is stored opaquely - nothing
    /// about the committed choice is learned until reveal.
    pub fn commit<C: Clock>(
        &mut self,
        clock: &C,
        voter: VoterId,
        commitment: Commitment,
    ) -> Result<(), ValidationError> {
        self.require_phase(clock, Phase::Commit)?;

        if self.commitments.contains_key(&voter) {
            return Err(ValidationError::DuplicateCommit(voter));
        }

        self.commitments.insert(voter, commitment);
        self.votes_cast += 1;

        debug!(ballot = %self.id, %voter, "vote commitment recorded");
        Ok(())
    }

    /// Reveal a voter's `(choice, nonce)` preimage and count the vote
    ///
    /// The vote is tallied only if the preimage hashes to exactly the stored
    /// commitment and the choice is one the ballot declares. Every check
    /// runs before any mutation, so a rejected reveal changes nothing.
    pub fn reveal<C: Clock>(
        &mut self,
        clock: &C,
        voter: VoterId,
        choice: &str,
        nonce: &[u8],
    ) -> Result<(), ValidationError> {
        self.require_phase(clock, Phase::Reveal)?;

        let commitment = self
            .commitments
            .get(&voter)
            .ok_or(ValidationError::NoCommitment(voter))?;

        if self.revealed.contains(&voter) {
            return Err(ValidationError::AlreadyRevealed(voter));
        }

        commitment.verify(choice, nonce)?;

        // record() rejects undeclared choices without mutating
        self.tally.record(choice)?;
        self.revealed.insert(voter);
        self.votes_revealed += 1;

        debug!(ballot = %self.id, %voter, choice, "vote revealed");
        Ok(())
    }

    /// Number of distinct voters who committed
    ///
    /// A live counter until the commit window closes, not a final result.
    pub fn number_of_votes_cast(&self) -> usize {
        self.votes_cast
    }

    /// Number of distinct voters who successfully revealed
    pub fn votes_revealed(&self) -> usize {
        self.votes_revealed
    }

    /// Revealed votes for a single choice - a live counter until the reveal
    /// window closes.
    pub fn votes_for_choice(&self, choice: &str) -> u64 {
        self.tally.votes_for(choice)
    }

    /// Per-choice totals in declared order
    pub fn totals(&self) -> &IndexMap<String, u64> {
        self.tally.totals()
    }

    pub fn commitment_for(&self, voter: &VoterId) -> Option<&Commitment> {
        self.commitments.get(voter)
    }

    pub fn has_revealed(&self, voter: &VoterId) -> bool {
        self.revealed.contains(voter)
    }

    /// Resolve the final outcome
    ///
    /// Only valid once the reveal window has fully elapsed; until then the
    /// tally may still grow, so this rejects with `VotingNotFinished`.
    /// Afterwards it may be called repeatedly with a stable answer.
    pub fn winner<C: Clock>(&self, clock: &C) -> Result<Outcome, ValidationError> {
        if self.phase(clock) != Phase::Ended {
            return Err(ValidationError::VotingNotFinished);
        }

        Ok(self.tally.outcome())
    }
}
