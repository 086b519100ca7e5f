use crate::*;

use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("commitballot: signature error: {0}")]
    SignatureError(#[from] ed25519_dalek::SignatureError),

    #[error("commitballot: ballot must declare at least one choice")]
    NoChoices,

    #[error("commitballot: duplicate choice declared: {0}")]
    DuplicateChoice(String),

    #[error("commitballot: reveal window must end after the commit window")]
    InvalidWindows,

    #[error("commitballot: invalid commitment - invalid hexidecimal")]
    CommitmentBadHex,

    #[error("commitballot: invalid commitment - wrong length")]
    CommitmentBadLen,

    #[error("commitballot: invalid voter-id - invalid hexidecimal")]
    VoterIdBadHex,

    #[error("commitballot: invalid voter-id - wrong length")]
    VoterIdBadLen,

    #[error("commitballot: CBOR error deserializing transaction: {0}")]
    CBORDeserialization(#[from] serde_cbor::Error),

    #[error("commitballot: JSON error deserializing transaction: {0}")]
    JSONDeserialization(#[from] serde_json::Error),

    #[error("commitballot: error deserializing transaction: unknown format")]
    DeserializationUnknownFormat,

    #[error("commitballot: mismatched public keys")]
    MismatchedPublicKeys,
}

/// Operation rejection errors
///
/// A rejected operation leaves the ballot exactly as it was - there is no
/// partial-failure mode and nothing to retry; the caller must correct the
/// input (wait for the right phase, supply the matching preimage) and
/// resubmit.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("commitballot validation: ballot is in the {current} phase but the operation requires the {required} phase")]
    PhaseViolation { required: Phase, current: Phase },

    #[error("commitballot validation: voter {0} has already committed")]
    DuplicateCommit(VoterId),

    #[error("commitballot validation: voter {0} has no commitment")]
    NoCommitment(VoterId),

    #[error("commitballot validation: voter {0} has already revealed")]
    AlreadyRevealed(VoterId),

    #[error("commitballot validation: revealed vote does not match the stored commitment")]
    HashMismatch,

    #[error("commitballot validation: voting is not finished")]
    VotingNotFinished,

    #[error("commitballot validation: choice does not exist in ballot: {0}")]
    UnknownChoice(String),

    #[error("commitballot validation: ballot mismatch")]
    BallotMismatch,

    #[error("commitballot validation: signature error: {0}")]
    SignatureError(#[from] ed25519_dalek::SignatureError),
}
