use crate::*;
use ed25519_dalek::ExpandedSecretKey;
use ed25519_dalek::PublicKey;
use ed25519_dalek::SecretKey;
use ed25519_dalek::Signature;
use ed25519_dalek::Verifier;
use serde::Serialize;
use std::convert::AsRef;
use std::ops::Deref;
use uuid::Uuid;

/// Commit a vote: store an opaque commitment hash under the voter's identity
#[derive(Serialize, Deserialize, Clone)]
pub struct CommitTransaction {
    pub ballot_id: Uuid,

    /// Voter public key - the transaction must be signed by the matching
    /// secret key.
    #[serde(with = "EdPublicKeyHex")]
    pub public_key: PublicKey,

    pub commitment: Commitment,
}

/// Reveal a vote: present the `(choice, nonce)` preimage for verification
/// against the stored commitment.
#[derive(Serialize, Deserialize, Clone)]
pub struct RevealTransaction {
    pub ballot_id: Uuid,

    #[serde(with = "EdPublicKeyHex")]
    pub public_key: PublicKey,

    pub choice: String,

    #[serde(with = "HexForm")]
    pub nonce: Vec<u8>,
}

impl CommitTransaction {
    pub fn new(ballot_id: Uuid, public_key: PublicKey, commitment: Commitment) -> Self {
        CommitTransaction {
            ballot_id,
            public_key,
            commitment,
        }
    }
}

impl RevealTransaction {
    pub fn new(ballot_id: Uuid, public_key: PublicKey, choice: String, nonce: Vec<u8>) -> Self {
        RevealTransaction {
            ballot_id,
            public_key,
            choice,
            nonce,
        }
    }
}

impl Signable for CommitTransaction {
    fn ballot_id(&self) -> Uuid {
        self.ballot_id
    }

    fn public(&self) -> Option<PublicKey> {
        Some(self.public_key)
    }
}

impl Signable for RevealTransaction {
    fn ballot_id(&self) -> Uuid {
        self.ballot_id
    }

    fn public(&self) -> Option<PublicKey> {
        Some(self.public_key)
    }
}

/// This trait should be considered sealed and should not be implemented outside this crate
#[doc(hidden)]
pub trait Signable: Serialize {
    fn ballot_id(&self) -> Uuid;
    fn public(&self) -> Option<PublicKey>;

    fn as_bytes(&self) -> Vec<u8> {
        serde_cbor::to_vec(&self).expect("commitballot: Unexpected error serializing transaction")
    }
}

/// A generic signed transaction
#[derive(Serialize, Deserialize, Clone)]
pub struct Signed<T: Signable + Serialize> {
    pub tx: T,

    #[serde(with = "EdSignatureHex")]
    pub sig: Signature,
}

impl<T: Signable + Serialize> Signed<T> {
    /// Sign a transaction, producing a Signed<T>
    pub fn sign(secret: &SecretKey, transaction: T) -> Result<Self, Error> {
        let public_key = PublicKey::from(secret);
        if let Some(tx_public) = transaction.public() {
            if public_key != tx_public {
                return Err(Error::MismatchedPublicKeys);
            }
        }

        let serialized = transaction.as_bytes();

        let expanded: ExpandedSecretKey = secret.into();
        let signature = expanded.sign(&serialized, &public_key);

        Ok(Signed {
            tx: transaction,
            sig: signature,
        })
    }

    /// Verify the signature on a signed transaction
    pub fn verify_signature(&self) -> Result<(), ValidationError> {
        let serialized = self.tx.as_bytes();

        if let Some(tx_public) = self.tx.public() {
            Ok(tx_public.verify(&serialized, &self.sig)?)
        } else {
            Ok(())
        }
    }

    /// Get the inner unsigned transaction
    pub fn inner(&self) -> &T {
        &self.tx
    }

    /// Get the ballot this transaction targets
    pub fn ballot_id(&self) -> Uuid {
        self.tx.ballot_id()
    }
}

impl<T: Signable + Serialize> AsRef<T> for Signed<T> {
    fn as_ref(&self) -> &T {
        &self.tx
    }
}

impl<T: Signable + Serialize> Deref for Signed<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}

/// A signed commit or reveal operation
#[derive(Serialize, Deserialize, Clone)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum SignedTransaction {
    Commit(Signed<CommitTransaction>),
    Reveal(Signed<RevealTransaction>),
}

impl SignedTransaction {
    /// Get the transaction type
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            SignedTransaction::Commit(_) => TransactionType::Commit,
            SignedTransaction::Reveal(_) => TransactionType::Reveal,
        }
    }

    /// Get the ballot this transaction targets
    pub fn ballot_id(&self) -> Uuid {
        match self {
            SignedTransaction::Commit(signed) => signed.ballot_id(),
            SignedTransaction::Reveal(signed) => signed.ballot_id(),
        }
    }

    /// Get the voter identity the transaction claims
    pub fn voter(&self) -> VoterId {
        match self {
            SignedTransaction::Commit(signed) => VoterId::from(&signed.tx.public_key),
            SignedTransaction::Reveal(signed) => VoterId::from(&signed.tx.public_key),
        }
    }

    /// Verify the voter's signature over the transaction payload
    pub fn verify_signature(&self) -> Result<(), ValidationError> {
        match self {
            SignedTransaction::Commit(signed) => signed.verify_signature(),
            SignedTransaction::Reveal(signed) => signed.verify_signature(),
        }
    }

    /// Verify the signature and apply the operation to a ballot
    ///
    /// The ballot is untouched unless the signature checks out, the
    /// transaction targets this ballot, and the operation itself is valid.
    pub fn apply<C: Clock>(&self, ballot: &mut Ballot, clock: &C) -> Result<(), ValidationError> {
        self.verify_signature()?;

        if self.ballot_id() != ballot.id() {
            return Err(ValidationError::BallotMismatch);
        }

        match self {
            SignedTransaction::Commit(signed) => {
                let tx = signed.inner();
                ballot.commit(clock, VoterId::from(&tx.public_key), tx.commitment)
            }
            SignedTransaction::Reveal(signed) => {
                let tx = signed.inner();
                ballot.reveal(clock, VoterId::from(&tx.public_key), &tx.choice, &tx.nonce)
            }
        }
    }

    /// Pack into bytes
    pub fn as_bytes(&self) -> Vec<u8> {
        serde_cbor::to_vec(self).expect("commitballot: Unexpected error packing transaction")
    }

    /// Unpack from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        // If it starts with `{` then it's JSON
        match bytes.first() {
            Some(&123) => Ok(serde_json::from_slice(&bytes)?),
            Some(_) => Ok(serde_cbor::from_slice(&bytes)?),
            None => Err(Error::DeserializationUnknownFormat),
        }
    }
}

/// A transaction type
#[derive(Serialize, Deserialize, Copy, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Commit,
    Reveal,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            TransactionType::Commit => "Commit",
            TransactionType::Reveal => "Reveal",
        };
        write!(f, "{}", name)
    }
}

// Automatic translation between types
// ----------------------------------

impl From<Signed<CommitTransaction>> for SignedTransaction {
    fn from(tx: Signed<CommitTransaction>) -> Self {
        SignedTransaction::Commit(tx)
    }
}

impl From<Signed<RevealTransaction>> for SignedTransaction {
    fn from(tx: Signed<RevealTransaction>) -> Self {
        SignedTransaction::Reveal(tx)
    }
}

impl AsRef<CommitTransaction> for SignedTransaction {
    fn as_ref(&self) -> &CommitTransaction {
        match self {
            SignedTransaction::Commit(signed) => &signed.tx,
            _ => panic!("wrong transaction type expected"),
        }
    }
}

impl AsRef<RevealTransaction> for SignedTransaction {
    fn as_ref(&self) -> &RevealTransaction {
        match self {
            SignedTransaction::Reveal(signed) => &signed.tx,
            _ => panic!("wrong transaction type expected"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn choices(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn sign_and_verify() {
        let (secret, public) = generate_keypair();
        let (bad_secret, _bad_public) = generate_keypair();

        let ballot_id = Uuid::new_v4();
        let tx = CommitTransaction::new(ballot_id, public, Commitment::new("1", b"n"));

        // Signing with the wrong key should fail
        assert!(Signed::sign(&bad_secret, tx.clone()).is_err());

        let signed = Signed::sign(&secret, tx).unwrap();
        signed.verify_signature().unwrap();
        assert_eq!(signed.ballot_id(), ballot_id);

        // Tampering with the payload invalidates the signature
        let mut tampered = signed.clone();
        tampered.tx.commitment = Commitment::new("2", b"n");
        assert!(tampered.verify_signature().is_err());
    }

    #[test]
    fn apply_checks_signature_and_ballot() {
        let clock = ManualClock::new(0);
        let mut ballot = Ballot::open(&clock, choices(&["1", "2"]), 1_000, 1_000).unwrap();

        let (secret, public) = generate_keypair();
        let commitment = Commitment::new("1", b"secret00");

        // A transaction for some other ballot is rejected
        let stray = CommitTransaction::new(Uuid::new_v4(), public, commitment);
        let stray = SignedTransaction::from(Signed::sign(&secret, stray).unwrap());
        assert!(matches!(
            stray.apply(&mut ballot, &clock),
            Err(ValidationError::BallotMismatch)
        ));
        assert_eq!(ballot.number_of_votes_cast(), 0);

        let tx = CommitTransaction::new(ballot.id(), public, commitment);
        let tx = SignedTransaction::from(Signed::sign(&secret, tx).unwrap());
        assert_eq!(tx.transaction_type(), TransactionType::Commit);
        tx.apply(&mut ballot, &clock).unwrap();
        assert_eq!(ballot.number_of_votes_cast(), 1);

        clock.set(1_000);
        let reveal = RevealTransaction::new(
            ballot.id(),
            public,
            "1".to_string(),
            b"secret00".to_vec(),
        );
        let reveal = SignedTransaction::from(Signed::sign(&secret, reveal).unwrap());
        assert_eq!(reveal.voter(), VoterId::from(&public));
        reveal.apply(&mut ballot, &clock).unwrap();
        assert_eq!(ballot.votes_for_choice("1"), 1);
    }

    #[test]
    fn transactions_round_trip_through_bytes() {
        let (secret, public) = generate_keypair();
        let tx = CommitTransaction::new(Uuid::new_v4(), public, Commitment::new("2", b"n"));
        let signed = SignedTransaction::from(Signed::sign(&secret, tx).unwrap());

        // CBOR
        let packed = signed.as_bytes();
        let unpacked = SignedTransaction::from_bytes(&packed).unwrap();
        assert_eq!(unpacked.ballot_id(), signed.ballot_id());
        unpacked.verify_signature().unwrap();

        // JSON
        let packed = serde_json::to_vec(&signed).unwrap();
        let unpacked = SignedTransaction::from_bytes(&packed).unwrap();
        assert_eq!(unpacked.voter(), signed.voter());
        unpacked.verify_signature().unwrap();

        assert!(SignedTransaction::from_bytes(&[]).is_err());
    }
}
