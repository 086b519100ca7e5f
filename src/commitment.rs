use crate::*;
use digest::Digest;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha256;
use std::convert::TryInto;
use std::str::FromStr;

/// A vote commitment - a one-way hash binding a voter to a choice and a
/// secret nonce without revealing either until the reveal phase.
///
/// The hash is SHA-256 over a length-prefixed encoding of both fields:
///
/// ```text
/// Sha256( le_u64(len(choice)) || choice || le_u64(len(nonce)) || nonce )
/// ```
///
/// Length prefixes make the encoding unambiguous for arbitrary byte content,
/// so no `(choice, nonce)` pair can collide with another by concatenating to
/// the same byte string.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Commitment([u8; 32]);

impl Commitment {
    /// Compute the commitment for a choice and nonce
    pub fn new(choice: &str, nonce: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(&(choice.len() as u64).to_le_bytes());
        hasher.update(choice.as_bytes());
        hasher.update(&(nonce.len() as u64).to_le_bytes());
        hasher.update(nonce);

        Commitment(hasher.finalize().into())
    }

    /// Check that a revealed `(choice, nonce)` preimage hashes to exactly
    /// this commitment.
    ///
    /// This is the integrity check that stops a voter revealing a vote
    /// different from the one committed, or revealing against someone
    /// else's commitment.
    pub fn verify(&self, choice: &str, nonce: &[u8]) -> Result<(), ValidationError> {
        if Commitment::new(choice, nonce) != *self {
            return Err(ValidationError::HashMismatch);
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn to_array(&self) -> [u8; 32] {
        self.0
    }
}

impl From<[u8; 32]> for Commitment {
    fn from(bytes: [u8; 32]) -> Self {
        Commitment(bytes)
    }
}

impl FromStr for Commitment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| Error::CommitmentBadHex)?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| Error::CommitmentBadLen)?;

        Ok(Commitment(bytes))
    }
}

impl std::fmt::Display for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Commitment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        std::str::FromStr::from_str(&s).map_err(de::Error::custom)
    }
}

impl Serialize for Commitment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_preimage_verifies() {
        let commitment = Commitment::new("1", b"secret00");

        commitment.verify("1", b"secret00").unwrap();
        assert_eq!(commitment, Commitment::new("1", b"secret00"));
    }

    #[test]
    fn near_miss_preimages_are_rejected() {
        let commitment = Commitment::new("1", b"secret00");

        // Wrong choice, wrong nonce
        assert!(commitment.verify("2", b"secret00").is_err());
        assert!(commitment.verify("1", b"secret01").is_err());

        // Swapped choice and nonce
        assert!(commitment.verify("secret00", b"1").is_err());

        // Empty nonce is a distinct preimage, not a wildcard
        assert!(commitment.verify("1", b"").is_err());
        assert!(Commitment::new("1", b"").verify("1", b"").is_ok());
    }

    #[test]
    fn concatenation_is_unambiguous() {
        // Both pairs concatenate to the bytes "123"
        assert_ne!(Commitment::new("12", b"3"), Commitment::new("1", b"23"));
        assert_ne!(Commitment::new("", b"123"), Commitment::new("123", b""));
    }

    #[test]
    fn hex_round_trip() {
        let commitment = Commitment::new("2", b"secret10");

        let stringed = commitment.to_string();
        assert_eq!(stringed.len(), 64);

        let from_string = Commitment::from_str(&stringed).unwrap();
        assert_eq!(commitment, from_string);

        // Truncated hash
        assert!(Commitment::from_str(&stringed[..62]).is_err());
        assert!(Commitment::from_str("zz").is_err());
    }
}
