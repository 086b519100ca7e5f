use crate::*;
use ed25519_dalek::Keypair;
use ed25519_dalek::PublicKey;
use ed25519_dalek::SecretKey;
use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::convert::TryInto;
use std::str::FromStr;

/// A stable voter identity - the raw bytes of the voter's ed25519 public key.
///
/// The ballot keys its mappings on this identity; signature checks against
/// the full public key happen in the transaction layer before the ballot is
/// ever touched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoterId([u8; 32]);

impl VoterId {
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn to_array(&self) -> [u8; 32] {
        self.0
    }
}

impl From<&PublicKey> for VoterId {
    fn from(public_key: &PublicKey) -> Self {
        VoterId(public_key.to_bytes())
    }
}

impl From<PublicKey> for VoterId {
    fn from(public_key: PublicKey) -> Self {
        VoterId(public_key.to_bytes())
    }
}

impl FromStr for VoterId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| Error::VoterIdBadHex)?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| Error::VoterIdBadLen)?;

        Ok(VoterId(bytes))
    }
}

impl std::fmt::Display for VoterId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for VoterId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        std::str::FromStr::from_str(&s).map_err(de::Error::custom)
    }
}

impl Serialize for VoterId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub fn generate_keypair() -> (SecretKey, PublicKey) {
    let mut csprng = rand::rngs::OsRng {};
    let Keypair { public, secret } = Keypair::generate(&mut csprng);
    (secret, public)
}

/// Generate a random 32-byte nonce for a vote commitment
pub fn generate_nonce() -> [u8; 32] {
    let mut csprng = rand::rngs::OsRng {};
    csprng.gen()
}
