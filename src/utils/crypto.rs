//! Identity and digest primitives.
//!
//! - Addresses (20-byte account identities)
//! - Hashes (SHA256)
//! - Operation fingerprints derived from call parameters
//!
//! Addresses and fingerprints serialize as hex strings so they can key JSON maps.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{Error, Result};
use crate::utils::constants::{ADDRESS_LENGTH, HASH_LENGTH};

fn decode_fixed<const N: usize>(s: &str, name: &str) -> Result<[u8; N]> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).map_err(|e| Error::InvalidConfiguration(format!("{}: {}", name, e)))?;
    if bytes.len() != N {
        return Err(Error::InvalidConfiguration(format!(
            "{}: expected {} bytes, got {}",
            name,
            N,
            bytes.len()
        )));
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

macro_rules! hex_serde {
    ($ty:ident, $len:expr, $name:literal) => {
        impl Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&hex::encode(self.0))
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                decode_fixed::<$len>(&s, $name)
                    .map($ty)
                    .map_err(serde::de::Error::custom)
            }
        }
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// HASH
// ═══════════════════════════════════════════════════════════════════════════════

/// A 32-byte SHA256 digest
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash([u8; HASH_LENGTH]);

hex_serde!(Hash, HASH_LENGTH, "hash");

impl Hash {
    /// Create a new hash from bytes
    pub fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Compute SHA256 hash of data
    pub fn sha256(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        let mut bytes = [0u8; HASH_LENGTH];
        bytes.copy_from_slice(&result);
        Self(bytes)
    }

    /// Get the hash as bytes
    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create from hex string (optional `0x` prefix)
    pub fn from_hex(s: &str) -> Result<Self> {
        decode_fixed::<HASH_LENGTH>(s, "hash").map(Self)
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A 20-byte account identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

hex_serde!(Address, ADDRESS_LENGTH, "address");

impl Address {
    /// The zero address, never a valid role holder
    pub const ZERO: Self = Self([0u8; ADDRESS_LENGTH]);

    /// Create from raw bytes
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Derive a stable address from a human label (last 20 bytes of its SHA256)
    pub fn from_label(label: &str) -> Self {
        let digest = Hash::sha256(label.as_bytes());
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest.as_bytes()[HASH_LENGTH - ADDRESS_LENGTH..]);
        Self(bytes)
    }

    /// Parse from hex string (optional `0x` prefix)
    pub fn from_hex(s: &str) -> Result<Self> {
        decode_fixed::<ADDRESS_LENGTH>(s, "address").map(Self)
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", &self.to_hex()[..8])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OPERATION ID
// ═══════════════════════════════════════════════════════════════════════════════

/// Fingerprint keying an approval record or a withdrawal request
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId([u8; HASH_LENGTH]);

hex_serde!(OperationId, HASH_LENGTH, "operation id");

impl OperationId {
    /// Create from bytes
    pub fn from_bytes(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Start a fingerprint for the given operation tag
    pub fn builder(tag: &str) -> FingerprintBuilder {
        FingerprintBuilder::new(tag)
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string (optional `0x` prefix)
    pub fn from_hex(s: &str) -> Result<Self> {
        decode_fixed::<HASH_LENGTH>(s, "operation id").map(Self)
    }
}

impl fmt::Debug for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OperationId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Length-prefixed encoder so distinct parameter lists never collide
#[derive(Debug, Clone)]
pub struct FingerprintBuilder {
    data: Vec<u8>,
}

impl FingerprintBuilder {
    fn new(tag: &str) -> Self {
        let mut builder = Self { data: Vec::with_capacity(128) };
        builder.push_bytes(tag.as_bytes());
        builder
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        self.data.extend_from_slice(bytes);
    }

    /// Append an address
    pub fn address(mut self, address: &Address) -> Self {
        self.push_bytes(address.as_bytes());
        self
    }

    /// Append an integer
    pub fn u64(mut self, value: u64) -> Self {
        self.push_bytes(&value.to_be_bytes());
        self
    }

    /// Append a UTF-8 string
    pub fn text(mut self, value: &str) -> Self {
        self.push_bytes(value.as_bytes());
        self
    }

    /// Finish into an operation id
    pub fn finish(self) -> OperationId {
        OperationId(*Hash::sha256(&self.data).as_bytes())
    }
}
