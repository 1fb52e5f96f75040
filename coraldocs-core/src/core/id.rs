//! Time-sortable node identifiers and workspace identifiers.
//!
//! A [`NodeId`] packs a millisecond timestamp, a collision-avoidance
//! counter, and a format version into 64 bits:
//!
//! - bit 63: sign (always 0, keeps the value positive as i64)
//! - bits 62–20: milliseconds since 2024-01-01 UTC (43 bits, ~278 years)
//! - bits 19–4: counter/random (16 bits, 65536 values per millisecond)
//! - bits 3–0: format version (4 bits)
//!
//! Ids render as 11 characters of a base64 alphabet chosen in ASCII order,
//! so the string encoding sorts the same way as the numeric value — and
//! therefore by creation time.

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::core::error::CoreError;

/// Milliseconds between the Unix epoch and 2024-01-01T00:00:00Z.
const EPOCH_MS: i64 = 1_704_067_200_000;

/// Current id layout version, stored in the low 4 bits.
const ID_VERSION: u64 = 1;

/// Fixed length of encoded ids: 64 bits / 6 bits per char, rounded up.
const ENCODED_LEN: usize = 11;

/// Base64 alphabet in ASCII order so encoded ids sort lexicographically.
const ALPHABET: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

fn decode_char(c: u8) -> Option<u64> {
    ALPHABET.iter().position(|&a| a == c).map(|i| i as u64)
}

/// A 64-bit time-sortable node identifier.
///
/// [`NodeId::ZERO`] is never assigned to a node; it marks "top level" when
/// used as a parent reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

static GENERATOR: Mutex<(i64, u16)> = Mutex::new((0, 0));

impl NodeId {
    /// The zero id, denoting "top level" in parent position.
    pub const ZERO: NodeId = NodeId(0);

    /// Returns true for [`NodeId::ZERO`].
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Generates a fresh id. Ids are monotonically increasing within a
    /// process: within one millisecond the 16 counter bits increment from
    /// a random starting point.
    #[must_use]
    pub fn generate() -> NodeId {
        let mut ms = chrono::Utc::now().timestamp_millis() - EPOCH_MS;
        if ms < 0 {
            ms = 0;
        }

        // Lock poisoning only happens if a panic occurred mid-update;
        // the stored pair is still usable.
        let mut state = GENERATOR
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let (last_ms, counter) = *state;
        let bits = if ms == last_ms {
            counter.wrapping_add(1)
        } else {
            rand::rng().random::<u16>()
        };
        *state = (ms, bits);

        let value = (((ms as u64) & ((1 << 43) - 1)) << 20) | ((bits as u64) << 4) | ID_VERSION;
        NodeId(value)
    }

    /// Constructs an id from its raw value. Intended for tests and
    /// sidecar deserialization round-trips.
    #[must_use]
    pub fn from_raw(value: u64) -> NodeId {
        NodeId(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Widen to 66 bits so each of the 11 output chars covers a whole
        // 6-bit group, most-significant first.
        let wide = (self.0 as u128) << 2;
        let mut out = [0u8; ENCODED_LEN];
        for (i, slot) in out.iter_mut().enumerate() {
            let shift = 66 - 6 * (i + 1);
            *slot = ALPHABET[((wide >> shift) & 0x3F) as usize];
        }
        // The alphabet is ASCII by construction.
        f.write_str(std::str::from_utf8(&out).map_err(|_| fmt::Error)?)
    }
}

impl FromStr for NodeId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ENCODED_LEN {
            return Err(CoreError::Validation(format!("invalid node id: {s:?}")));
        }
        let mut wide: u128 = 0;
        for c in s.bytes() {
            let v = decode_char(c)
                .ok_or_else(|| CoreError::Validation(format!("invalid node id: {s:?}")))?;
            wide = (wide << 6) | v as u128;
        }
        // Encoding left-shifted by 2, so the low 2 bits must be zero and
        // the value must fit in 63 bits (sign bit clear).
        if wide & 0b11 != 0 || (wide >> 2) > (i64::MAX as u128) {
            return Err(CoreError::Validation(format!("invalid node id: {s:?}")));
        }
        Ok(NodeId((wide >> 2) as u64))
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Identifies a workspace: the isolation boundary owning one repository
/// and one node namespace. Doubles as the repository directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(Uuid);

impl WorkspaceId {
    /// Allocates a fresh random workspace id.
    #[must_use]
    pub fn new() -> WorkspaceId {
        WorkspaceId(Uuid::new_v4())
    }

    /// Parses a workspace id from its canonical string form.
    pub fn parse(s: &str) -> crate::Result<WorkspaceId> {
        Uuid::parse_str(s)
            .map(WorkspaceId)
            .map_err(|_| CoreError::Validation(format!("invalid workspace id: {s:?}")))
    }
}

impl Default for WorkspaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
