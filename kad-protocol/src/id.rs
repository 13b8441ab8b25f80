// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! 128-bit KAD identifiers and the XOR distance metric between them.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit KAD node or keyword-target identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Id {
    hash: [u8; 16],
}

impl Id {
    pub const LEN: usize = 16;

    pub fn from_bytes(hash: [u8; 16]) -> Self {
        Self { hash }
    }

    /// Generates a random identifier, the way `kad_id.go`'s `generate()` builds one
    /// from two independent 64-bit random halves rather than 16 random bytes at once.
    pub fn generate(rng: &mut impl RngCore) -> Self {
        let mut hash = [0u8; 16];
        rng.fill_bytes(&mut hash[0..8]);
        rng.fill_bytes(&mut hash[8..16]);
        Self { hash }
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.hash
    }

    pub fn xor(&self, other: &Id) -> Id {
        let mut out = [0u8; 16];
        for i in 0..16 {
            out[i] = self.hash[i] ^ other.hash[i];
        }
        Id { hash: out }
    }

    /// Returns the little-endian `u32` at 32-bit chunk index `i` (0..=3), used to
    /// compute search tolerance against a distance value.
    pub fn chunk32(&self, i: usize) -> u32 {
        let b = &self.hash[i * 4..(i + 1) * 4];
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", hex::encode_upper(self.hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn xor_of_identical_ids_is_zero() {
        let mut rng = SmallRng::seed_from_u64(1);
        let id = Id::generate(&mut rng);
        assert_eq!(id.xor(&id).as_bytes(), &[0u8; 16]);
    }

    #[test]
    fn chunk32_reads_little_endian() {
        let mut hash = [0u8; 16];
        hash[0..4].copy_from_slice(&[0x01, 0x00, 0x00, 0x00]);
        let id = Id::from_bytes(hash);
        assert_eq!(id.chunk32(0), 1);
    }
}
