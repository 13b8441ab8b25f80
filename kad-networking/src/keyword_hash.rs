// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Derives the 128-bit DHT target hash for a single keyword (spec.md §4.3).
//!
//! Splitting a free-text search phrase into multiple keywords happens one
//! layer up, at the `kad-node` external boundary (SPEC_FULL.md §3 item 1);
//! this module only normalises and hashes one already-split keyword.

use kad_protocol::crypto::{endian_flip32, md4};
use kad_protocol::Id;

/// Lower-cases the keyword (its only normalisation at this layer) and
/// returns `endian_flip32(MD4(keyword))`, matching the eMule wire
/// convention for keyword target hashes.
pub fn target_hash(keyword: &str) -> Id {
    let lowered = keyword.to_lowercase();
    let digest = md4(lowered.as_bytes());
    Id::from_bytes(endian_flip32(&digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_case_insensitive() {
        assert_eq!(target_hash("Matrix"), target_hash("matrix"));
    }

    #[test]
    fn differs_for_different_keywords() {
        assert_ne!(target_hash("matrix"), target_hash("inception"));
    }
}
