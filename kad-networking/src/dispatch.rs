// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! The find-node-vs-search-key decision shared by the onliner (bootstrap
//! contact seeding) and the search dispatcher (spec.md §4.2, §4.4):
//! compute the XOR distance between the search target and a candidate
//! contact's KAD ID, take the top 32 bits as "tolerance", and send
//! `search-key-req` when that tolerance fits under `2^24`, else
//! `find-node-req`.

use crate::rate_guard::GuardOpcode;
use kad_protocol::Id;

/// Top 32 bits of the XOR distance must be below this for a contact to be
/// considered "close enough" to query directly with search-key-req.
pub const TOLERANCE_THRESHOLD: u32 = 1 << 24;

pub fn tolerance(target: &Id, contact_id: &Id) -> u32 {
    target.xor(contact_id).chunk32(0)
}

pub fn decide_opcode(target: &Id, contact_id: &Id) -> GuardOpcode {
    if tolerance(target, contact_id) > TOLERANCE_THRESHOLD {
        GuardOpcode::FindNodeReq
    } else {
        GuardOpcode::SearchKeyReq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_ids_pick_search_key_req() {
        let id = Id::from_bytes([9u8; 16]);
        assert_eq!(decide_opcode(&id, &id), GuardOpcode::SearchKeyReq);
    }

    #[test]
    fn far_ids_pick_find_node_req() {
        let target = Id::from_bytes([0u8; 16]);
        let mut far = [0u8; 16];
        far[0] = 0xFF;
        let contact = Id::from_bytes(far);
        assert_eq!(decide_opcode(&target, &contact), GuardOpcode::FindNodeReq);
    }
}
