// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Per-search state machine and the manager that coalesces duplicate
//! searches for the same target (spec.md §4.4).
//!
//! Per-user file classification and conversion to `Ed2kFileLink` live one
//! layer up in `kad-node`; this module only deduplicates raw file records
//! and fans them out to whichever sink (primary or shadow) asked for
//! them, so it never needs to know about the external `SearchReq` shape.

use crate::dispatch::decide_opcode;
use crate::rate_guard::GuardOpcode;
use kad_protocol::Id;
use kad_protocol::message::{PeerEntry, SearchFileEntry};
use std::collections::HashSet;
use std::sync::Arc;

pub type SearchId = u64;

const SEARCH_LIFETIME_SECS: u64 = 5;

/// An event delivered to a search's result sink.
#[derive(Clone, Debug)]
pub enum SearchEvent {
    File(SearchFileEntry),
    TimedOut,
}

/// The caller-supplied channel a search's results are written to.
/// Implementations MUST tolerate being called after the user-visible
/// stream has been closed (spec.md §5): return `false` rather than panic.
pub trait ResultSink: Send + Sync {
    fn deliver(&self, event: SearchEvent) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    Init,
    Dispatched,
    Receiving,
    Expired,
}

pub struct Search {
    pub seq: SearchId,
    pub keyword: String,
    pub sink: Arc<dyn ResultSink>,
    pub contacted: HashSet<u32>,
    pub created: u64,
    pub expires: u64,
    pub state: SearchState,
}

impl Search {
    fn new(seq: SearchId, keyword: String, sink: Arc<dyn ResultSink>, now: u64) -> Self {
        Self {
            seq,
            keyword,
            sink,
            contacted: HashSet::new(),
            created: now,
            expires: now + SEARCH_LIFETIME_SECS,
            state: SearchState::Init,
        }
    }
}

/// One target hash's coalescing group: a primary search that actually
/// dispatches network traffic, plus zero or more shadows attached purely
/// for result fan-out (spec.md §4.4).
pub struct SearchGroup {
    pub target: Id,
    pub primary: Search,
    pub shadows: Vec<Search>,
    seen_hashes: HashSet<[u8; 16]>,
    files: Vec<SearchFileEntry>,
    group_expires: u64,
}

impl SearchGroup {
    fn all_searches_mut(&mut self) -> impl Iterator<Item = &mut Search> {
        std::iter::once(&mut self.primary).chain(self.shadows.iter_mut())
    }
}

pub struct CreateOutcome {
    pub seq: SearchId,
    pub is_primary: bool,
    /// Files already collected by the primary, to be converted and
    /// written to a brand-new shadow's sink immediately (spec.md §4.4).
    pub existing_files: Vec<SearchFileEntry>,
}

#[derive(Default)]
pub struct SearchManager {
    groups: std::collections::HashMap<[u8; 16], SearchGroup>,
    next_seq: SearchId,
}

impl SearchManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_seq(&mut self) -> SearchId {
        self.next_seq += 1;
        self.next_seq
    }

    /// Creates a new search, or attaches it as a shadow if an identical
    /// target is already live.
    pub fn create(
        &mut self,
        keyword: String,
        target: Id,
        sink: Arc<dyn ResultSink>,
        now: u64,
    ) -> CreateOutcome {
        let seq = self.alloc_seq();
        let key = *target.as_bytes();
        if let Some(group) = self.groups.get_mut(&key) {
            let shadow = Search::new(seq, keyword, sink, now);
            group.group_expires = group.group_expires.max(shadow.expires);
            group.shadows.push(shadow);
            return CreateOutcome {
                seq,
                is_primary: false,
                existing_files: group.files.clone(),
            };
        }
        let primary = Search::new(seq, keyword, sink, now);
        let group = SearchGroup {
            target,
            group_expires: primary.expires,
            primary,
            shadows: Vec::new(),
            seen_hashes: HashSet::new(),
            files: Vec::new(),
        };
        self.groups.insert(key, group);
        CreateOutcome {
            seq,
            is_primary: true,
            existing_files: Vec::new(),
        }
    }

    /// Marks the given candidates as contacted by the primary search and
    /// returns only the ones not already probed (spec.md §8 invariant 1).
    pub fn dispatch_targets(
        &mut self,
        target: &Id,
        candidates: Vec<(u32, GuardOpcode)>,
    ) -> Vec<(u32, GuardOpcode)> {
        let Some(group) = self.groups.get_mut(target.as_bytes()) else {
            return Vec::new();
        };
        group.primary.state = SearchState::Dispatched;
        candidates
            .into_iter()
            .filter(|(ip, _)| group.primary.contacted.insert(*ip))
            .collect()
    }

    /// Handles an inbound find-node-response. Returns `Some(new
    /// candidates to dispatch)` when its target matches a live search
    /// (recursing into the result), or `None` when it matches no active
    /// search (the caller should instead feed the peers to the contact
    /// manager as fresh announcements).
    pub fn handle_find_node_response(
        &mut self,
        resp_target: &Id,
        peers: &[PeerEntry],
    ) -> Option<Vec<(u32, GuardOpcode)>> {
        let group = self.groups.get_mut(resp_target.as_bytes())?;
        group.primary.state = SearchState::Receiving;
        let mut out = Vec::new();
        for peer in peers {
            if !group.primary.contacted.insert(peer.ip) {
                continue;
            }
            let opcode = decide_opcode(resp_target, &peer.id);
            out.push((peer.ip, opcode));
        }
        Some(out)
    }

    /// Handles an inbound search-response: dedups against the primary's
    /// seen-hash set, applies `yellow_filter` (return `true` to reject),
    /// records survivors, and delivers them to the primary and every
    /// shadow's sink. Returns the files newly accepted this call.
    pub fn handle_search_response(
        &mut self,
        resp_target: &Id,
        files: Vec<SearchFileEntry>,
        yellow_filter: impl Fn(&str) -> bool,
    ) -> Vec<SearchFileEntry> {
        let Some(group) = self.groups.get_mut(resp_target.as_bytes()) else {
            return Vec::new(); // expired or unknown search: silent no-op (spec.md §5, §8 S2)
        };
        group.primary.state = SearchState::Receiving;

        let mut accepted = Vec::new();
        for file in files {
            if group.seen_hashes.contains(&file.hash) {
                continue;
            }
            if yellow_filter(&file.name) {
                continue;
            }
            group.seen_hashes.insert(file.hash);
            group.files.push(file.clone());
            accepted.push(file);
        }

        for file in &accepted {
            for search in group.all_searches_mut() {
                let _delivered = search.sink.deliver(SearchEvent::File(file.clone()));
            }
        }
        accepted
    }

    /// Removes every group whose last-in-group search has expired,
    /// surfacing a timeout event to any sink that never saw a match.
    pub fn tick(&mut self, now: u64) {
        let expired: Vec<[u8; 16]> = self
            .groups
            .iter()
            .filter(|(_, g)| g.group_expires <= now)
            .map(|(k, _)| *k)
            .collect();
        for key in expired {
            if let Some(mut group) = self.groups.remove(&key) {
                if group.files.is_empty() {
                    for search in group.all_searches_mut() {
                        search.state = SearchState::Expired;
                        let _delivered = search.sink.deliver(SearchEvent::TimedOut);
                    }
                }
            }
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn has_target(&self, target: &Id) -> bool {
        self.groups.contains_key(target.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CollectingSink(Mutex<Vec<SearchEvent>>);

    impl CollectingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(Vec::new())))
        }
        fn events(&self) -> Vec<SearchEvent> {
            self.0.lock().expect("sink mutex poisoned").clone()
        }
    }

    impl ResultSink for CollectingSink {
        fn deliver(&self, event: SearchEvent) -> bool {
            self.0.lock().expect("sink mutex poisoned").push(event);
            true
        }
    }

    fn file(hash_byte: u8, name: &str) -> SearchFileEntry {
        SearchFileEntry {
            hash: [hash_byte; 16],
            name: name.to_string(),
            size: 100,
            type_tag: "Video".to_string(),
            sources: 1,
            media_length: 0,
        }
    }

    #[test]
    fn second_search_for_same_target_attaches_as_shadow() {
        let mut mgr = SearchManager::new();
        let target = Id::from_bytes([1; 16]);
        let sink1 = CollectingSink::new();
        let sink2 = CollectingSink::new();
        let out1 = mgr.create("matrix".into(), target, sink1, 0);
        let out2 = mgr.create("matrix".into(), target, sink2, 0);
        assert!(out1.is_primary);
        assert!(!out2.is_primary);
        assert_eq!(mgr.group_count(), 1);
    }

    #[test]
    fn each_peer_is_dispatched_at_most_once() {
        let mut mgr = SearchManager::new();
        let target = Id::from_bytes([1; 16]);
        let sink = CollectingSink::new();
        mgr.create("matrix".into(), target, sink, 0);
        let first = mgr.dispatch_targets(&target, vec![(1, GuardOpcode::FindNodeReq)]);
        assert_eq!(first.len(), 1);
        let second = mgr.dispatch_targets(&target, vec![(1, GuardOpcode::FindNodeReq)]);
        assert!(second.is_empty());
    }

    #[test]
    fn file_hash_surfaces_at_most_once() {
        let mut mgr = SearchManager::new();
        let target = Id::from_bytes([1; 16]);
        let sink = CollectingSink::new();
        mgr.create("matrix".into(), target, sink.clone(), 0);
        let accepted = mgr.handle_search_response(&target, vec![file(9, "a.mkv")], |_| false);
        assert_eq!(accepted.len(), 1);
        let accepted_again =
            mgr.handle_search_response(&target, vec![file(9, "a.mkv")], |_| false);
        assert!(accepted_again.is_empty());
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn yellow_filter_rejects_before_dedup_set() {
        let mut mgr = SearchManager::new();
        let target = Id::from_bytes([1; 16]);
        let sink = CollectingSink::new();
        mgr.create("matrix".into(), target, sink.clone(), 0);
        let accepted =
            mgr.handle_search_response(&target, vec![file(9, "sex.mkv")], |n| n.contains("sex"));
        assert!(accepted.is_empty());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn shadow_receives_already_collected_files_and_future_updates() {
        let mut mgr = SearchManager::new();
        let target = Id::from_bytes([1; 16]);
        let primary_sink = CollectingSink::new();
        mgr.create("matrix".into(), target, primary_sink, 0);
        mgr.handle_search_response(&target, vec![file(1, "a.mkv")], |_| false);

        let shadow_sink = CollectingSink::new();
        let out = mgr.create("matrix".into(), target, shadow_sink.clone(), 0);
        assert_eq!(out.existing_files.len(), 1);

        mgr.handle_search_response(&target, vec![file(2, "b.mkv")], |_| false);
        assert_eq!(shadow_sink.events().len(), 1); // only the post-attach file, delivered live
    }

    #[test]
    fn expiry_removes_group_and_late_response_is_a_no_op() {
        let mut mgr = SearchManager::new();
        let target = Id::from_bytes([1; 16]);
        let sink = CollectingSink::new();
        mgr.create("matrix".into(), target, sink.clone(), 0);
        mgr.tick(6); // created=0, expires=5
        assert_eq!(mgr.group_count(), 0);
        assert!(matches!(sink.events()[0], SearchEvent::TimedOut));

        let accepted = mgr.handle_search_response(&target, vec![file(1, "a.mkv")], |_| false);
        assert!(accepted.is_empty());
    }

    #[test]
    fn find_node_response_recurses_for_matching_target_only() {
        let mut mgr = SearchManager::new();
        let target = Id::from_bytes([1; 16]);
        let sink = CollectingSink::new();
        mgr.create("matrix".into(), target, sink, 0);
        let peers = vec![PeerEntry {
            id: Id::from_bytes([2; 16]),
            ip: 42,
            udp_port: 4662,
            tcp_port: 4672,
            version: 3,
        }];
        let matched = mgr.handle_find_node_response(&target, &peers);
        assert!(matched.is_some());
        let unrelated_target = Id::from_bytes([0xFF; 16]);
        let unmatched = mgr.handle_find_node_response(&unrelated_target, &peers);
        assert!(unmatched.is_none());
    }
}
