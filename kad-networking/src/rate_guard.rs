// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Per-peer, per-opcode outbound rate limiting (spec.md §4.6).

use std::collections::HashMap;

const WINDOW_SECS: u64 = 60;

/// The three opcode families the guard tracks; these are the only ones
/// this crate ever originates (find-value lookups reuse `FindNodeReq`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GuardOpcode {
    HelloReq,
    FindNodeReq,
    SearchKeyReq,
}

impl GuardOpcode {
    fn limit(self) -> usize {
        match self {
            GuardOpcode::HelloReq => 3,
            GuardOpcode::FindNodeReq => 10,
            GuardOpcode::SearchKeyReq => 3,
        }
    }
}

#[derive(Default)]
struct Window {
    sends: Vec<u64>,
}

impl Window {
    fn prune(&mut self, now: u64) {
        self.sends.retain(|&t| now.saturating_sub(t) < WINDOW_SECS);
    }
}

/// Sliding 60-second send-count limiter keyed by `(remote_ip, opcode)`.
#[derive(Default)]
pub struct PacketRequestGuard {
    windows: HashMap<(u32, GuardOpcode), Window>,
}

impl PacketRequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-destructively checks whether one more send would still be
    /// within the limit, without recording anything.
    pub fn can_pass(&mut self, ip: u32, opcode: GuardOpcode, now: u64) -> bool {
        let Some(window) = self.windows.get_mut(&(ip, opcode)) else {
            return true;
        };
        window.prune(now);
        window.sends.len() < opcode.limit()
    }

    /// Records an outbound send if it would not exceed the limit. Returns
    /// `false` (and records nothing) when the limit is already hit.
    pub fn add(&mut self, ip: u32, opcode: GuardOpcode, now: u64) -> bool {
        let window = self.windows.entry((ip, opcode)).or_default();
        window.prune(now);
        if window.sends.len() >= opcode.limit() {
            return false;
        }
        window.sends.push(now);
        true
    }

    /// Periodic reclamation: drops any `(ip, opcode)` entry whose most
    /// recent send is more than 60 seconds old.
    pub fn tick(&mut self, now: u64) {
        self.windows.retain(|_, window| {
            window.prune(now);
            !window.sends.is_empty()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_limit_then_rejects() {
        let mut guard = PacketRequestGuard::new();
        for _ in 0..3 {
            assert!(guard.add(1, GuardOpcode::HelloReq, 0));
        }
        assert!(!guard.add(1, GuardOpcode::HelloReq, 5));
        assert!(!guard.can_pass(1, GuardOpcode::HelloReq, 5));
    }

    #[test]
    fn window_rolls_off_after_sixty_seconds() {
        let mut guard = PacketRequestGuard::new();
        for t in 0..3 {
            assert!(guard.add(1, GuardOpcode::HelloReq, t));
        }
        assert!(!guard.add(1, GuardOpcode::HelloReq, 10));
        assert!(guard.add(1, GuardOpcode::HelloReq, 70));
    }

    #[test]
    fn tick_reclaims_idle_entries() {
        let mut guard = PacketRequestGuard::new();
        guard.add(5, GuardOpcode::SearchKeyReq, 0);
        assert_eq!(guard.windows.len(), 1);
        guard.tick(61);
        assert!(guard.windows.is_empty());
    }

    #[test]
    fn opcodes_are_tracked_independently() {
        let mut guard = PacketRequestGuard::new();
        for _ in 0..10 {
            assert!(guard.add(1, GuardOpcode::FindNodeReq, 0));
        }
        assert!(!guard.add(1, GuardOpcode::FindNodeReq, 0));
        assert!(guard.add(1, GuardOpcode::SearchKeyReq, 0));
    }
}
