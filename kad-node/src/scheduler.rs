// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! The single-threaded event loop: inbound datagrams, the 1-second and
//! 60-second ticks, and the external search-request channel all funnel
//! through here (spec.md §4.8). This is the only place the routing
//! table, search map and rate guard are mutated; the socket pool is the
//! only other concurrency in the process (spec.md §5).

use crate::config::NodeConfig;
use crate::external::{Item, SearchReq, SearchRes};
use crate::packet_processor::{
    InboundEvent, frame_find_node_request, frame_hello_request, frame_search_key_request,
    process_inbound,
};
use crate::socket_pool::{InboundDatagram, OutboundDatagram};
use crate::{classify, yellow};
use kad_networking::bootstrap_file::BootstrapEntry;
use kad_networking::contact_manager::{AdmissionOutcome, ContactManager};
use kad_networking::finder::Finder;
use kad_networking::keyword_hash::target_hash;
use kad_networking::liveness::{LivenessEvent, LivenessService};
use kad_networking::onliner::Onliner;
use kad_networking::rate_guard::{GuardOpcode, PacketRequestGuard};
use kad_networking::search::{ResultSink, SearchEvent, SearchManager};
use kad_protocol::Id;
use kad_protocol::message::{encode_find_node_request, encode_hello_request, encode_search_key_request};
use kad_protocol::opcode::KADEMLIA_VERSION;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs()
}

/// Delivers a search's results to the external caller's channel,
/// classifying each raw file against the user's item list before
/// forwarding it (spec.md §4.5, §6). A full channel drops the write
/// rather than blocking the event loop (spec.md §5, §7); a closed
/// channel is tolerated the same way.
struct ExternalSink {
    sender: mpsc::Sender<SearchRes>,
    items: Vec<Item>,
    requested_season: i32,
}

impl ResultSink for ExternalSink {
    fn deliver(&self, event: SearchEvent) -> bool {
        match event {
            SearchEvent::File(file) => {
                let Some(link) = classify::to_file_link(&file, &self.items, self.requested_season)
                else {
                    return true // didn't match any item/season: not an error, just no result
                };
                let res = SearchRes { file_links: vec![link] };
                self.sender.try_send(res).is_ok()
            }
            // The web front-end boundary (out of scope) reads channel closure
            // as completion; timed-out searches with no matches simply stop
            // producing and are dropped here (spec.md §1 boundary note).
            SearchEvent::TimedOut => true,
        }
    }
}

pub struct Scheduler {
    config: NodeConfig,
    contacts: ContactManager,
    liveness: LivenessService,
    onliner: Onliner,
    finder: Finder,
    rate_guard: PacketRequestGuard,
    searches: SearchManager,
    rng: SmallRng,
}

impl Scheduler {
    /// Builds the scheduler and admits every bootstrap entry, each
    /// unverified and immediately due a hello-request (spec.md §4.7).
    pub fn new(config: NodeConfig, bootstrap: Vec<BootstrapEntry>) -> Self {
        let now = now_secs();
        let mut contacts = ContactManager::with_min_version(config.min_contact_version);
        let mut onliner = Onliner::new();
        let mut finder = Finder::new();
        let mut liveness = LivenessService::new(now);
        let mut rng = SmallRng::from_entropy();

        for entry in bootstrap {
            let outcome = contacts.admit_bootstrap(
                entry.kad_id,
                entry.ip,
                entry.udp_port,
                entry.version,
                now,
            );
            if matches!(outcome, AdmissionOutcome::Inserted) {
                onliner.insert(entry.ip, now);
                finder.push(entry.ip);
                let jitter = rng.gen_range(0..10u64);
                liveness.schedule_new(&mut contacts, entry.ip, jitter, now);
            }
        }

        Self {
            config,
            contacts,
            liveness,
            onliner,
            finder,
            rate_guard: PacketRequestGuard::new(),
            searches: SearchManager::new(),
            rng,
        }
    }

    pub async fn run(
        mut self,
        mut inbound_rx: mpsc::Receiver<InboundDatagram>,
        outbound_tx: mpsc::Sender<OutboundDatagram>,
        mut search_req_rx: mpsc::Receiver<SearchReq>,
    ) {
        let mut tick_1s = tokio::time::interval(Duration::from_secs(1));
        let mut tick_60s = tokio::time::interval(Duration::from_secs(60));

        loop {
            tokio::select! {
                maybe_datagram = inbound_rx.recv() => {
                    match maybe_datagram {
                        Some(datagram) => self.handle_inbound(datagram, &outbound_tx).await,
                        None => { warn!("inbound channel closed, stopping"); break }
                    }
                }
                maybe_req = search_req_rx.recv() => {
                    match maybe_req {
                        Some(req) => self.handle_search_request(req, &outbound_tx).await,
                        None => { warn!("search-request channel closed, stopping"); break }
                    }
                }
                _ = tick_1s.tick() => self.handle_one_second_tick(&outbound_tx).await,
                _ = tick_60s.tick() => self.rate_guard.tick(now_secs()),
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                    break
                }
            }
        }
    }

    async fn handle_inbound(&mut self, datagram: InboundDatagram, outbound_tx: &mpsc::Sender<OutboundDatagram>) {
        let now = now_secs();
        let Some(event) =
            process_inbound(&datagram, &self.config.local_kad_id, self.config.local_udp_key)
        else {
            return
        };

        match event {
            InboundEvent::Hello { ip, resp } => {
                let outcome = self.contacts.admit_hello_response(
                    resp.sender_id,
                    ip,
                    resp.sender_udp_port,
                    resp.version,
                    resp.learned_udp_key,
                    now,
                );
                if matches!(outcome, AdmissionOutcome::Inserted) {
                    self.onliner.insert(ip, now);
                    self.finder.push(ip);
                }
                let jitter = self.rng.gen_range(0..10u64);
                self.liveness.refresh(&mut self.contacts, ip, jitter, now);
            }
            InboundEvent::FindNode { ip, resp } => {
                self.contacts.refresh_responder(ip, now);
                if let Some(candidates) = self.searches.handle_find_node_response(&resp.target, &resp.peers) {
                    self.dispatch_candidates(&resp.target, candidates, outbound_tx).await;
                } else {
                    // no active search for this target: recycle the peers as
                    // fresh announcements (spec.md §7's "response for unknown
                    // target" disposition).
                    for peer in &resp.peers {
                        let outcome = self.contacts.admit_find_node_peer(
                            peer.id,
                            peer.ip,
                            peer.udp_port,
                            peer.version,
                            now,
                        );
                        if matches!(outcome, AdmissionOutcome::Inserted) {
                            self.onliner.insert(peer.ip, now);
                            self.finder.push(peer.ip);
                            let jitter = self.rng.gen_range(0..10u64);
                            self.liveness.schedule_new(&mut self.contacts, peer.ip, jitter, now);
                        }
                    }
                }
            }
            InboundEvent::Search { ip, resp } => {
                self.contacts.refresh_responder(ip, now);
                self.searches.handle_search_response(&resp.target, resp.files, yellow::is_yellow);
            }
        }
    }

    async fn handle_search_request(&mut self, req: SearchReq, outbound_tx: &mpsc::Sender<OutboundDatagram>) {
        let now = now_secs();
        let sink: Arc<dyn ResultSink> = Arc::new(ExternalSink {
            sender: req.result_sink,
            items: req.keyword_struct.items.clone(),
            requested_season: req.keyword_struct.user_keyword.season,
        });

        for keyword in &req.keyword_struct.target_keywords {
            let target = target_hash(keyword);
            let outcome = self.searches.create(keyword.clone(), target, sink.clone(), now);

            for file in outcome.existing_files {
                let _delivered = sink.deliver(SearchEvent::File(file));
            }

            if outcome.is_primary {
                let candidates =
                    self.onliner.get_search_contacts(&target, &self.contacts, &mut self.rate_guard, now);
                let to_dispatch = self.searches.dispatch_targets(&target, candidates);
                self.dispatch_candidates(&target, to_dispatch, outbound_tx).await;
            }
        }
    }

    async fn dispatch_candidates(
        &mut self,
        target: &Id,
        candidates: Vec<(u32, GuardOpcode)>,
        outbound_tx: &mpsc::Sender<OutboundDatagram>,
    ) {
        let now = now_secs();
        for (ip, opcode) in candidates {
            if !self.rate_guard.add(ip, opcode, now) {
                continue
            }
            let Some(contact) = self.contacts.get(ip) else { continue };
            let port = contact.udp_port;
            let datagram = match opcode {
                GuardOpcode::FindNodeReq => {
                    let Some(contact_id) = contact.kad_id else { continue };
                    frame_find_node_request(ip, port, &encode_find_node_request(target, &contact_id))
                }
                GuardOpcode::SearchKeyReq => {
                    frame_search_key_request(ip, port, &encode_search_key_request(target))
                }
                GuardOpcode::HelloReq => continue, // never chosen by onliner/dispatch decisions
            };
            let _ = outbound_tx.send(datagram).await;
        }
    }

    async fn handle_one_second_tick(&mut self, outbound_tx: &mpsc::Sender<OutboundDatagram>) {
        let now = now_secs();

        for event in self.liveness.tick(&mut self.contacts, now) {
            match event {
                LivenessEvent::Dead(ip) => {
                    self.onliner.remove(ip);
                    self.finder.remove(ip);
                    debug!(ip, "contact declared dead");
                }
                LivenessEvent::SendHello(ip) => {
                    if let Some(contact) = self.contacts.get(ip) {
                        let body = encode_hello_request(
                            &self.config.local_kad_id,
                            self.config.udp_port_base,
                            KADEMLIA_VERSION,
                        );
                        let datagram = frame_hello_request(ip, contact.udp_port, &body);
                        let _ = outbound_tx.send(datagram).await;
                    }
                }
            }
        }

        self.searches.tick(now);

        let table_full = self.contacts.is_full();
        for ip in self.finder.tick(&self.contacts, table_full) {
            let Some(contact) = self.contacts.get(ip) else { continue };
            let Some(contact_id) = contact.kad_id else { continue };
            let random_target = Id::generate(&mut self.rng);
            let datagram = frame_find_node_request(
                ip,
                contact.udp_port,
                &encode_find_node_request(&random_target, &contact_id),
            );
            let _ = outbound_tx.send(datagram).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use crate::external::{Item, ItemType, MyKeyword, MyKeywordStruct};
    use kad_networking::bootstrap_file::BootstrapEntry;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn bootstrap_contact(ip: u32) -> BootstrapEntry {
        BootstrapEntry {
            kad_id: Id::from_bytes([7u8; 16]),
            ip,
            udp_port: 4662,
            tcp_port: 4672,
            version: 3,
        }
    }

    #[tokio::test]
    async fn a_search_request_dispatches_toward_a_bootstrap_contact() {
        let config = NodeConfig::default();
        let scheduler = Scheduler::new(config, vec![bootstrap_contact(0x0A00_0001)]);

        let (inbound_tx, inbound_rx) = mpsc::channel(8);
        let (outbound_tx, mut outbound_rx) = mpsc::channel(8);
        let (search_tx, search_req_rx) = mpsc::channel(8);
        let (result_tx, _result_rx) = mpsc::channel(8);

        let handle = tokio::spawn(scheduler.run(inbound_rx, outbound_tx, search_req_rx));

        let keyword_struct = MyKeywordStruct {
            target_keywords: vec!["matrix".to_string()],
            user_keyword: MyKeyword {
                original: vec!["matrix".to_string()],
                search_keywords: vec!["matrix".to_string()],
                name_keywords: vec!["matrix".to_string()],
                season: -1,
            },
            items: vec![Item {
                kind: ItemType::Movie,
                org_name: "The Matrix".to_string(),
                ch_name: "黑客帝国".to_string(),
                other_ch_name: String::new(),
            }],
        };
        search_tx
            .send(SearchReq { result_sink: result_tx, keyword_struct })
            .await
            .expect("scheduler is still receiving");

        let sent = tokio::time::timeout(Duration::from_secs(2), outbound_rx.recv())
            .await
            .expect("a dispatch should be sent within the timeout")
            .expect("outbound channel should still be open");
        assert_eq!(sent.dest.ip().to_string(), "10.0.0.1");

        drop(inbound_tx);
        drop(search_tx);
        let _ = tokio::time::timeout(Duration::from_secs(2), handle).await;
    }
}
