// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Outbound framing and inbound dispatch-by-opcode, binding the wire
//! codec in `kad-protocol` to a raw datagram (spec.md §4.1, §4.8).
//!
//! Only the three response opcodes the core ever acts on are decoded
//! further; everything else (and anything that fails to parse) is a
//! silent drop (spec.md §7).

use crate::socket_pool::{InboundDatagram, OutboundDatagram};
use kad_protocol::Id;
use kad_protocol::message::{FindNodeResponse, HelloResponse, SearchResponse};
use kad_protocol::opcode::{KADEMLIA2_HELLO_RES, KADEMLIA2_RES, KADEMLIA2_SEARCH_RES};
use kad_protocol::packet::{decode_inbound, encode_plaintext};
use std::net::{Ipv4Addr, SocketAddr};
use tracing::trace;

/// One of the three response shapes the event loop reacts to.
pub enum InboundEvent {
    Hello { ip: u32, resp: HelloResponse },
    FindNode { ip: u32, resp: FindNodeResponse },
    Search { ip: u32, resp: SearchResponse },
}

/// Decrypts/decompresses a raw datagram and decodes it into a typed
/// event, or `None` if it isn't one of the three accepted response
/// opcodes or fails to parse at any layer. Every failure is logged at
/// trace level and otherwise swallowed (spec.md §7: malformed datagrams
/// are a silent drop).
pub fn process_inbound(
    datagram: &InboundDatagram,
    local_id: &Id,
    local_udp_key: u32,
) -> Option<InboundEvent> {
    let decoded = match decode_inbound(&datagram.data, local_id, local_udp_key, datagram.remote_ip)
    {
        Ok(decoded) => decoded,
        Err(err) => {
            trace!(ip = datagram.remote_ip, %err, "dropping undecodable datagram");
            return None
        }
    };

    let ip = datagram.remote_ip;
    match decoded.opcode {
        KADEMLIA2_HELLO_RES => match HelloResponse::decode(&decoded.body) {
            Ok(resp) => Some(InboundEvent::Hello { ip, resp }),
            Err(err) => {
                trace!(ip, %err, "dropping malformed hello-response");
                None
            }
        },
        KADEMLIA2_RES => match FindNodeResponse::decode(&decoded.body) {
            Ok(resp) => Some(InboundEvent::FindNode { ip, resp }),
            Err(err) => {
                trace!(ip, %err, "dropping malformed find-node-response");
                None
            }
        },
        KADEMLIA2_SEARCH_RES => match SearchResponse::decode(&decoded.body) {
            Ok(resp) => Some(InboundEvent::Search { ip, resp }),
            Err(err) => {
                trace!(ip, %err, "dropping malformed search-response");
                None
            }
        },
        other => {
            trace!(ip, opcode = other, "dropping unrecognised or non-response opcode");
            None
        }
    }
}

fn dest(ip: u32, port: u16) -> SocketAddr {
    SocketAddr::from((Ipv4Addr::from(ip), port))
}

/// Frames a hello-request toward `(ip, port)`. The core never exercises
/// the obfuscated-send path at runtime (spec.md §9), so every outbound
/// datagram is plaintext.
pub fn frame_hello_request(ip: u32, port: u16, body: &[u8]) -> OutboundDatagram {
    OutboundDatagram {
        data: encode_plaintext(kad_protocol::opcode::KADEMLIA2_HELLO_REQ, body),
        dest: dest(ip, port),
    }
}

pub fn frame_find_node_request(ip: u32, port: u16, body: &[u8]) -> OutboundDatagram {
    OutboundDatagram {
        data: encode_plaintext(kad_protocol::opcode::KADEMLIA2_REQ, body),
        dest: dest(ip, port),
    }
}

pub fn frame_search_key_request(ip: u32, port: u16, body: &[u8]) -> OutboundDatagram {
    OutboundDatagram {
        data: encode_plaintext(kad_protocol::opcode::KADEMLIA2_SEARCH_KEY_REQ, body),
        dest: dest(ip, port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kad_protocol::message::encode_hello_request;

    #[test]
    fn recognised_opcode_round_trips_to_an_inbound_event() {
        let local_id = Id::from_bytes([0u8; 16]);
        let body = encode_hello_request(&local_id, 4662, 3);
        let datagram = InboundDatagram {
            data: encode_plaintext(KADEMLIA2_HELLO_RES, &body),
            remote_ip: 0x0A00_0001,
            remote_port: 4662,
        };
        let event = process_inbound(&datagram, &local_id, 0).unwrap();
        assert!(matches!(event, InboundEvent::Hello { .. }));
    }

    #[test]
    fn unrecognised_opcode_is_dropped() {
        let local_id = Id::from_bytes([0u8; 16]);
        let datagram = InboundDatagram {
            data: encode_plaintext(0x99, b"ignored"),
            remote_ip: 1,
            remote_port: 4662,
        };
        assert!(process_inbound(&datagram, &local_id, 0).is_none());
    }

    #[test]
    fn frame_helpers_wrap_plaintext_header_and_opcode() {
        let datagram = frame_find_node_request(0x0A000001, 4662, b"target");
        assert_eq!(datagram.data[0], kad_protocol::opcode::OP_KADEMLIA_HEADER);
        assert_eq!(datagram.data[1], kad_protocol::opcode::KADEMLIA2_REQ);
    }
}
