// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Parallel UDP datagram endpoints with round-robin send (spec.md §4.8, §5).
//!
//! Each socket owns one receiver task (decrypt happens one layer up, in
//! `packet_processor`; this module only ships raw bytes) and one sender
//! task reading from a per-socket sub-channel. A single dispatch task
//! round-robins outbound datagrams across the sub-channels; a socket
//! drops a send when its sub-channel is full rather than blocking
//! (fire-and-forget UDP semantics).

use crate::error::NodeError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// `bootstrap_search_contact_nbr(10) * find_node_k(11)^2` (spec.md §5).
const CHANNEL_CAPACITY: usize = 10 * 11 * 11;

pub struct InboundDatagram {
    pub data: Vec<u8>,
    pub remote_ip: u32,
    pub remote_port: u16,
}

pub struct OutboundDatagram {
    pub data: Vec<u8>,
    pub dest: SocketAddr,
}

/// Handle to the running pool; outbound datagrams are submitted through
/// [`Self::sender`], inbound ones arrive on the channel passed to
/// [`SocketPool::bind`].
pub struct SocketPool {
    outbound_tx: mpsc::Sender<OutboundDatagram>,
}

impl SocketPool {
    /// Binds `socket_count` consecutive UDP ports starting at `port_base`
    /// and spawns one receive task and one send task per socket, plus a
    /// round-robin dispatcher feeding the send tasks.
    pub async fn bind(
        port_base: u16,
        socket_count: usize,
        inbound_tx: mpsc::Sender<InboundDatagram>,
    ) -> Result<Self, NodeError> {
        let sub_capacity = (CHANNEL_CAPACITY / socket_count.max(1)).max(1);
        let mut sub_senders = Vec::with_capacity(socket_count);

        for i in 0..socket_count {
            let port = port_base + i as u16;
            let socket = UdpSocket::bind(("0.0.0.0", port))
                .await
                .map_err(|source| NodeError::SocketBind { port, source })?;
            let socket = Arc::new(socket);

            let (sub_tx, sub_rx) = mpsc::channel::<OutboundDatagram>(sub_capacity);
            spawn_sender(socket.clone(), sub_rx, port);
            spawn_receiver(socket, inbound_tx.clone(), port);
            sub_senders.push(sub_tx);
        }

        let (outbound_tx, outbound_rx) = mpsc::channel::<OutboundDatagram>(CHANNEL_CAPACITY);
        tokio::spawn(round_robin_dispatch(outbound_rx, sub_senders));

        Ok(Self { outbound_tx })
    }

    pub fn sender(&self) -> mpsc::Sender<OutboundDatagram> {
        self.outbound_tx.clone()
    }
}

fn spawn_sender(
    socket: Arc<UdpSocket>,
    mut sub_rx: mpsc::Receiver<OutboundDatagram>,
    port: u16,
) {
    tokio::spawn(async move {
        while let Some(datagram) = sub_rx.recv().await {
            if let Err(err) = socket.send_to(&datagram.data, datagram.dest).await {
                warn!(port, %err, "udp send failed");
            }
        }
    });
}

fn spawn_receiver(socket: Arc<UdpSocket>, inbound_tx: mpsc::Sender<InboundDatagram>, port: u16) {
    tokio::spawn(async move {
        let mut buf = vec![0u8; 2048];
        loop {
            match socket.recv_from(&mut buf).await {
                Ok((len, SocketAddr::V4(addr))) => {
                    let datagram = InboundDatagram {
                        data: buf[..len].to_vec(),
                        remote_ip: u32::from(*addr.ip()),
                        remote_port: addr.port(),
                    };
                    if inbound_tx.send(datagram).await.is_err() {
                        break; // event loop gone
                    }
                }
                Ok((_, SocketAddr::V6(_))) => {
                    debug!(port, "dropping ipv6 datagram: core is ipv4-only");
                }
                Err(err) => {
                    warn!(port, %err, "udp recv failed, stopping receiver");
                    break;
                }
            }
        }
    });
}

async fn round_robin_dispatch(
    mut outbound_rx: mpsc::Receiver<OutboundDatagram>,
    senders: Vec<mpsc::Sender<OutboundDatagram>>,
) {
    let mut next = 0usize;
    while let Some(datagram) = outbound_rx.recv().await {
        let sender = &senders[next % senders.len()];
        if sender.try_send(datagram).is_err() {
            debug!("socket send sub-channel full, dropping datagram");
        }
        next = next.wrapping_add(1);
    }
}
