// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Node configuration: CLI surface layered over defaults (SPEC_FULL.md §2.3).

use clap::Parser;
use kad_protocol::Id;
use kad_protocol::opcode::KADEMLIA_VERSION_3_47B;
use std::path::PathBuf;

/// Default UDP port base; 10 consecutive ports starting here are bound.
pub const DEFAULT_UDP_PORT_BASE: u16 = 2000;
pub const DEFAULT_SOCKET_COUNT: usize = 10;

#[derive(Parser, Clone, Debug)]
#[command(name = "kadnode", about = "KAD overlay search node")]
pub struct Cli {
    /// Directory holding `kad/nodes.dat` and the persisted local KAD id.
    #[arg(long, default_value = "config")]
    pub config_dir: PathBuf,

    /// First of the consecutive UDP ports to bind.
    #[arg(long, default_value_t = DEFAULT_UDP_PORT_BASE)]
    pub udp_port_base: u16,

    /// Number of UDP sockets in the send/receive pool.
    #[arg(long, default_value_t = DEFAULT_SOCKET_COUNT)]
    pub socket_count: usize,

    /// Override public IP autodetection (used to evaluate bound UDP keys).
    #[arg(long)]
    pub public_ip: Option<std::net::Ipv4Addr>,

    /// Minimum contact version accepted into the routing table.
    #[arg(long, default_value_t = KADEMLIA_VERSION_3_47B)]
    pub min_contact_version: u8,
}

/// Resolved node configuration the scheduler runs with, the `Prefs`
/// equivalent named in SPEC_FULL.md §2.3.
#[derive(Clone, Debug)]
pub struct NodeConfig {
    pub config_dir: PathBuf,
    pub udp_port_base: u16,
    pub socket_count: usize,
    pub public_ip: Option<std::net::Ipv4Addr>,
    pub min_contact_version: u8,
    pub local_kad_id: Id,
    pub local_udp_key: u32,
}

impl NodeConfig {
    pub fn from_cli(cli: Cli, local_kad_id: Id, local_udp_key: u32) -> Self {
        Self {
            config_dir: cli.config_dir,
            udp_port_base: cli.udp_port_base,
            socket_count: cli.socket_count,
            public_ip: cli.public_ip,
            min_contact_version: cli.min_contact_version,
            local_kad_id,
            local_udp_key,
        }
    }

    pub fn nodes_file_path(&self) -> PathBuf {
        self.config_dir.join("kad").join("nodes.dat")
    }

    pub fn local_id_file_path(&self) -> PathBuf {
        self.config_dir.join("kad").join("local_id.dat")
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("config"),
            udp_port_base: DEFAULT_UDP_PORT_BASE,
            socket_count: DEFAULT_SOCKET_COUNT,
            public_ip: None,
            min_contact_version: KADEMLIA_VERSION_3_47B,
            local_kad_id: Id::from_bytes([0; 16]),
            local_udp_key: 0,
        }
    }
}
