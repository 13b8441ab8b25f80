// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

#[macro_use]
extern crate tracing;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use kad_networking::bootstrap_file;
use kad_node::config::{Cli, NodeConfig};
use kad_node::error::NodeError;
use kad_node::scheduler::Scheduler;
use kad_node::socket_pool::SocketPool;
use kad_node::{external, logging};
use kad_protocol::Id;
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::path::Path;
use tokio::sync::mpsc;

/// Loads the persisted local KAD id and UDP key (16 + 4 bytes), or
/// generates and persists a fresh pair on first run.
fn load_or_create_identity(path: &Path) -> std::io::Result<(Id, u32)> {
    if let Ok(bytes) = std::fs::read(path) {
        if bytes.len() == 20 {
            let mut hash = [0u8; 16];
            hash.copy_from_slice(&bytes[0..16]);
            let udp_key = u32::from_le_bytes(bytes[16..20].try_into().expect("4 bytes"));
            return Ok((Id::from_bytes(hash), udp_key));
        }
    }

    let mut rng = SmallRng::from_entropy();
    let id = Id::generate(&mut rng);
    let udp_key = rng.next_u32();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut bytes = Vec::with_capacity(20);
    bytes.extend_from_slice(id.as_bytes());
    bytes.extend_from_slice(&udp_key.to_le_bytes());
    std::fs::write(path, &bytes)?;

    Ok((id, udp_key))
}

fn load_bootstrap(config: &NodeConfig) -> Result<Vec<bootstrap_file::BootstrapEntry>, NodeError> {
    let path = config.nodes_file_path();
    let buf = std::fs::read(&path).map_err(|source| NodeError::BootstrapFileUnreadable {
        path: path.display().to_string(),
        source,
    })?;
    Ok(bootstrap_file::parse(&buf)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let _log_guard = logging::init(&cli.config_dir)
        .map_err(|err| eyre!("failed to initialise logging: {err}"))?;

    let (local_kad_id, local_udp_key) =
        load_or_create_identity(&cli.config_dir.join("kad").join("local_id.dat"))
            .map_err(|err| eyre!("failed to load or create local identity: {err}"))?;
    let config = NodeConfig::from_cli(cli, local_kad_id, local_udp_key);

    // A node with no bootstrap contacts can never join the overlay; both an
    // unreadable file and an empty one are fatal startup errors.
    let bootstrap = load_bootstrap(&config)?;
    info!(count = bootstrap.len(), "loaded bootstrap contacts");

    let (inbound_tx, inbound_rx) = mpsc::channel(1024);
    let pool = SocketPool::bind(config.udp_port_base, config.socket_count, inbound_tx)
        .await
        .map_err(|err| eyre!("failed to bind socket pool: {err}"))?;
    let outbound_tx = pool.sender();

    // The web/IPC boundary that would feed `SearchReq`s into the running
    // node is out of scope here; the sender half is only kept alive so the
    // scheduler's external channel doesn't observe a spurious close.
    let (search_tx, search_req_rx) = mpsc::channel::<external::SearchReq>(16);

    let scheduler = Scheduler::new(config, bootstrap);
    let run = scheduler.run(inbound_rx, outbound_tx, search_req_rx);

    info!("kadnode running");
    run.await;
    drop(search_tx);

    Ok(())
}
