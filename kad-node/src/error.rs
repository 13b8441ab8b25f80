// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use kad_networking::NetworkingError;
use thiserror::Error;

/// Top-level error for the binary. Startup failures here are fatal
/// (spec.md §7): bootstrap is impossible without at least one contact.
#[derive(Error, Debug)]
pub enum NodeError {
    #[error(transparent)]
    Networking(#[from] NetworkingError),

    #[error("failed to read bootstrap node file at {path}: {source}")]
    BootstrapFileUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind UDP socket on port {port}: {source}")]
    SocketBind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}
