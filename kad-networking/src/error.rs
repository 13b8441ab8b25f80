// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use kad_protocol::CodecError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkingError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("routing table is at capacity ({capacity})")]
    RoutingTableFull { capacity: usize },

    #[error("bootstrap node file header declared an unsupported version {0}")]
    UnsupportedBootstrapVersion(u32),

    #[error("bootstrap node file is empty or missing")]
    EmptyBootstrapFile,
}
