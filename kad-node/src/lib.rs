// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Binary-facing glue: configuration, the socket pool, the scheduler
//! event loop, and the two external boundaries (search and keyword
//! check) described in SPEC_FULL.md §2.

pub mod classify;
pub mod config;
pub mod ed2k;
pub mod error;
pub mod external;
pub mod keyword;
pub mod logging;
pub mod packet_processor;
pub mod scheduler;
pub mod socket_pool;
pub mod yellow;

pub use error::NodeError;
