// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Routing table, contact lifecycle, rate limiting and keyword-search
//! state for the KAD overlay. No networking I/O lives here; the event
//! loop, socket pool and external interfaces live in `kad-node`.

pub mod bootstrap_file;
pub mod contact;
pub mod contact_manager;
pub mod dispatch;
pub mod error;
pub mod finder;
pub mod keyword_hash;
pub mod liveness;
pub mod onliner;
pub mod rate_guard;
pub mod search;

pub use error::NetworkingError;
