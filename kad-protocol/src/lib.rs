// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Wire protocol, crypto primitives and codec for the eMule KAD overlay.
//!
//! This crate has no networking I/O of its own: it turns byte buffers into
//! typed messages and back, and the obfuscation/encryption scheme that sits
//! between them. The stateful session logic (routing table, search, rate
//! limiting) lives in `kad-networking`; the event loop and binary live in
//! `kad-node`.

pub mod byteio;
pub mod crypto;
pub mod error;
pub mod id;
pub mod message;
pub mod opcode;
pub mod packet;
pub mod tag;

pub use error::CodecError;
pub use id::Id;
