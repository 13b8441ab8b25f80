// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use thiserror::Error;

/// Errors raised while decoding or encoding a datagram on the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("buffer too short: need {needed} more byte(s), have {remaining}")]
    Truncated { needed: usize, remaining: usize },

    #[error("datagram shorter than the 2-byte eDonkey header")]
    HeaderTooShort,

    #[error("unrecognised magic byte 0x{0:02X}")]
    UnknownMagicByte(u8),

    #[error("opcode 0x{0:02X} is not a response opcode we parse")]
    UnexpectedOpcode(u8),

    #[error("zlib inflate of packed-protocol payload failed")]
    Inflate,

    #[error("unknown tag type 0x{0:02X}")]
    UnknownTagType(u8),

    #[error("kademlia2Res payload size {actual} does not match declared contact count {contact_count} (expected {expected})")]
    BadResSize {
        actual: usize,
        expected: usize,
        contact_count: u8,
    },

    #[error("datagram too short to carry an obfuscation header")]
    ObfuscationHeaderTooShort,

    #[error("obfuscated datagram magic value mismatch")]
    ObfuscationMagicMismatch,

    #[error("obfuscated datagram padding exceeds remaining length")]
    ObfuscationPadTooLong,

    #[error("RC4 key setup failed")]
    BadCipherKey,
}
