// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! eDonkey/KAD header bytes, opcodes and protocol version constants.

/// The byte that precedes every plaintext control-packet opcode.
pub const OP_KADEMLIA_HEADER: u8 = 0xE4;
/// Precedes a zlib-compressed control packet ("packed protocol").
pub const OP_KADEMLIA_PACKED_PROT: u8 = 0xE5;
pub const OP_PACKED_PORT: u8 = 0xD4;
pub const OP_EMULE_PORT: u8 = 0xC5;
pub const OP_UDP_RESERVED_PORT1: u8 = 0xA3;
pub const OP_UDP_RESERVED_PORT2: u8 = 0xB2;

/// Any of these leading bytes mark a datagram as plaintext (not obfuscated).
pub const PLAINTEXT_MAGIC_BYTES: [u8; 6] = [
    OP_KADEMLIA_HEADER,
    OP_KADEMLIA_PACKED_PROT,
    OP_PACKED_PORT,
    OP_EMULE_PORT,
    OP_UDP_RESERVED_PORT1,
    OP_UDP_RESERVED_PORT2,
];

pub const KADEMLIA2_HELLO_REQ: u8 = 0x11;
pub const KADEMLIA2_HELLO_RES: u8 = 0x19;
pub const KADEMLIA2_HELLO_RES_ACK: u8 = 0x22;
pub const KADEMLIA2_REQ: u8 = 0x21;
pub const KADEMLIA2_RES: u8 = 0x29;
pub const KADEMLIA2_SEARCH_KEY_REQ: u8 = 0x33;
pub const KADEMLIA2_SEARCH_RES: u8 = 0x3B;

pub const KADEMLIA_FIND_NODE: u8 = 0x0B;

pub const KADEMLIA_VERSION_2_47A: u8 = 0x02;
pub const KADEMLIA_VERSION_3_47B: u8 = 0x03;
pub const KADEMLIA_VERSION_6_49A_BETA: u8 = 0x06;
pub const KADEMLIA_VERSION: u8 = 0x09;

/// Contacts below this version are dropped on admission.
pub const MIN_SUPPORT_CONTACT_VERSION: u8 = KADEMLIA_VERSION_3_47B;

pub fn opcode_str(opcode: u8) -> &'static str {
    match opcode {
        KADEMLIA2_HELLO_REQ => "kademlia2HelloReq",
        KADEMLIA2_HELLO_RES => "kademlia2HelloRes",
        KADEMLIA2_HELLO_RES_ACK => "kademlia2HelloResAck",
        KADEMLIA2_REQ => "kademlia2Req",
        KADEMLIA2_RES => "kademlia2Res",
        KADEMLIA2_SEARCH_KEY_REQ => "kademlia2SearchKeyReq",
        KADEMLIA2_SEARCH_RES => "kademlia2SearchRes",
        _ => "unknown",
    }
}
