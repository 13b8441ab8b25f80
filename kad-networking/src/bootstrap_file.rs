// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Parser for the persistent `kad/nodes.dat` routing-table snapshot
//! (spec.md §4.7).

use crate::error::NetworkingError;
use kad_protocol::byteio::ByteReader;
use kad_protocol::Id;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootstrapEntry {
    pub kad_id: Id,
    pub ip: u32,
    pub udp_port: u16,
    pub tcp_port: u16,
    pub version: u8,
}

/// Parses a `nodes.dat` buffer. The header's first `u32` is a legacy
/// count that is read and discarded before the real version/count pair
/// (spec.md §9 flags this as a probable quirk of the legacy format, kept
/// here rather than guessed away).
///
/// For the supported `version` range (1..=3) the per-entry byte is always
/// the contact's own KAD version (commonly 8 or 9), never a "type" byte —
/// the legacy `byType >= 4` skip in the reference parser only ever fires
/// for `version == 0` files, which are already rejected above. Every
/// entry is therefore admitted here; `ContactManager` is what rejects a
/// contact whose version is too low, not this parser.
pub fn parse(buf: &[u8]) -> Result<Vec<BootstrapEntry>, NetworkingError> {
    if buf.is_empty() {
        return Err(NetworkingError::EmptyBootstrapFile);
    }
    let mut r = ByteReader::new(buf);
    let _legacy_count = r.read_u32()?;
    let version = r.read_u32()?;
    if !(1..=3).contains(&version) {
        return Err(NetworkingError::UnsupportedBootstrapVersion(version));
    }
    let count = r.read_u32()? as usize;

    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let kad_id = Id::from_bytes(r.read_array16()?);
        let ip = r.read_u32()?;
        let udp_port = r.read_u16()?;
        let tcp_port = r.read_u16()?;
        let contact_version = r.read_u8()?;
        if version >= 2 {
            let _udp_key = r.read_u32()?;
            let _udp_key_ip = r.read_u32()?;
            let _verified = r.read_u8()?;
        }
        entries.push(BootstrapEntry {
            kad_id,
            ip,
            udp_port,
            tcp_port,
            version: contact_version,
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kad_protocol::byteio::ByteWriter;

    fn encode_v2_file(entries: &[(u8, u8)]) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(128);
        w.write_u32(0); // legacy count, ignored
        w.write_u32(2); // version
        w.write_u32(entries.len() as u32);
        for (id_byte, contact_version) in entries {
            w.write_bytes(&[*id_byte; 16]);
            w.write_u32(0x0A000001);
            w.write_u16(4662);
            w.write_u16(4672);
            w.write_u8(*contact_version);
            w.write_u32(0); // udp_key
            w.write_u32(0); // udp_key_ip
            w.write_u8(1); // verified flag on disk, ignored by admission
        }
        w.into_vec()
    }

    #[test]
    fn empty_file_is_fatal() {
        assert!(matches!(
            parse(&[]),
            Err(NetworkingError::EmptyBootstrapFile)
        ));
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut w = ByteWriter::with_capacity(12);
        w.write_u32(0);
        w.write_u32(99);
        w.write_u32(0);
        assert!(matches!(
            parse(&w.into_vec()),
            Err(NetworkingError::UnsupportedBootstrapVersion(99))
        ));
    }

    #[test]
    fn every_entry_is_admitted_with_its_own_contact_version() {
        // the per-entry byte is the contact's KAD version (commonly 8/9 in
        // the wild), not a "type" to filter on; a real modern nodes.dat is
        // full of values like these and must not be discarded.
        let buf = encode_v2_file(&[(1, 3), (2, 8), (3, 9)]);
        let entries = parse(&buf).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].kad_id, Id::from_bytes([2; 16]));
        assert_eq!(entries[1].version, 8);
        assert_eq!(entries[2].version, 9);
    }
}
