// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Hash and stream-cipher primitives used by the keyword hash and the
//! datagram obfuscation layer.

use crate::error::CodecError;
use digest::Digest;
use md4::Md4;
use md5::Md5;
use rc4::{KeyInit, Rc4, StreamCipher};

pub fn md4(data: &[u8]) -> [u8; 16] {
    let mut hasher = Md4::new();
    hasher.update(data);
    hasher.finalize().into()
}

pub fn md5(data: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Flips the byte order within each of the four 32-bit lanes of a 16-byte
/// hash. eMule stores ed2k/KAD hashes big-endian-per-lane on the wire but
/// keyword target hashes are derived MD4 (little-endian); this lane flip is
/// applied both when deriving a keyword target hash and again when
/// formatting a file hash for an ed2k link.
pub fn endian_flip32(src: &[u8; 16]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for lane in 0..4 {
        for j in 0..4 {
            out[lane * 4 + j] = src[lane * 4 + 3 - j];
        }
    }
    out
}

fn xor_fold_u32s(hash: &[u8; 16]) -> u32 {
    let mut key = u32::from_le_bytes(hash[0..4].try_into().expect("4 bytes"));
    for chunk in hash[4..].chunks(4) {
        key ^= u32::from_le_bytes(chunk.try_into().expect("4 bytes"));
    }
    key
}

/// Derives the per-peer UDP verify key from our local UDP key and the
/// peer's public IP, matching `kad_prefs.go`'s `getUDPVerifyKey`: MD5 the
/// 8-byte little-endian concatenation of `(udp_key << 32 | peer_ip)`, XOR
/// the four 32-bit lanes of the digest together, and fold the result into
/// `[1, 0xFFFF_FFFE]` so it is never zero (zero means "no verify key").
pub fn derive_udp_verify_key(local_udp_key: u32, peer_ip: u32) -> u32 {
    let value: u64 = ((local_udp_key as u64) << 32) | peer_ip as u64;
    let digest = md5(&value.to_le_bytes());
    xor_fold_u32s(&digest) % 0xFFFF_FFFE + 1
}

/// Magic value every obfuscated datagram's ciphered header must decrypt to.
pub const OBFUSCATION_MAGIC: u32 = 0x395F_2EC1;

/// Key material derived from a peer's KAD ID, used when we don't yet hold a
/// verify key for it (`net_socket.go`'s `achKeyData` 18-byte branch: 16-byte
/// KAD ID + 2-byte random key part supplied by the far end).
pub fn rc4_key_from_kad_id(kad_id: &[u8; 16], random_key_part: u16) -> [u8; 16] {
    let mut data = [0u8; 18];
    data[0..16].copy_from_slice(kad_id);
    data[16..18].copy_from_slice(&random_key_part.to_le_bytes());
    md5(&data)
}

/// Key material derived from a verify key, used once a peer has told us its
/// verify key (`net_socket.go`'s 6-byte `achKeyData` branch).
pub fn rc4_key_from_verify_key(verify_key: u32, random_key_part: u16) -> [u8; 16] {
    let mut data = [0u8; 6];
    data[0..4].copy_from_slice(&verify_key.to_le_bytes());
    data[4..6].copy_from_slice(&random_key_part.to_le_bytes());
    md5(&data)
}

/// Applies RC4 in place, the way every obfuscation step in `net_socket.go`
/// does: a fresh `Rc4` is keyed once per datagram (never reused across
/// calls), then `apply_keystream` runs over one region of the buffer at a
/// time in wire order.
pub struct ObfuscationCipher {
    inner: Rc4<rc4::consts::U16>,
}

impl ObfuscationCipher {
    pub fn new(key: &[u8; 16]) -> Result<Self, CodecError> {
        let inner = Rc4::new_from_slice(key).map_err(|_| CodecError::BadCipherKey)?;
        Ok(Self { inner })
    }

    pub fn apply(&mut self, buf: &mut [u8]) {
        self.inner.apply_keystream(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endian_flip_is_its_own_inverse() {
        let hash: [u8; 16] = md4(b"the quick brown fox");
        assert_eq!(endian_flip32(&endian_flip32(&hash)), hash);
    }

    #[test]
    fn verify_key_is_never_zero() {
        for peer_ip in [0u32, 1, 0xFFFF_FFFF] {
            let key = derive_udp_verify_key(0, peer_ip);
            assert!(key >= 1 && key <= 0xFFFF_FFFE);
        }
    }

    #[test]
    fn obfuscation_round_trips() {
        let key = rc4_key_from_kad_id(&[7u8; 16], 42);
        let mut cipher = ObfuscationCipher::new(&key).unwrap();
        let mut buf = OBFUSCATION_MAGIC.to_le_bytes();
        cipher.apply(&mut buf);

        let mut cipher = ObfuscationCipher::new(&key).unwrap();
        cipher.apply(&mut buf);
        assert_eq!(u32::from_le_bytes(buf), OBFUSCATION_MAGIC);
    }
}
