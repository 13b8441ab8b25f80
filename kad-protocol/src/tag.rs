// Copyright 2026 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Typed key/value pairs ("tags") carried inside KAD message bodies.
//!
//! Every tag is `[type: u8][name][value]`. When the type byte's `0x80` bit
//! is set the name is a single "special" byte drawn from [`names`] rather
//! than a length-prefixed string; eMule uses this for the handful of tags
//! that appear in nearly every search response (file name, size, type,
//! sources, media length). A reader that doesn't recognise a tag *type*
//! cannot safely skip it (it doesn't know the value's length), so an
//! unknown type fails the whole message; an unrecognised tag *name* is
//! simply dropped once its (known-length) value has been read.

use crate::byteio::{ByteReader, ByteWriter};
use crate::error::CodecError;

const COMPACT_NAME_FLAG: u8 = 0x80;

const TYPE_HASH: u8 = 0x01;
const TYPE_STRING: u8 = 0x02;
const TYPE_U32: u8 = 0x03;
const TYPE_F32: u8 = 0x04;
const TYPE_BSOB: u8 = 0x07;
const TYPE_U16: u8 = 0x08;
const TYPE_U8: u8 = 0x09;
const TYPE_U64: u8 = 0x0B;

/// Special single-byte tag names eMule assigns their own compact encoding.
pub mod names {
    pub const FILENAME: u8 = 0x01;
    pub const FILESIZE: u8 = 0x02;
    pub const FILETYPE: u8 = 0x03;
    pub const SOURCES: u8 = 0x15;
    pub const MEDIA_LENGTH: u8 = 0xD3;
    /// Not part of the upstream eMule tag set; this crate's own extension
    /// for carrying the learned per-peer UDP verify key inside a
    /// hello-response, since nothing else in the response body names one.
    pub const UDP_VERIFY_KEY: u8 = 0xF6;
}

/// A tag name: either one of the compact single-byte IDs or an arbitrary
/// string name (used by tags this crate never originates but must still be
/// able to skip over inside an otherwise-recognised message).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagName {
    Special(u8),
    Full(String),
}

/// A tag value, matching the dynamically-typed sum the wire format uses.
#[derive(Clone, Debug, PartialEq)]
pub enum TagValue {
    Hash([u8; 16]),
    String(String),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    Bsob(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    pub name: TagName,
    pub value: TagValue,
}

impl Tag {
    pub fn special(name: u8, value: TagValue) -> Self {
        Self {
            name: TagName::Special(name),
            value,
        }
    }

    /// Returns the value if this tag's name is the given special ID.
    pub fn value_if_named(&self, special: u8) -> Option<&TagValue> {
        match &self.name {
            TagName::Special(n) if *n == special => Some(&self.value),
            _ => None,
        }
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        let (type_byte, compact) = match &self.name {
            TagName::Special(_) => (value_type_byte(&self.value) | COMPACT_NAME_FLAG, true),
            TagName::Full(_) => (value_type_byte(&self.value), false),
        };
        w.write_u8(type_byte);
        if compact {
            let TagName::Special(id) = &self.name else {
                unreachable!()
            };
            w.write_u8(*id);
        } else {
            let TagName::Full(name) = &self.name else {
                unreachable!()
            };
            let bytes = name.as_bytes();
            w.write_u16(bytes.len() as u16);
            w.write_bytes(bytes);
        }
        encode_value(&self.value, w);
    }

    pub fn decode(r: &mut ByteReader<'_>) -> Result<Self, CodecError> {
        let type_byte = r.read_u8()?;
        let compact = type_byte & COMPACT_NAME_FLAG != 0;
        let base_type = type_byte & !COMPACT_NAME_FLAG;
        let name = if compact {
            TagName::Special(r.read_u8()?)
        } else {
            let len = r.read_u16()? as usize;
            let bytes = r.read_bytes(len)?;
            TagName::Full(String::from_utf8_lossy(bytes).into_owned())
        };
        let value = decode_value(base_type, r)?;
        Ok(Self { name, value })
    }
}

fn value_type_byte(value: &TagValue) -> u8 {
    match value {
        TagValue::Hash(_) => TYPE_HASH,
        TagValue::String(_) => TYPE_STRING,
        TagValue::U8(_) => TYPE_U8,
        TagValue::U16(_) => TYPE_U16,
        TagValue::U32(_) => TYPE_U32,
        TagValue::U64(_) => TYPE_U64,
        TagValue::F32(_) => TYPE_F32,
        TagValue::Bsob(_) => TYPE_BSOB,
    }
}

fn encode_value(value: &TagValue, w: &mut ByteWriter) {
    match value {
        TagValue::Hash(h) => w.write_bytes(h),
        TagValue::String(s) => {
            let bytes = s.as_bytes();
            w.write_u16(bytes.len() as u16);
            w.write_bytes(bytes);
        }
        TagValue::U8(v) => w.write_u8(*v),
        TagValue::U16(v) => w.write_u16(*v),
        TagValue::U32(v) => w.write_u32(*v),
        TagValue::U64(v) => w.write_u64(*v),
        TagValue::F32(v) => w.write_u32(v.to_bits()),
        TagValue::Bsob(b) => {
            w.write_u16(b.len() as u16);
            w.write_bytes(b);
        }
    }
}

fn decode_value(base_type: u8, r: &mut ByteReader<'_>) -> Result<TagValue, CodecError> {
    match base_type {
        TYPE_HASH => Ok(TagValue::Hash(r.read_array16()?)),
        TYPE_STRING => {
            let len = r.read_u16()? as usize;
            let bytes = r.read_bytes(len)?;
            Ok(TagValue::String(String::from_utf8_lossy(bytes).into_owned()))
        }
        TYPE_U8 => Ok(TagValue::U8(r.read_u8()?)),
        TYPE_U16 => Ok(TagValue::U16(r.read_u16()?)),
        TYPE_U32 => Ok(TagValue::U32(r.read_u32()?)),
        TYPE_U64 => Ok(TagValue::U64(r.read_u64()?)),
        TYPE_F32 => Ok(TagValue::F32(r.read_f32()?)),
        TYPE_BSOB => {
            let len = r.read_u16()? as usize;
            Ok(TagValue::Bsob(r.read_bytes(len)?.to_vec()))
        }
        other => Err(CodecError::UnknownTagType(other)),
    }
}

/// Decodes `count` tags, failing the whole message on the first unknown
/// tag *type* (an unknown name is fine: its value still has a known size
/// and is simply carried as an unrecognised tag).
pub fn decode_tags(r: &mut ByteReader<'_>, count: usize) -> Result<Vec<Tag>, CodecError> {
    let mut tags = Vec::with_capacity(count);
    for _ in 0..count {
        tags.push(Tag::decode(r)?);
    }
    Ok(tags)
}

pub fn encode_tags(tags: &[Tag], w: &mut ByteWriter) {
    for tag in tags {
        tag.encode(w);
    }
}
