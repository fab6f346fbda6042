use std::net::IpAddr;

use bytes::{BufMut, Bytes, BytesMut};
use itertools::Itertools;

use crate::{
    AfiSafi, AttrFlags, AttrType, MpReachBuilder, MpUnreachBuilder, attr_emit_header,
    attr_header_len,
};

/// One packed NLRI wrapped as a complete MP_REACH_NLRI or MP_UNREACH_NLRI
/// attribute. Any run of chunks is a valid attribute sequence on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpChunk {
    pub attr_type: AttrType,
    pub afi_safi: AfiSafi,
    pub nexthop: Option<IpAddr>,
    pub nlri: Bytes,
}

pub(crate) fn nexthop_len(nexthop: &Option<IpAddr>) -> usize {
    match nexthop {
        Some(IpAddr::V4(_)) => 4,
        Some(IpAddr::V6(_)) => 16,
        None => 0,
    }
}

pub(crate) fn nexthop_emit(buf: &mut BytesMut, nexthop: &Option<IpAddr>) {
    match nexthop {
        Some(IpAddr::V4(addr)) => buf.put(&addr.octets()[..]),
        Some(IpAddr::V6(addr)) => buf.put(&addr.octets()[..]),
        None => {}
    }
}

impl MpChunk {
    // Octets in front of the NLRI: AFI, SAFI and for reach the next-hop
    // and the reserved octet.
    fn value_header_len(&self) -> usize {
        match self.attr_type {
            AttrType::MpReachNlri => 2 + 1 + 1 + nexthop_len(&self.nexthop) + 1,
            _ => 2 + 1,
        }
    }

    /// Size of the chunk as a standalone attribute.
    pub fn len(&self) -> usize {
        let value_len = self.value_header_len() + self.nlri.len();
        attr_header_len(value_len) + value_len
    }

    pub fn is_empty(&self) -> bool {
        self.nlri.is_empty()
    }

    pub fn emit(&self, buf: &mut BytesMut) {
        mp_emit_group(buf, &[self]);
    }
}

// Emits chunks sharing one attribute key as a single attribute.
fn mp_emit_group(buf: &mut BytesMut, group: &[&MpChunk]) {
    let Some(first) = group.first() else {
        return;
    };
    let nlri_len: usize = group.iter().map(|c| c.nlri.len()).sum();
    let value_len = first.value_header_len() + nlri_len;

    attr_emit_header(
        buf,
        AttrFlags::new().with_optional(true),
        first.attr_type,
        value_len,
    );
    buf.put_u16(first.afi_safi.afi.into());
    buf.put_u8(first.afi_safi.safi.into());
    if first.attr_type == AttrType::MpReachNlri {
        buf.put_u8(nexthop_len(&first.nexthop) as u8);
        nexthop_emit(buf, &first.nexthop);
        // Reserved.
        buf.put_u8(0);
    }
    for chunk in group {
        buf.put(&chunk.nlri[..]);
    }
}

/// Writes pending chunks, merging neighbours that share family, next-hop
/// and attribute type. The result is never longer than the chunks written
/// one by one.
///
/// Chunks of different families or next-hops stay separate attributes, so a
/// message may repeat MP_REACH_NLRI or MP_UNREACH_NLRI. Receivers following
/// RFC 7606 section 3(g) treat a repeated MP attribute as a malformed
/// attribute list.
pub fn mp_coalesce(buf: &mut BytesMut, chunks: &[MpChunk]) {
    for (_, group) in &chunks.iter().chunk_by(|c| (c.attr_type, c.afi_safi, c.nexthop)) {
        let group: Vec<&MpChunk> = group.collect();
        mp_emit_group(buf, &group);
    }
}

/// Per family chunk producer, the packer drives it one chunk at a time.
#[derive(Debug, Clone)]
pub enum MpBuilder<'a> {
    Reach(MpReachBuilder<'a>),
    Unreach(MpUnreachBuilder<'a>),
}

impl MpBuilder<'_> {
    pub fn afi_safi(&self) -> AfiSafi {
        match self {
            MpBuilder::Reach(v) => v.afi_safi(),
            MpBuilder::Unreach(v) => v.afi_safi(),
        }
    }
}

impl Iterator for MpBuilder<'_> {
    type Item = MpChunk;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            MpBuilder::Reach(v) => v.next(),
            MpBuilder::Unreach(v) => v.next(),
        }
    }
}
