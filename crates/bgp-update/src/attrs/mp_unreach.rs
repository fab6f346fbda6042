use std::fmt;

use bytes::{BufMut, BytesMut};

use crate::{AfiSafi, AttrEmitter, AttrFlags, AttrType, BgpError, MpChunk, Negotiated, Nlri};

/// Decoded MP_UNREACH_NLRI (RFC 4760). An empty one is an End-of-RIB
/// marker for its family.
#[derive(Debug, Clone, PartialEq)]
pub struct MpUnreachAttr {
    pub afi_safi: AfiSafi,
    pub addpath: bool,
    pub withdraws: Vec<Nlri>,
}

impl MpUnreachAttr {
    pub fn new(afi_safi: AfiSafi) -> Self {
        Self {
            afi_safi,
            addpath: false,
            withdraws: Vec::new(),
        }
    }

    pub fn parse_value(value: &[u8], nego: &Negotiated) -> Result<Self, BgpError> {
        let (input, afi_safi) = AfiSafi::parse_be(value)?;
        let afi_safi = afi_safi.supported()?;
        let addpath = nego.is_add_path_recv(&afi_safi);
        let withdraws = Nlri::parse_all(afi_safi, input, addpath)?;
        Ok(Self {
            afi_safi,
            addpath,
            withdraws,
        })
    }
}

impl AttrEmitter for MpUnreachAttr {
    fn attr_flags(&self) -> AttrFlags {
        AttrFlags::new().with_optional(true)
    }

    fn attr_type(&self) -> AttrType {
        AttrType::MpUnreachNlri
    }

    fn len(&self) -> Option<usize> {
        let nlri: usize = self.withdraws.iter().map(|n| n.len(self.addpath)).sum();
        Some(2 + 1 + nlri)
    }

    fn emit(&self, buf: &mut BytesMut) {
        buf.put_u16(self.afi_safi.afi.into());
        buf.put_u8(self.afi_safi.safi.into());
        for withdraw in self.withdraws.iter() {
            withdraw.emit(buf, self.addpath);
        }
    }
}

impl fmt::Display for MpUnreachAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for withdraw in self.withdraws.iter() {
            writeln!(f, " {} {}", self.afi_safi, withdraw)?;
        }
        Ok(())
    }
}

/// Produces one MP_UNREACH_NLRI chunk per withdrawn entry.
#[derive(Debug, Clone)]
pub struct MpUnreachBuilder<'a> {
    afi_safi: AfiSafi,
    addpath: bool,
    withdraws: std::vec::IntoIter<&'a Nlri>,
}

impl<'a> MpUnreachBuilder<'a> {
    pub fn new(
        afi_safi: AfiSafi,
        withdraws: impl IntoIterator<Item = &'a Nlri>,
        addpath: bool,
    ) -> Self {
        let withdraws: Vec<&'a Nlri> = withdraws.into_iter().collect();
        Self {
            afi_safi,
            addpath,
            withdraws: withdraws.into_iter(),
        }
    }

    pub fn afi_safi(&self) -> AfiSafi {
        self.afi_safi
    }
}

impl Iterator for MpUnreachBuilder<'_> {
    type Item = MpChunk;

    fn next(&mut self) -> Option<Self::Item> {
        let nlri = self.withdraws.next()?;
        Some(MpChunk {
            attr_type: AttrType::MpUnreachNlri,
            afi_safi: self.afi_safi,
            nexthop: None,
            nlri: nlri.pack(self.addpath).freeze(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.withdraws.size_hint()
    }
}
