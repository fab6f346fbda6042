use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::{BufMut, BytesMut};

use crate::parse_be::{be_u8, take_bytes};
use crate::{
    AfiSafi, AttrEmitter, AttrFlags, AttrType, BgpError, MpChunk, Negotiated, Nlri, ParseBe, Route,
};

use super::mp_chunk::{nexthop_emit, nexthop_len};

/// Decoded MP_REACH_NLRI (RFC 4760).
#[derive(Debug, Clone, PartialEq)]
pub struct MpReachAttr {
    pub afi_safi: AfiSafi,
    pub nexthop: Option<IpAddr>,
    pub snpa: u8,
    pub addpath: bool,
    pub updates: Vec<Nlri>,
}

impl MpReachAttr {
    pub fn parse_value(value: &[u8], nego: &Negotiated) -> Result<Self, BgpError> {
        let (input, afi_safi) = AfiSafi::parse_be(value)?;
        let afi_safi = afi_safi.supported()?;
        let (input, nhop_len) = be_u8(input)?;
        let (input, nhop) = take_bytes(input, nhop_len as usize)?;
        let nexthop = match nhop_len {
            0 => None,
            4 => {
                let (_, addr) = Ipv4Addr::parse_be(nhop)?;
                Some(IpAddr::V4(addr))
            }
            // Global address, optionally followed by a link-local one.
            16 | 32 => {
                let (_, addr) = Ipv6Addr::parse_be(nhop)?;
                Some(IpAddr::V6(addr))
            }
            _ => {
                return Err(BgpError::MalformedLength {
                    expected: 4,
                    actual: nhop_len as usize,
                });
            }
        };
        let (input, snpa) = be_u8(input)?;
        let addpath = nego.is_add_path_recv(&afi_safi);
        let updates = Nlri::parse_all(afi_safi, input, addpath)?;
        Ok(Self {
            afi_safi,
            nexthop,
            snpa,
            addpath,
            updates,
        })
    }
}

impl AttrEmitter for MpReachAttr {
    fn attr_flags(&self) -> AttrFlags {
        AttrFlags::new().with_optional(true)
    }

    fn attr_type(&self) -> AttrType {
        AttrType::MpReachNlri
    }

    fn len(&self) -> Option<usize> {
        let nlri: usize = self.updates.iter().map(|n| n.len(self.addpath)).sum();
        Some(2 + 1 + 1 + nexthop_len(&self.nexthop) + 1 + nlri)
    }

    fn emit(&self, buf: &mut BytesMut) {
        buf.put_u16(self.afi_safi.afi.into());
        buf.put_u8(self.afi_safi.safi.into());
        buf.put_u8(nexthop_len(&self.nexthop) as u8);
        nexthop_emit(buf, &self.nexthop);
        buf.put_u8(self.snpa);
        for update in self.updates.iter() {
            update.emit(buf, self.addpath);
        }
    }
}

impl fmt::Display for MpReachAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nexthop = self
            .nexthop
            .map(|nh| nh.to_string())
            .unwrap_or_else(|| "-".to_string());
        for update in self.updates.iter() {
            writeln!(f, " {} {} => {}", self.afi_safi, update, nexthop)?;
        }
        Ok(())
    }
}

/// Produces one MP_REACH_NLRI chunk per route, grouped by next-hop.
#[derive(Debug, Clone)]
pub struct MpReachBuilder<'a> {
    afi_safi: AfiSafi,
    addpath: bool,
    routes: std::vec::IntoIter<(Option<IpAddr>, &'a Nlri)>,
}

impl<'a> MpReachBuilder<'a> {
    /// Routes without their own next-hop use `nexthop`.
    pub fn new(
        afi_safi: AfiSafi,
        routes: impl IntoIterator<Item = &'a Route>,
        nexthop: Option<IpAddr>,
        addpath: bool,
    ) -> Self {
        let mut routes: Vec<(Option<IpAddr>, &'a Nlri)> = routes
            .into_iter()
            .map(|route| (route.nexthop.or(nexthop), &route.nlri))
            .collect();
        // Stable, so entries keep their order within a next-hop.
        routes.sort_by_key(|(nexthop, _)| *nexthop);
        Self {
            afi_safi,
            addpath,
            routes: routes.into_iter(),
        }
    }

    pub fn afi_safi(&self) -> AfiSafi {
        self.afi_safi
    }
}

impl Iterator for MpReachBuilder<'_> {
    type Item = MpChunk;

    fn next(&mut self) -> Option<Self::Item> {
        let (nexthop, nlri) = self.routes.next()?;
        Some(MpChunk {
            attr_type: AttrType::MpReachNlri,
            afi_safi: self.afi_safi,
            nexthop,
            nlri: nlri.pack(self.addpath).freeze(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.routes.size_hint()
    }
}
