use std::fmt;
use std::net::IpAddr;

use bytes::BytesMut;
use nom::Parser;

use crate::{
    AfiSafi, BgpError, Ipv4Nlri, Ipv6Nlri, L2vpnNlri, ParseNlri, ParseResult, many0_complete,
};

/// NLRI of every address family the codec understands.
#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub enum Nlri {
    Ipv4Unicast(Ipv4Nlri),
    Ipv4Multicast(Ipv4Nlri),
    Ipv6Unicast(Ipv6Nlri),
    L2vpnVpls(L2vpnNlri),
}

impl Nlri {
    pub fn afi_safi(&self) -> AfiSafi {
        match self {
            Nlri::Ipv4Unicast(_) => AfiSafi::IPV4_UNICAST,
            Nlri::Ipv4Multicast(_) => AfiSafi::IPV4_MULTICAST,
            Nlri::Ipv6Unicast(_) => AfiSafi::IPV6_UNICAST,
            Nlri::L2vpnVpls(_) => AfiSafi::L2VPN_VPLS,
        }
    }

    /// Path identifier, only on the wire when ADD-PATH is in effect.
    pub fn id(&self) -> u32 {
        match self {
            Nlri::Ipv4Unicast(v) | Nlri::Ipv4Multicast(v) => v.id,
            Nlri::Ipv6Unicast(v) => v.id,
            Nlri::L2vpnVpls(v) => v.id,
        }
    }

    pub fn len(&self, addpath: bool) -> usize {
        match self {
            Nlri::Ipv4Unicast(v) | Nlri::Ipv4Multicast(v) => v.len(addpath),
            Nlri::Ipv6Unicast(v) => v.len(addpath),
            Nlri::L2vpnVpls(v) => v.len(addpath),
        }
    }

    pub fn emit(&self, buf: &mut BytesMut, addpath: bool) {
        match self {
            Nlri::Ipv4Unicast(v) | Nlri::Ipv4Multicast(v) => v.emit(buf, addpath),
            Nlri::Ipv6Unicast(v) => v.emit(buf, addpath),
            Nlri::L2vpnVpls(v) => v.emit(buf, addpath),
        }
    }

    pub fn pack(&self, addpath: bool) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.len(addpath));
        self.emit(&mut buf, addpath);
        buf
    }

    pub fn parse_nlri(afi_safi: AfiSafi, input: &[u8], addpath: bool) -> ParseResult<'_, Nlri> {
        match afi_safi {
            AfiSafi::IPV4_UNICAST => {
                let (input, v) = Ipv4Nlri::parse_nlri(input, addpath)?;
                Ok((input, Nlri::Ipv4Unicast(v)))
            }
            AfiSafi::IPV4_MULTICAST => {
                let (input, v) = Ipv4Nlri::parse_nlri(input, addpath)?;
                Ok((input, Nlri::Ipv4Multicast(v)))
            }
            AfiSafi::IPV6_UNICAST => {
                let (input, v) = Ipv6Nlri::parse_nlri(input, addpath)?;
                Ok((input, Nlri::Ipv6Unicast(v)))
            }
            AfiSafi::L2VPN_VPLS => {
                let (input, v) = L2vpnNlri::parse_nlri(input, addpath)?;
                Ok((input, Nlri::L2vpnVpls(v)))
            }
            _ => Err(nom::Err::Failure(BgpError::UnknownAfiSafi(afi_safi))),
        }
    }

    /// Decodes one entry, returning it with the number of bytes consumed.
    pub fn parse(afi_safi: AfiSafi, input: &[u8], addpath: bool) -> Result<(Nlri, usize), BgpError> {
        let (rest, nlri) = Self::parse_nlri(afi_safi, input, addpath)?;
        Ok((nlri, input.len() - rest.len()))
    }

    /// Decodes a packed run of same family entries, trailing bytes are an
    /// error.
    pub fn parse_all(
        afi_safi: AfiSafi,
        input: &[u8],
        addpath: bool,
    ) -> Result<Vec<Nlri>, BgpError> {
        let (rest, nlris) =
            many0_complete(|i| Self::parse_nlri(afi_safi, i, addpath)).parse(input)?;
        if !rest.is_empty() {
            return Err(BgpError::MalformedNlri(format!(
                "{} trailing bytes after {afi_safi} NLRI",
                rest.len()
            )));
        }
        Ok(nlris)
    }
}

impl fmt::Display for Nlri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nlri::Ipv4Unicast(v) | Nlri::Ipv4Multicast(v) => write!(f, "{v}"),
            Nlri::Ipv6Unicast(v) => write!(f, "{v}"),
            Nlri::L2vpnVpls(v) => write!(f, "{v}"),
        }
    }
}

impl From<L2vpnNlri> for Nlri {
    fn from(nlri: L2vpnNlri) -> Self {
        Nlri::L2vpnVpls(nlri)
    }
}

impl From<Ipv6Nlri> for Nlri {
    fn from(nlri: Ipv6Nlri) -> Self {
        Nlri::Ipv6Unicast(nlri)
    }
}

/// An entry to announce. Without a next-hop the next-hop of the attribute
/// set is used.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct Route {
    pub nlri: Nlri,
    pub nexthop: Option<IpAddr>,
}

impl Route {
    pub fn new(nlri: impl Into<Nlri>) -> Self {
        Self {
            nlri: nlri.into(),
            nexthop: None,
        }
    }

    pub fn with_nexthop(mut self, nexthop: impl Into<IpAddr>) -> Self {
        self.nexthop = Some(nexthop.into());
        self
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.nexthop {
            Some(nexthop) => write!(f, "{} next-hop {nexthop}", self.nlri),
            None => write!(f, "{}", self.nlri),
        }
    }
}
