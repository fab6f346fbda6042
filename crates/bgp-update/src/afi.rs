use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::Display;

use crate::parse_be::{be_u8, be_u16};
use crate::{BgpError, ParseResult};

#[repr(u16)]
#[derive(Debug, Default, PartialEq, Eq, Ord, PartialOrd, Clone, Copy, Hash, Display)]
pub enum Afi {
    #[default]
    #[strum(serialize = "IPv4")]
    Ip = 1,
    #[strum(serialize = "IPv6")]
    Ip6 = 2,
    #[strum(serialize = "L2VPN")]
    L2vpn = 25,
    #[strum(to_string = "Unknown({0})")]
    Unknown(u16),
}

#[repr(u8)]
#[derive(Debug, Default, PartialEq, Eq, Ord, PartialOrd, Clone, Copy, Hash, Display)]
pub enum Safi {
    #[default]
    Unicast = 1,
    Multicast = 2,
    #[strum(serialize = "MPLS Label")]
    MplsLabel = 4,
    #[strum(serialize = "VPLS")]
    Vpls = 65,
    #[strum(serialize = "EVPN")]
    Evpn = 70,
    #[strum(serialize = "MPLS VPN")]
    MplsVpn = 128,
    #[strum(to_string = "Unknown({0})")]
    Unknown(u8),
}

#[derive(Debug, Default, PartialEq, Eq, Ord, PartialOrd, Clone, Copy, Hash)]
pub struct AfiSafi {
    pub afi: Afi,
    pub safi: Safi,
}

impl AfiSafi {
    pub const IPV4_UNICAST: AfiSafi = AfiSafi::new(Afi::Ip, Safi::Unicast);
    pub const IPV4_MULTICAST: AfiSafi = AfiSafi::new(Afi::Ip, Safi::Multicast);
    pub const IPV6_UNICAST: AfiSafi = AfiSafi::new(Afi::Ip6, Safi::Unicast);
    pub const L2VPN_VPLS: AfiSafi = AfiSafi::new(Afi::L2vpn, Safi::Vpls);

    pub const fn new(afi: Afi, safi: Safi) -> Self {
        Self { afi, safi }
    }

    /// IPv4 unicast and multicast may use the NLRI sections of the UPDATE
    /// itself instead of the multiprotocol attributes.
    pub fn is_classic(&self) -> bool {
        self.afi == Afi::Ip && matches!(self.safi, Safi::Unicast | Safi::Multicast)
    }

    fn keyword(&self) -> Option<&'static str> {
        match *self {
            Self::IPV4_UNICAST => Some("ipv4-unicast"),
            Self::IPV4_MULTICAST => Some("ipv4-multicast"),
            Self::IPV6_UNICAST => Some("ipv6-unicast"),
            Self::L2VPN_VPLS => Some("l2vpn-vpls"),
            _ => None,
        }
    }
}

impl fmt::Display for AfiSafi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.afi, self.safi)
    }
}

impl FromStr for AfiSafi {
    type Err = String;

    // Keywords for the supported families, "<afi>-<safi>" numbers otherwise.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let known = [
            Self::IPV4_UNICAST,
            Self::IPV4_MULTICAST,
            Self::IPV6_UNICAST,
            Self::L2VPN_VPLS,
        ];
        if let Some(afi_safi) = known.into_iter().find(|v| v.keyword() == Some(s)) {
            return Ok(afi_safi);
        }
        let (afi, safi) = s
            .split_once('-')
            .ok_or_else(|| format!("unknown address family {s}"))?;
        let afi: u16 = afi
            .parse()
            .map_err(|_| format!("unknown address family {s}"))?;
        let safi: u8 = safi
            .parse()
            .map_err(|_| format!("unknown address family {s}"))?;
        Ok(Self::new(afi.into(), safi.into()))
    }
}

impl Serialize for AfiSafi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.keyword() {
            Some(keyword) => serializer.serialize_str(keyword),
            None => serializer.serialize_str(&format!(
                "{}-{}",
                u16::from(self.afi),
                u8::from(self.safi)
            )),
        }
    }
}

impl<'de> Deserialize<'de> for AfiSafi {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// AFI/SAFI keyed storage.
#[derive(Debug, Default, Clone)]
pub struct AfiSafis<T>(pub BTreeMap<AfiSafi, T>);

impl<T> AfiSafis<T> {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn entry(&mut self, afi_safi: AfiSafi) -> &mut T
    where
        T: Default,
    {
        self.0.entry(afi_safi).or_default()
    }
}

impl<T> IntoIterator for AfiSafis<T> {
    type Item = (AfiSafi, T);
    type IntoIter = std::collections::btree_map::IntoIter<AfiSafi, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Afi> for u16 {
    fn from(afi: Afi) -> Self {
        use Afi::*;
        match afi {
            Ip => 1,
            Ip6 => 2,
            L2vpn => 25,
            Unknown(v) => v,
        }
    }
}

impl From<u16> for Afi {
    fn from(val: u16) -> Self {
        use Afi::*;
        match val {
            1 => Ip,
            2 => Ip6,
            25 => L2vpn,
            v => Unknown(v),
        }
    }
}

impl From<Safi> for u8 {
    fn from(safi: Safi) -> Self {
        use Safi::*;
        match safi {
            Unicast => 1,
            Multicast => 2,
            MplsLabel => 4,
            Vpls => 65,
            Evpn => 70,
            MplsVpn => 128,
            Unknown(v) => v,
        }
    }
}

impl From<u8> for Safi {
    fn from(val: u8) -> Self {
        use Safi::*;
        match val {
            1 => Unicast,
            2 => Multicast,
            4 => MplsLabel,
            65 => Vpls,
            70 => Evpn,
            128 => MplsVpn,
            v => Unknown(v),
        }
    }
}

impl Afi {
    pub fn parse_be(input: &[u8]) -> ParseResult<'_, Self> {
        let (input, afi) = be_u16(input)?;
        let afi: Self = afi.into();
        Ok((input, afi))
    }
}

impl Safi {
    pub fn parse_be(input: &[u8]) -> ParseResult<'_, Self> {
        let (input, safi) = be_u8(input)?;
        let safi: Self = safi.into();
        Ok((input, safi))
    }
}

impl AfiSafi {
    pub fn parse_be(input: &[u8]) -> ParseResult<'_, Self> {
        let (input, afi) = Afi::parse_be(input)?;
        let (input, safi) = Safi::parse_be(input)?;
        Ok((input, AfiSafi { afi, safi }))
    }

    /// Rejects families the codec has no NLRI model for.
    pub fn supported(self) -> Result<Self, BgpError> {
        match self.keyword() {
            Some(_) => Ok(self),
            None => Err(BgpError::UnknownAfiSafi(self)),
        }
    }
}
