use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::parse_be::take_bytes;
use crate::{BgpError, ParseResult};

pub const RD_LEN: usize = 8;

#[allow(clippy::upper_case_acronyms)]
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum RouteDistinguisherType {
    #[default]
    ASN,
    IP,
    Unknown(u16),
}

impl From<u16> for RouteDistinguisherType {
    fn from(typ: u16) -> Self {
        match typ {
            0 => Self::ASN,
            1 => Self::IP,
            v => Self::Unknown(v),
        }
    }
}

impl From<RouteDistinguisherType> for u16 {
    fn from(typ: RouteDistinguisherType) -> Self {
        match typ {
            RouteDistinguisherType::ASN => 0,
            RouteDistinguisherType::IP => 1,
            RouteDistinguisherType::Unknown(v) => v,
        }
    }
}

/// Route distinguisher (RFC 4364). The sub-encoding is resolved once when
/// the value is built, the 6 byte value is kept verbatim.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct RouteDistinguisher {
    pub typ: RouteDistinguisherType,
    pub val: [u8; 6],
}

impl RouteDistinguisher {
    pub fn new(typ: RouteDistinguisherType) -> Self {
        Self {
            typ,
            ..Default::default()
        }
    }

    pub fn asn(asn: u16, val: u32) -> Self {
        let mut rd = Self::new(RouteDistinguisherType::ASN);
        rd.val[0..2].copy_from_slice(&asn.to_be_bytes());
        rd.val[2..6].copy_from_slice(&val.to_be_bytes());
        rd
    }

    pub fn ip(addr: Ipv4Addr, val: u16) -> Self {
        let mut rd = Self::new(RouteDistinguisherType::IP);
        rd.val[0..4].copy_from_slice(&addr.octets());
        rd.val[4..6].copy_from_slice(&val.to_be_bytes());
        rd
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BgpError> {
        if bytes.len() != RD_LEN {
            return Err(BgpError::MalformedLength {
                expected: RD_LEN,
                actual: bytes.len(),
            });
        }
        let typ = u16::from_be_bytes([bytes[0], bytes[1]]);
        let mut rd = Self::new(typ.into());
        rd.val.copy_from_slice(&bytes[2..]);
        Ok(rd)
    }

    pub fn to_bytes(&self) -> [u8; RD_LEN] {
        let mut bytes = [0u8; RD_LEN];
        bytes[0..2].copy_from_slice(&u16::from(self.typ).to_be_bytes());
        bytes[2..].copy_from_slice(&self.val);
        bytes
    }

    pub fn parse_be(input: &[u8]) -> ParseResult<'_, Self> {
        let (input, bytes) = take_bytes(input, RD_LEN)?;
        let rd = Self::from_bytes(bytes).map_err(nom::Err::Failure)?;
        Ok((input, rd))
    }
}

impl FromStr for RouteDistinguisher {
    type Err = BgpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || BgpError::InvalidRouteDistinguisher(s.to_string());
        let (admin, assigned) = s.split_once(':').ok_or_else(err)?;

        // A 32-bit IP address, a colon, and a 16-bit number, for example:
        // 192.168.1.2:51
        if let Ok(addr) = admin.parse::<Ipv4Addr>() {
            let val = assigned.parse::<u16>().map_err(|_| err())?;
            return Ok(Self::ip(addr, val));
        }
        // A 16-bit autonomous system number, a colon, and a 32-bit number, for
        // example: 65000:3
        let asn = admin.parse::<u16>().map_err(|_| err())?;
        let val = assigned.parse::<u32>().map_err(|_| err())?;
        Ok(Self::asn(asn, val))
    }
}

impl fmt::Display for RouteDistinguisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.typ {
            RouteDistinguisherType::ASN => {
                let asn = u16::from_be_bytes([self.val[0], self.val[1]]);
                let val =
                    u32::from_be_bytes([self.val[2], self.val[3], self.val[4], self.val[5]]);
                write!(f, "{asn}:{val}")
            }
            RouteDistinguisherType::IP => {
                let ip = Ipv4Addr::new(self.val[0], self.val[1], self.val[2], self.val[3]);
                let val = u16::from_be_bytes([self.val[4], self.val[5]]);
                write!(f, "{ip}:{val}")
            }
            RouteDistinguisherType::Unknown(typ) => {
                let mut raw = [0u8; 8];
                raw[2..].copy_from_slice(&self.val);
                write!(f, "{typ}:0x{:012x}", u64::from_be_bytes(raw))
            }
        }
    }
}
