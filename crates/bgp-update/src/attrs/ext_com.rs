use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, BytesMut};

use crate::{
    AttrEmitter, AttrFlags, AttrType, BgpError, ExtCommunitySubType, ExtCommunityType, L2ControlFlags,
    L2Encaps, RouteDistinguisher, RouteDistinguisherType,
};

pub const EXT_COMMUNITY_LEN: usize = 8;

/// Layer-2 info community (RFC 4761 section 3.2.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct L2Info {
    pub encaps: u8,
    pub control: u8,
    pub mtu: u16,
    pub preference: u16,
}

impl L2Info {
    pub fn encaps_type(&self) -> Option<L2Encaps> {
        L2Encaps::try_from(self.encaps).ok()
    }

    pub fn control_flags(&self) -> L2ControlFlags {
        L2ControlFlags::from_bits_retain(self.control)
    }
}

/// One 8 byte extended community. Types without a typed model stay opaque
/// and are written back untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtCommunityValue {
    RouteTarget(RouteDistinguisher),
    RouteOrigin(RouteDistinguisher),
    L2Info(L2Info),
    Opaque([u8; EXT_COMMUNITY_LEN]),
}

impl ExtCommunityValue {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BgpError> {
        let bytes: [u8; EXT_COMMUNITY_LEN] =
            bytes.try_into().map_err(|_| BgpError::MalformedLength {
                expected: EXT_COMMUNITY_LEN,
                actual: bytes.len(),
            })?;
        let high = ExtCommunityType::try_from(bytes[0]);
        let low = ExtCommunitySubType::try_from(bytes[1]);

        let value = match (high, low) {
            (
                Ok(ExtCommunityType::TransTwoOctetAS | ExtCommunityType::TransIpv4Addr),
                Ok(ExtCommunitySubType::RouteTarget),
            ) => Self::RouteTarget(Self::rd(&bytes)),
            (
                Ok(ExtCommunityType::TransTwoOctetAS | ExtCommunityType::TransIpv4Addr),
                Ok(ExtCommunitySubType::RouteOrigin),
            ) => Self::RouteOrigin(Self::rd(&bytes)),
            (Ok(ExtCommunityType::L2Vpn), Ok(ExtCommunitySubType::L2Info)) => {
                Self::L2Info(L2Info {
                    encaps: bytes[2],
                    control: bytes[3],
                    mtu: u16::from_be_bytes([bytes[4], bytes[5]]),
                    preference: u16::from_be_bytes([bytes[6], bytes[7]]),
                })
            }
            _ => Self::Opaque(bytes),
        };
        Ok(value)
    }

    // Two octet AS and IPv4 specific values share the RD value layouts.
    fn rd(bytes: &[u8; EXT_COMMUNITY_LEN]) -> RouteDistinguisher {
        let mut rd = RouteDistinguisher::new(RouteDistinguisherType::from(bytes[0] as u16));
        rd.val.copy_from_slice(&bytes[2..]);
        rd
    }

    pub fn to_bytes(&self) -> [u8; EXT_COMMUNITY_LEN] {
        let mut bytes = [0u8; EXT_COMMUNITY_LEN];
        match self {
            Self::RouteTarget(rd) | Self::RouteOrigin(rd) => {
                let sub_type = if matches!(self, Self::RouteTarget(_)) {
                    ExtCommunitySubType::RouteTarget
                } else {
                    ExtCommunitySubType::RouteOrigin
                };
                bytes[0] = u16::from(rd.typ) as u8;
                bytes[1] = sub_type.into();
                bytes[2..].copy_from_slice(&rd.val);
            }
            Self::L2Info(info) => {
                bytes[0] = ExtCommunityType::L2Vpn.into();
                bytes[1] = ExtCommunitySubType::L2Info.into();
                bytes[2] = info.encaps;
                bytes[3] = info.control;
                bytes[4..6].copy_from_slice(&info.mtu.to_be_bytes());
                bytes[6..8].copy_from_slice(&info.preference.to_be_bytes());
            }
            Self::Opaque(raw) => bytes = *raw,
        }
        bytes
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put(&self.to_bytes()[..]);
    }
}

impl fmt::Display for ExtCommunityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RouteTarget(rd) => write!(f, "{}:{rd}", ExtCommunitySubType::RouteTarget),
            Self::RouteOrigin(rd) => write!(f, "{}:{rd}", ExtCommunitySubType::RouteOrigin),
            Self::L2Info(info) => write!(
                f,
                "{}:{}:{}:{}:{}",
                ExtCommunitySubType::L2Info,
                info.encaps,
                info.control,
                info.mtu,
                info.preference
            ),
            Self::Opaque(raw) => write!(f, "0x{:016x}", u64::from_be_bytes(*raw)),
        }
    }
}

impl FromStr for ExtCommunityValue {
    type Err = BgpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || BgpError::InvalidCommunityFormat(s.to_string());

        if let Some(hex) = s.strip_prefix("0x") {
            if hex.len() != EXT_COMMUNITY_LEN * 2 {
                return Err(err());
            }
            let raw = u64::from_str_radix(hex, 16).map_err(|_| err())?;
            return Self::from_bytes(&raw.to_be_bytes());
        }

        let (keyword, rest) = s.split_once(':').ok_or_else(err)?;
        let sub_type = ExtCommunitySubType::from_str(keyword).map_err(|_| err())?;
        match sub_type {
            ExtCommunitySubType::RouteTarget => {
                let rd = RouteDistinguisher::from_str(rest).map_err(|_| err())?;
                Ok(Self::RouteTarget(rd))
            }
            ExtCommunitySubType::RouteOrigin => {
                let rd = RouteDistinguisher::from_str(rest).map_err(|_| err())?;
                Ok(Self::RouteOrigin(rd))
            }
            ExtCommunitySubType::L2Info => {
                let fields: Vec<&str> = rest.split(':').collect();
                let [encaps, control, mtu, preference] = fields[..] else {
                    return Err(err());
                };
                Ok(Self::L2Info(L2Info {
                    encaps: encaps.parse().map_err(|_| err())?,
                    control: control.parse().map_err(|_| err())?,
                    mtu: mtu.parse().map_err(|_| err())?,
                    preference: preference.parse().map_err(|_| err())?,
                }))
            }
        }
    }
}

/// EXTENDED_COMMUNITIES path attribute.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ExtCommunity(pub Vec<ExtCommunityValue>);

impl ExtCommunity {
    pub fn parse_value(value: &[u8]) -> Result<Self, BgpError> {
        if value.len() % EXT_COMMUNITY_LEN != 0 {
            return Err(BgpError::MalformedLength {
                expected: value.len() / EXT_COMMUNITY_LEN * EXT_COMMUNITY_LEN,
                actual: value.len(),
            });
        }
        let values = value
            .chunks_exact(EXT_COMMUNITY_LEN)
            .map(ExtCommunityValue::from_bytes)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(values))
    }
}

impl AttrEmitter for ExtCommunity {
    fn attr_flags(&self) -> AttrFlags {
        AttrFlags::new().with_optional(true).with_transitive(true)
    }

    fn attr_type(&self) -> AttrType {
        AttrType::ExtendedCom
    }

    fn len(&self) -> Option<usize> {
        Some(self.0.len() * EXT_COMMUNITY_LEN)
    }

    fn emit(&self, buf: &mut BytesMut) {
        for ext_community in &self.0 {
            ext_community.encode(buf);
        }
    }
}

impl fmt::Display for ExtCommunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self
            .0
            .iter()
            .map(|x| x.to_string())
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "{v}")
    }
}

impl fmt::Debug for ExtCommunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtCommunity: {}", self)
    }
}

impl FromStr for ExtCommunity {
    type Err = BgpError;

    // Whitespace separated values. A bare keyword followed by its value,
    // as in "rt 100:200", is accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ecom = ExtCommunity::default();
        let mut tokens = s.split_whitespace();
        while let Some(token) = tokens.next() {
            let val = if ExtCommunitySubType::from_str(token).is_ok() {
                let rest = tokens
                    .next()
                    .ok_or_else(|| BgpError::InvalidCommunityFormat(token.to_string()))?;
                ExtCommunityValue::from_str(&format!("{token}:{rest}"))?
            } else {
                ExtCommunityValue::from_str(token)?
            };
            ecom.0.push(val);
        }
        Ok(ecom)
    }
}
