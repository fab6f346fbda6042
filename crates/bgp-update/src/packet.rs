use bytes::{BufMut, BytesMut};

use crate::error::fail;
use crate::parse_be::{be_u8, be_u16, take_bytes};
use crate::{BgpError, ParseBe, ParseResult};

pub const BGP_PACKET_LEN: usize = 4096;
pub const BGP_EXTENDED_PACKET_LEN: usize = 65535;
pub const BGP_HEADER_LEN: u16 = 19;

/// Header plus the two 2-octet section lengths every UPDATE carries.
pub const BGP_UPDATE_MIN_LEN: usize = BGP_HEADER_LEN as usize + 2 + 2;

#[repr(u8)]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BgpType {
    Open = 1,
    Update = 2,
    Notification = 3,
    Keepalive = 4,
    RouteRefresh = 5,
    Capability = 6,
}

impl TryFrom<u8> for BgpType {
    type Error = BgpError;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        use BgpType::*;
        match val {
            1 => Ok(Open),
            2 => Ok(Update),
            3 => Ok(Notification),
            4 => Ok(Keepalive),
            5 => Ok(RouteRefresh),
            6 => Ok(Capability),
            v => Err(BgpError::NomError(format!("Unknown BGP message type {}", v))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BgpHeader {
    pub marker: [u8; 16],
    pub length: u16,
    pub typ: BgpType,
}

impl BgpHeader {
    pub fn new(typ: BgpType, length: u16) -> Self {
        Self {
            marker: [0xffu8; 16],
            length,
            typ,
        }
    }
}

impl From<BgpHeader> for BytesMut {
    fn from(header: BgpHeader) -> Self {
        let mut buf = BytesMut::new();
        buf.put(&header.marker[..]);
        buf.put_u16(header.length);
        let typ: u8 = header.typ as u8;
        buf.put_u8(typ);
        buf
    }
}

impl ParseBe<BgpHeader> for BgpHeader {
    fn parse_be(input: &[u8]) -> ParseResult<'_, BgpHeader> {
        let (input, marker) = take_bytes(input, 16)?;
        let (input, length) = be_u16(input)?;
        let (input, typ) = be_u8(input)?;
        if (length as usize) < BGP_HEADER_LEN as usize {
            return fail(BgpError::InvalidHeaderLength {
                expected: BGP_HEADER_LEN as usize,
                actual: length as usize,
            });
        }
        let typ = match BgpType::try_from(typ) {
            Ok(typ) => typ,
            Err(err) => return fail(err),
        };
        let mut header = BgpHeader::new(typ, length);
        header.marker.copy_from_slice(marker);
        Ok((input, header))
    }
}

pub fn peek_bgp_length(input: &[u8]) -> usize {
    match input.get(16..18) {
        Some(len) => u16::from_be_bytes([len[0], len[1]]) as usize,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        let header = BgpHeader::new(BgpType::Update, 23);
        let buf: BytesMut = header.clone().into();
        assert_eq!(buf.len(), BGP_HEADER_LEN as usize);
        assert_eq!(peek_bgp_length(&buf), 23);

        let (rest, parsed) = BgpHeader::parse_be(&buf).unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed, header);
    }

    #[test]
    fn header_too_short() {
        let mut buf: BytesMut = BgpHeader::new(BgpType::Update, 18).into();
        buf.truncate(19);
        let err = BgpHeader::parse_be(&buf).unwrap_err();
        assert!(matches!(
            err,
            nom::Err::Failure(BgpError::InvalidHeaderLength { .. })
        ));
    }
}
