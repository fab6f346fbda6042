use crate::error::fail;
use crate::parse_be::{be_u8, be_u16, take_bytes};
use crate::{AttrFlags, BgpError, ParseResult};

#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum AttrType {
    Origin = 1,
    AsPath = 2,
    NextHop = 3,
    Med = 4,
    LocalPref = 5,
    AtomicAggregate = 6,
    Aggregator = 7,
    Community = 8,
    OriginatorId = 9,
    ClusterList = 10,
    MpReachNlri = 14,
    MpUnreachNlri = 15,
    ExtendedCom = 16,
    As4Path = 17,
    As4Aggregator = 18,
    PmsiTunnel = 22,
    Aigp = 26,
    LargeCom = 32,
    Unknown(u8),
}

impl From<u8> for AttrType {
    fn from(attr_type: u8) -> Self {
        use AttrType::*;
        match attr_type {
            1 => Origin,
            2 => AsPath,
            3 => NextHop,
            4 => Med,
            5 => LocalPref,
            6 => AtomicAggregate,
            7 => Aggregator,
            8 => Community,
            9 => OriginatorId,
            10 => ClusterList,
            14 => MpReachNlri,
            15 => MpUnreachNlri,
            16 => ExtendedCom,
            17 => As4Path,
            18 => As4Aggregator,
            22 => PmsiTunnel,
            26 => Aigp,
            32 => LargeCom,
            v => Unknown(v),
        }
    }
}

impl From<AttrType> for u8 {
    fn from(attr_type: AttrType) -> Self {
        use AttrType::*;
        match attr_type {
            Origin => 1,
            AsPath => 2,
            NextHop => 3,
            Med => 4,
            LocalPref => 5,
            AtomicAggregate => 6,
            Aggregator => 7,
            Community => 8,
            OriginatorId => 9,
            ClusterList => 10,
            MpReachNlri => 14,
            MpUnreachNlri => 15,
            ExtendedCom => 16,
            As4Path => 17,
            As4Aggregator => 18,
            PmsiTunnel => 22,
            Aigp => 26,
            LargeCom => 32,
            Unknown(v) => v,
        }
    }
}

/// A path attribute split into its header fields, with the value and the
/// complete on-wire bytes still borrowed from the message.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAttr<'a> {
    pub flags: AttrFlags,
    pub attr_type: AttrType,
    pub value: &'a [u8],
    pub raw: &'a [u8],
}

impl<'a> RawAttr<'a> {
    pub fn parse_be(input: &'a [u8]) -> ParseResult<'a, RawAttr<'a>> {
        let start = input;
        let (input, flags) = be_u8(input)?;
        let flags = AttrFlags::from(flags);
        let (input, attr_type) = be_u8(input)?;
        let attr_type: AttrType = attr_type.into();

        let (input, attr_len) = if flags.extended() {
            be_u16(input)?
        } else {
            let (input, len) = be_u8(input)?;
            (input, len as u16)
        };
        let attr_len = attr_len as usize;
        if input.len() < attr_len {
            return fail(BgpError::MalformedLength {
                expected: attr_len,
                actual: input.len(),
            });
        }
        let header_len = start.len() - input.len();
        let (input, value) = take_bytes(input, attr_len)?;
        let raw = &start[..header_len + attr_len];

        Ok((
            input,
            RawAttr {
                flags,
                attr_type,
                value,
                raw,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form() {
        let input = [0x40, 0x01, 0x01, 0x00, 0xff];
        let (rest, attr) = RawAttr::parse_be(&input).unwrap();
        assert_eq!(attr.attr_type, AttrType::Origin);
        assert!(attr.flags.transitive());
        assert_eq!(attr.value, &[0x00]);
        assert_eq!(attr.raw, &input[..4]);
        assert_eq!(rest, &[0xff]);
    }

    #[test]
    fn extended_form() {
        let input = [0xd0, 0x10, 0x00, 0x02, 0xaa, 0xbb];
        let (rest, attr) = RawAttr::parse_be(&input).unwrap();
        assert_eq!(attr.attr_type, AttrType::ExtendedCom);
        assert!(attr.flags.extended());
        assert_eq!(attr.value, &[0xaa, 0xbb]);
        assert_eq!(attr.raw, &input[..]);
        assert!(rest.is_empty());
    }

    #[test]
    fn truncated_value() {
        let input = [0x40, 0x03, 0x04, 0x0a, 0x00];
        let err = RawAttr::parse_be(&input).unwrap_err();
        assert!(matches!(
            err,
            nom::Err::Failure(BgpError::MalformedLength {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn unknown_type() {
        assert_eq!(AttrType::from(99), AttrType::Unknown(99));
        assert_eq!(u8::from(AttrType::Unknown(99)), 99);
        assert_eq!(u8::from(AttrType::MpUnreachNlri), 15);
    }
}
