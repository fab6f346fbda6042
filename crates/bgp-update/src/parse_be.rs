use std::net::{Ipv4Addr, Ipv6Addr};

use nom::{IResult, Parser};

use crate::BgpError;

pub type ParseResult<'a, T> = IResult<&'a [u8], T, BgpError>;

pub trait ParseBe<T> {
    fn parse_be(input: &[u8]) -> ParseResult<'_, T>;
}

pub trait ParseNlri<T> {
    fn parse_nlri(input: &[u8], addpath: bool) -> ParseResult<'_, T>;
}

impl ParseBe<Ipv4Addr> for Ipv4Addr {
    fn parse_be(input: &[u8]) -> ParseResult<'_, Self> {
        if input.len() < 4 {
            return Err(nom::Err::Incomplete(nom::Needed::new(4)));
        }
        let (input, addr) = be_u32(input)?;
        Ok((input, Self::from(addr)))
    }
}

impl ParseBe<Ipv6Addr> for Ipv6Addr {
    fn parse_be(input: &[u8]) -> ParseResult<'_, Self> {
        if input.len() < 16 {
            return Err(nom::Err::Incomplete(nom::Needed::new(16)));
        }
        let (input, addr) = nom::number::complete::be_u128::<_, BgpError>(input)?;
        Ok((input, Self::from(addr)))
    }
}

// Big-endian readers pinned to the crate error type so `?` needs no
// annotations at the call sites.

pub(crate) fn be_u8(input: &[u8]) -> ParseResult<'_, u8> {
    nom::number::complete::be_u8(input)
}

pub(crate) fn be_u16(input: &[u8]) -> ParseResult<'_, u16> {
    nom::number::complete::be_u16(input)
}

pub(crate) fn be_u32(input: &[u8]) -> ParseResult<'_, u32> {
    nom::number::complete::be_u32(input)
}

pub(crate) fn take_bytes(input: &[u8], count: usize) -> ParseResult<'_, &[u8]> {
    nom::bytes::complete::take(count).parse(input)
}
