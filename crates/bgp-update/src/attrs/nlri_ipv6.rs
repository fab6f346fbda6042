use std::fmt;
use std::net::Ipv6Addr;

use bytes::{BufMut, BytesMut};
use ipnet::Ipv6Net;
use nom::Parser;

use crate::error::fail;
use crate::parse_be::{be_u8, be_u32, take_bytes};
use crate::{BgpError, ParseNlri, ParseResult, many0_complete};

use super::nlri_ipv4::nlri_psize;

#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct Ipv6Nlri {
    pub id: u32,
    pub prefix: Ipv6Net,
}

impl Ipv6Nlri {
    pub fn new(prefix: Ipv6Net) -> Self {
        Self { id: 0, prefix }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    pub fn len(&self, addpath: bool) -> usize {
        let id = if addpath { 4 } else { 0 };
        id + 1 + nlri_psize(self.prefix.prefix_len())
    }

    pub fn emit(&self, buf: &mut BytesMut, addpath: bool) {
        if addpath {
            buf.put_u32(self.id);
        }
        let plen = self.prefix.prefix_len();
        buf.put_u8(plen);
        buf.put(&self.prefix.addr().octets()[..nlri_psize(plen)]);
    }
}

impl ParseNlri<Ipv6Nlri> for Ipv6Nlri {
    fn parse_nlri(input: &[u8], addpath: bool) -> ParseResult<'_, Ipv6Nlri> {
        let (input, id) = if addpath { be_u32(input)? } else { (input, 0) };
        let (input, plen) = be_u8(input)?;
        if plen > 128 {
            return fail(BgpError::MalformedNlri(format!(
                "IPv6 prefix length {plen}"
            )));
        }
        let psize = nlri_psize(plen);
        if input.len() < psize {
            return fail(BgpError::MalformedNlri(format!(
                "IPv6 prefix needs {psize} bytes, {} left",
                input.len()
            )));
        }
        let (input, addr) = take_bytes(input, psize)?;
        let mut paddr = [0u8; 16];
        paddr[..psize].copy_from_slice(addr);
        let prefix = Ipv6Net::new(Ipv6Addr::from(paddr), plen)
            .map_err(|e| nom::Err::Failure(BgpError::MalformedNlri(e.to_string())))?;
        Ok((input, Ipv6Nlri { id, prefix }))
    }
}

impl fmt::Display for Ipv6Nlri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id != 0 {
            write!(f, "[{}]{}", self.id, self.prefix)
        } else {
            write!(f, "{}", self.prefix)
        }
    }
}

/// Parses a whole withdrawn routes or NLRI section.
pub fn parse_bgp_nlri_ipv6(input: &[u8], addpath: bool) -> Result<Vec<Ipv6Nlri>, BgpError> {
    let (rest, nlris) = many0_complete(|i| Ipv6Nlri::parse_nlri(i, addpath)).parse(input)?;
    if !rest.is_empty() {
        return Err(BgpError::MalformedNlri(format!(
            "{} trailing bytes after IPv6 prefixes",
            rest.len()
        )));
    }
    Ok(nlris)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_section() {
        let input = [
            64, 0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 1, //
            128, 0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
        ];
        let nlris = parse_bgp_nlri_ipv6(&input, false).unwrap();
        let prefixes: Vec<String> = nlris.iter().map(|n| n.to_string()).collect();
        assert_eq!(prefixes, ["2001:db8:0:1::/64", "2001:db8::1/128"]);

        let mut buf = BytesMut::new();
        for nlri in nlris.iter() {
            nlri.emit(&mut buf, false);
        }
        assert_eq!(&buf[..], &input[..]);
    }

    #[test]
    fn bad_prefix_length() {
        let err = parse_bgp_nlri_ipv6(&[129, 0x20, 0x01], false).unwrap_err();
        assert!(matches!(err, BgpError::MalformedNlri(_)));
    }
}
