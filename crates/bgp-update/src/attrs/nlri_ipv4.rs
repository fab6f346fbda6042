use std::fmt;
use std::net::Ipv4Addr;

use bytes::{BufMut, BytesMut};
use ipnet::Ipv4Net;
use nom::Parser;

use crate::error::fail;
use crate::parse_be::{be_u8, be_u32, take_bytes};
use crate::{BgpError, ParseNlri, ParseResult, many0_complete};

/// Octets needed for a prefix of `plen` bits.
pub fn nlri_psize(plen: u8) -> usize {
    plen.div_ceil(8).into()
}

#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct Ipv4Nlri {
    pub id: u32,
    pub prefix: Ipv4Net,
}

impl Ipv4Nlri {
    pub fn new(prefix: Ipv4Net) -> Self {
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

impl ParseNlri<Ipv4Nlri> for Ipv4Nlri {
    fn parse_nlri(input: &[u8], addpath: bool) -> ParseResult<'_, Ipv4Nlri> {
        let (input, id) = if addpath { be_u32(input)? } else { (input, 0) };
        let (input, plen) = be_u8(input)?;
        if plen > 32 {
            return fail(BgpError::MalformedNlri(format!(
                "IPv4 prefix length {plen}"
            )));
        }
        let psize = nlri_psize(plen);
        if input.len() < psize {
            return fail(BgpError::MalformedNlri(format!(
                "IPv4 prefix needs {psize} bytes, {} left",
                input.len()
            )));
        }
        let (input, addr) = take_bytes(input, psize)?;
        let mut paddr = [0u8; 4];
        paddr[..psize].copy_from_slice(addr);
        let prefix = Ipv4Net::new(Ipv4Addr::from(paddr), plen)
            .map_err(|e| nom::Err::Failure(BgpError::MalformedNlri(e.to_string())))?;
        Ok((input, Ipv4Nlri { id, prefix }))
    }
}

impl fmt::Display for Ipv4Nlri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id != 0 {
            write!(f, "[{}]{}", self.id, self.prefix)
        } else {
            write!(f, "{}", self.prefix)
        }
    }
}

/// Parses a whole withdrawn routes or NLRI section.
pub fn parse_bgp_nlri_ipv4(input: &[u8], addpath: bool) -> Result<Vec<Ipv4Nlri>, BgpError> {
    let (rest, nlris) = many0_complete(|i| Ipv4Nlri::parse_nlri(i, addpath)).parse(input)?;
    if !rest.is_empty() {
        return Err(BgpError::MalformedNlri(format!(
            "{} trailing bytes after IPv4 prefixes",
            rest.len()
        )));
    }
    Ok(nlris)
}
