use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use bytes::{BufMut, BytesMut};

use crate::error::fail;
use crate::parse_be::{be_u16, be_u32, take_bytes};
use crate::{BgpError, LABEL_MAX, Label, ParseNlri, ParseResult, RD_LEN, RouteDistinguisher};

/// Value of the length field of a VPLS NLRI.
pub const L2VPN_NLRI_LEN: u16 = 17;

// VPLS NLRI (RFC 4761 section 3.2.2):
// +------------------------------------+
// |  Length (2 octets)                 |
// +------------------------------------+
// |  Route Distinguisher  (8 octets)   |
// +------------------------------------+
// |  VE ID (2 octets)                  |
// +------------------------------------+
// |  VE Block Offset (2 octets)        |
// +------------------------------------+
// |  VE Block Size (2 octets)          |
// +------------------------------------+
// |  Label Base (3 octets)             |
// +------------------------------------+
//
// Only the low 20 bits of `label_base` are carried on the wire, equality
// and ordering look at those bits alone.
#[derive(Debug, Clone)]
pub struct L2vpnNlri {
    pub id: u32,
    pub rd: RouteDistinguisher,
    pub ve_id: u16,
    pub block_offset: u16,
    pub block_size: u16,
    pub label_base: u32,
}

impl L2vpnNlri {
    pub fn new(
        rd: RouteDistinguisher,
        label_base: u32,
        block_offset: u16,
        block_size: u16,
        ve_id: u16,
    ) -> Self {
        Self {
            id: 0,
            rd,
            ve_id,
            block_offset,
            block_size,
            label_base: label_base & LABEL_MAX,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    pub fn len(&self, addpath: bool) -> usize {
        let id = if addpath { 4 } else { 0 };
        id + 2 + L2VPN_NLRI_LEN as usize
    }

    pub fn emit(&self, buf: &mut BytesMut, addpath: bool) {
        if addpath {
            buf.put_u32(self.id);
        }
        buf.put_u16(L2VPN_NLRI_LEN);
        buf.put(&self.rd.to_bytes()[..]);
        buf.put_u16(self.ve_id);
        buf.put_u16(self.block_offset);
        buf.put_u16(self.block_size);
        buf.put(&Label::base(self.label_base).to_bytes()[..]);
    }

    fn key(&self) -> (u32, RouteDistinguisher, u16, u16, u16, u32) {
        (
            self.id,
            self.rd,
            self.ve_id,
            self.block_offset,
            self.block_size,
            self.label_base & LABEL_MAX,
        )
    }
}

impl PartialEq for L2vpnNlri {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for L2vpnNlri {}

impl Hash for L2vpnNlri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for L2vpnNlri {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for L2vpnNlri {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl ParseNlri<L2vpnNlri> for L2vpnNlri {
    fn parse_nlri(input: &[u8], addpath: bool) -> ParseResult<'_, L2vpnNlri> {
        let (input, id) = if addpath { be_u32(input)? } else { (input, 0) };
        let (input, len) = be_u16(input)?;
        if len != L2VPN_NLRI_LEN {
            return fail(BgpError::MalformedNlri(format!(
                "L2VPN NLRI length {len}, expected {L2VPN_NLRI_LEN}"
            )));
        }
        if input.len() < len as usize {
            return fail(BgpError::MalformedNlri(format!(
                "L2VPN NLRI needs {len} bytes, {} left",
                input.len()
            )));
        }
        let (input, rd) = take_bytes(input, RD_LEN)?;
        let rd = RouteDistinguisher::from_bytes(rd).map_err(nom::Err::Failure)?;
        let (input, ve_id) = be_u16(input)?;
        let (input, block_offset) = be_u16(input)?;
        let (input, block_size) = be_u16(input)?;
        let (input, label) = take_bytes(input, 3)?;
        let label = Label::try_from(label).map_err(nom::Err::Failure)?;

        let nlri = L2vpnNlri {
            id,
            rd,
            ve_id,
            block_offset,
            block_size,
            label_base: label.label,
        };
        Ok((input, nlri))
    }
}

impl fmt::Display for L2vpnNlri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "l2vpn:endpoint:{}:base:{}:offset:{}:size:{} route-distinguisher {}",
            self.ve_id, self.label_base, self.block_offset, self.block_size, self.rd
        )
    }
}
