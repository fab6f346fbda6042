use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display, EnumString};

#[derive(Debug, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ExtCommunityType {
    TransTwoOctetAS = 0x00,
    TransIpv4Addr = 0x01,
    TransOpaque = 0x03,
    L2Vpn = 0x80,
}

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive, IntoPrimitive, EnumString, Display)]
#[repr(u8)]
pub enum ExtCommunitySubType {
    #[strum(to_string = "target", serialize = "rt")]
    RouteTarget = 0x02,
    #[strum(to_string = "origin", serialize = "soo")]
    RouteOrigin = 0x03,
    #[strum(serialize = "l2info")]
    L2Info = 0x0a,
}

/// Layer-2 encapsulation types (RFC 4761, RFC 6624).
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive, Display)]
#[repr(u8)]
pub enum L2Encaps {
    #[strum(serialize = "Frame Relay DLCI")]
    FrameRelayDlci = 1,
    #[strum(serialize = "ATM AAL5")]
    AtmAal5 = 2,
    #[strum(serialize = "ATM transparent")]
    AtmTransparent = 3,
    #[strum(serialize = "Ethernet VLAN")]
    EthernetVlan = 4,
    Ethernet = 5,
    #[strum(serialize = "HDLC")]
    Hdlc = 6,
    #[strum(serialize = "PPP")]
    Ppp = 7,
    #[strum(serialize = "VPLS")]
    Vpls = 19,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct L2ControlFlags: u8 {
        const SEQUENCED = 0x01;
        const CONTROL_WORD = 0x02;
    }
}
