use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use bytes::{BufMut, Bytes, BytesMut};

use crate::parse_be::{be_u16, take_bytes};
use crate::{
    AfiSafi, AttrEmitter, AttrType, BGP_HEADER_LEN, BGP_PACKET_LEN, BgpError, BgpHeader, BgpType,
    ExtCommunity, Ipv4Nlri, MpReachAttr, MpUnreachAttr, Negotiated, Nlri, ParseBe, RawAttr, Route,
    UpdatePacker, bgp_debug, bgp_warn, parse_bgp_nlri_ipv4, update_message,
};

/// Routes sharing one set of path attributes.
///
/// `attrs` holds every attribute except MP_REACH_NLRI and MP_UNREACH_NLRI,
/// already packed. `nexthop` is the next-hop those attributes carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub routes: Vec<Route>,
    pub attrs: Bytes,
    pub nexthop: Option<IpAddr>,
}

impl Update {
    pub fn new(attrs: impl Into<Bytes>, nexthop: Option<IpAddr>) -> Self {
        Self {
            routes: Vec::new(),
            attrs: attrs.into(),
            nexthop,
        }
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    pub fn with_routes(mut self, routes: impl IntoIterator<Item = Route>) -> Self {
        self.routes.extend(routes);
        self
    }

    /// UPDATE messages announcing the routes.
    pub fn announce<'a>(&'a self, nego: &Negotiated) -> UpdatePacker<'a> {
        UpdatePacker::announce(self, nego)
    }

    /// UPDATE messages withdrawing the routes, attributes are not sent.
    pub fn withdraw<'a>(&'a self, nego: &Negotiated) -> UpdatePacker<'a> {
        UpdatePacker::withdraw(self, nego)
    }
}

/// A decoded UPDATE message.
#[derive(Clone, PartialEq)]
pub struct UpdatePacket {
    pub header: BgpHeader,
    pub ipv4_withdraw: Vec<Ipv4Nlri>,
    // Every attribute other than MP_REACH_NLRI and MP_UNREACH_NLRI, in
    // received order.
    pub attrs: Bytes,
    pub nexthop: Option<Ipv4Addr>,
    pub ext_com: Option<ExtCommunity>,
    pub mp_update: Vec<MpReachAttr>,
    pub mp_withdraw: Vec<MpUnreachAttr>,
    // Families of MP attributes skipped as unsupported.
    pub mp_skipped: Vec<AfiSafi>,
    pub ipv4_update: Vec<Ipv4Nlri>,
}

impl Default for UpdatePacket {
    fn default() -> Self {
        Self {
            header: BgpHeader::new(BgpType::Update, BGP_HEADER_LEN),
            ipv4_withdraw: Vec::new(),
            attrs: Bytes::new(),
            nexthop: None,
            ext_com: None,
            mp_update: Vec::new(),
            mp_withdraw: Vec::new(),
            mp_skipped: Vec::new(),
            ipv4_update: Vec::new(),
        }
    }
}

impl UpdatePacket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse_packet<'a>(
        input: &'a [u8],
        nego: &Negotiated,
    ) -> Result<(&'a [u8], UpdatePacket), BgpError> {
        let (_, header) = BgpHeader::parse_be(input)?;
        if header.typ != BgpType::Update {
            return Err(BgpError::NomError(format!(
                "{:?} message is not an UPDATE",
                header.typ
            )));
        }
        let (input, message) = take_bytes(input, header.length as usize)?;
        let (body, _) = BgpHeader::parse_be(message)?;

        let mut packet = UpdatePacket {
            header,
            ..Default::default()
        };
        // The classic sections carry IPv4 unicast only.
        let addpath = nego.is_add_path_recv(&AfiSafi::IPV4_UNICAST);

        let (body, withdraw_len) = be_u16(body)?;
        let withdrawn = Self::section(body, withdraw_len)?;
        packet.ipv4_withdraw = parse_bgp_nlri_ipv4(withdrawn, addpath)?;
        let body = &body[withdrawn.len()..];

        let (body, attr_len) = be_u16(body)?;
        let attrs = Self::section(body, attr_len)?;
        packet.parse_attrs(attrs, nego)?;
        let nlri = &body[attrs.len()..];

        packet.ipv4_update = parse_bgp_nlri_ipv4(nlri, addpath)?;
        if !packet.ipv4_update.is_empty() && packet.nexthop.is_none() {
            bgp_warn!("UPDATE carries IPv4 NLRI without NEXT_HOP");
        }
        Ok((input, packet))
    }

    fn section(input: &[u8], len: u16) -> Result<&[u8], BgpError> {
        if input.len() < len as usize {
            return Err(BgpError::MalformedLength {
                expected: len as usize,
                actual: input.len(),
            });
        }
        Ok(&input[..len as usize])
    }

    fn parse_attrs(&mut self, mut input: &[u8], nego: &Negotiated) -> Result<(), BgpError> {
        let mut attrs = BytesMut::with_capacity(input.len());
        while !input.is_empty() {
            let (rest, attr) = RawAttr::parse_be(input)?;
            input = rest;

            let attr_type = attr.attr_type;
            let wrap = |err: BgpError| BgpError::AttributeParseError {
                attr_type,
                source: Box::new(err),
            };
            match attr_type {
                AttrType::MpReachNlri => match MpReachAttr::parse_value(attr.value, nego) {
                    Ok(reach) => self.merge_reach(reach),
                    Err(BgpError::UnknownAfiSafi(afi_safi)) => {
                        bgp_debug!(%afi_safi, "skipping MP_REACH_NLRI of unsupported family");
                        self.mp_skipped.push(afi_safi);
                    }
                    Err(err) => return Err(wrap(err)),
                },
                AttrType::MpUnreachNlri => match MpUnreachAttr::parse_value(attr.value, nego) {
                    Ok(unreach) => self.merge_unreach(unreach),
                    Err(BgpError::UnknownAfiSafi(afi_safi)) => {
                        bgp_debug!(%afi_safi, "skipping MP_UNREACH_NLRI of unsupported family");
                        self.mp_skipped.push(afi_safi);
                    }
                    Err(err) => return Err(wrap(err)),
                },
                AttrType::NextHop => {
                    if attr.value.len() != 4 {
                        return Err(wrap(BgpError::MalformedLength {
                            expected: 4,
                            actual: attr.value.len(),
                        }));
                    }
                    let (_, nexthop) =
                        Ipv4Addr::parse_be(attr.value).map_err(|e| wrap(e.into()))?;
                    self.nexthop = Some(nexthop);
                    attrs.put(attr.raw);
                }
                AttrType::ExtendedCom => {
                    let ext_com = ExtCommunity::parse_value(attr.value).map_err(wrap)?;
                    match self.ext_com.as_mut() {
                        Some(current) => current.0.extend(ext_com.0),
                        None => self.ext_com = Some(ext_com),
                    }
                    attrs.put(attr.raw);
                }
                _ => {
                    bgp_debug!(?attr_type, len = attr.value.len(), "keeping attribute verbatim");
                    attrs.put(attr.raw);
                }
            }
        }
        self.attrs = attrs.freeze();
        Ok(())
    }

    // Several MP attributes for the same family and next-hop collapse into
    // one.
    fn merge_reach(&mut self, reach: MpReachAttr) {
        match self
            .mp_update
            .iter_mut()
            .find(|v| v.afi_safi == reach.afi_safi && v.nexthop == reach.nexthop)
        {
            Some(current) => current.updates.extend(reach.updates),
            None => self.mp_update.push(reach),
        }
    }

    fn merge_unreach(&mut self, unreach: MpUnreachAttr) {
        match self
            .mp_withdraw
            .iter_mut()
            .find(|v| v.afi_safi == unreach.afi_safi)
        {
            Some(current) => current.withdraws.extend(unreach.withdraws),
            None => self.mp_withdraw.push(unreach),
        }
    }

    /// Announced routes of every family. Classic NLRI is reported as IPv4
    /// unicast with the NEXT_HOP attribute as next-hop.
    pub fn routes(&self) -> Vec<Route> {
        let nexthop = self.nexthop.map(IpAddr::V4);
        let classic = self.ipv4_update.iter().map(|nlri| Route {
            nlri: Nlri::Ipv4Unicast(nlri.clone()),
            nexthop,
        });
        let mp = self.mp_update.iter().flat_map(|reach| {
            reach.updates.iter().map(|nlri| Route {
                nlri: nlri.clone(),
                nexthop: reach.nexthop,
            })
        });
        classic.chain(mp).collect()
    }

    /// Withdrawn entries of every family.
    pub fn withdraws(&self) -> Vec<Nlri> {
        let classic = self
            .ipv4_withdraw
            .iter()
            .map(|nlri| Nlri::Ipv4Unicast(nlri.clone()));
        let mp = self
            .mp_withdraw
            .iter()
            .flat_map(|unreach| unreach.withdraws.iter().cloned());
        classic.chain(mp).collect()
    }

    /// Family this message marks the End-of-RIB for (RFC 4724). Messages
    /// with an MP attribute of an unsupported family are never one.
    pub fn end_of_rib(&self) -> Option<AfiSafi> {
        if !self.ipv4_withdraw.is_empty() || !self.ipv4_update.is_empty() {
            return None;
        }
        if !self.mp_update.is_empty() || !self.mp_skipped.is_empty() {
            return None;
        }
        match &self.mp_withdraw[..] {
            [] if self.attrs.is_empty() => Some(AfiSafi::IPV4_UNICAST),
            [unreach] if unreach.withdraws.is_empty() && self.attrs.is_empty() => {
                Some(unreach.afi_safi)
            }
            _ => None,
        }
    }
}

/// End-of-RIB marker for a family: an empty UPDATE for IPv4 unicast, an
/// empty MP_UNREACH_NLRI otherwise.
pub fn end_of_rib(afi_safi: AfiSafi) -> Result<BytesMut, BgpError> {
    if afi_safi == AfiSafi::IPV4_UNICAST {
        return update_message(BGP_PACKET_LEN, &[], &[], &[]);
    }
    let unreach = MpUnreachAttr::new(afi_safi).attr_bytes();
    update_message(BGP_PACKET_LEN, &[], &[&unreach[..]], &[])
}

impl fmt::Debug for UpdatePacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self)
    }
}

impl fmt::Display for UpdatePacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Update Message:")?;
        if let Some(nexthop) = &self.nexthop {
            writeln!(f, " Nexthop: {}", nexthop)?;
        }
        if let Some(ext_com) = &self.ext_com {
            writeln!(f, " Extended Community: {}", ext_com)?;
        }
        if !self.ipv4_update.is_empty() {
            writeln!(f, " IPv4 Updates:")?;
            for update in self.ipv4_update.iter() {
                writeln!(f, "  {}", update)?;
            }
        }
        if !self.ipv4_withdraw.is_empty() {
            writeln!(f, " IPv4 Withdraw:")?;
            for withdraw in self.ipv4_withdraw.iter() {
                writeln!(f, "  {}", withdraw)?;
            }
        }
        for mp_update in self.mp_update.iter() {
            write!(f, "{}", mp_update)?;
        }
        for mp_withdraw in self.mp_withdraw.iter() {
            write!(f, "{}", mp_withdraw)?;
        }
        if let Some(afi_safi) = self.end_of_rib() {
            writeln!(f, " EoR: {}", afi_safi)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{L2vpnNlri, NotificationPacket};
    use hex_literal::hex;

    fn nego() -> Negotiated {
        Negotiated::default().with_family(AfiSafi::L2VPN_VPLS)
    }

    #[test]
    fn parse_juniper_vpls() {
        // ORIGIN, AS_PATH, LOCAL_PREF, EXTENDED_COMMUNITIES and one VPLS
        // route in MP_REACH_NLRI.
        let attrs = hex!(
            "40 01 01 00"
            "40 02 00"
            "40 05 04 00000064"
            "C0 10 10 0002D53F00000006 800A130000000064"
        );
        let reach = hex!(
            "80 0E 1C 0019 41 04 AC1E0504 00"
            "0011 0001AC1E0504000D 0003 0001 0008 400011"
        );
        let mut msg = Vec::new();
        msg.extend_from_slice(&[0xff; 16]);
        let len = 19 + 2 + 2 + attrs.len() + reach.len();
        msg.extend_from_slice(&(len as u16).to_be_bytes());
        msg.push(2);
        msg.extend_from_slice(&[0, 0]);
        msg.extend_from_slice(&((attrs.len() + reach.len()) as u16).to_be_bytes());
        msg.extend_from_slice(&attrs);
        msg.extend_from_slice(&reach);

        let (rest, packet) = UpdatePacket::parse_packet(&msg, &nego()).unwrap();
        assert!(rest.is_empty());
        assert_eq!(&packet.attrs[..], &attrs[..]);
        assert_eq!(
            packet.ext_com.as_ref().unwrap().to_string(),
            "target:54591:6 l2info:19:0:0:100"
        );

        let routes = packet.routes();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].nexthop, Some("172.30.5.4".parse().unwrap()));
        let Nlri::L2vpnVpls(vpls) = &routes[0].nlri else {
            panic!("expected VPLS route");
        };
        assert_eq!(vpls.rd.to_string(), "172.30.5.4:13");
        assert_eq!(vpls.label_base, 262145);
        assert_eq!(packet.end_of_rib(), None);
    }

    #[test]
    fn merge_repeated_mp_attrs() {
        let rd = "65000:1".parse().unwrap();
        let nh: IpAddr = "10.0.0.1".parse().unwrap();
        let update = Update::new(Bytes::new(), Some(nh)).with_routes(
            (1..=3).map(|ve| Route::new(L2vpnNlri::new(rd, 1000, 0, 8, ve))),
        );
        let msgs: Vec<BytesMut> = update
            .announce(&nego())
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(msgs.len(), 1);

        let (_, packet) = UpdatePacket::parse_packet(&msgs[0], &nego()).unwrap();
        assert_eq!(packet.mp_update.len(), 1);
        assert_eq!(packet.mp_update[0].updates.len(), 3);
    }

    #[test]
    fn eor() {
        let buf = end_of_rib(AfiSafi::IPV4_UNICAST).unwrap();
        assert_eq!(buf.len(), 23);
        let (_, packet) = UpdatePacket::parse_packet(&buf, &nego()).unwrap();
        assert_eq!(packet.end_of_rib(), Some(AfiSafi::IPV4_UNICAST));

        let buf = end_of_rib(AfiSafi::L2VPN_VPLS).unwrap();
        assert_eq!(&buf[19..], &hex!("0000 0006 800F03 0019 41"));
        let (_, packet) = UpdatePacket::parse_packet(&buf, &nego()).unwrap();
        assert_eq!(packet.end_of_rib(), Some(AfiSafi::L2VPN_VPLS));
        assert!(packet.to_string().contains("EoR: L2VPN/VPLS"));
    }

    #[test]
    fn truncated_attribute_section() {
        let mut msg = Vec::new();
        msg.extend_from_slice(&[0xff; 16]);
        msg.extend_from_slice(&[0, 27, 2]);
        msg.extend_from_slice(&[0, 0, 0, 8]);
        msg.extend_from_slice(&[0x40, 0x01, 0x01, 0x00]);
        let err = UpdatePacket::parse_packet(&msg, &nego()).unwrap_err();
        assert!(matches!(err, BgpError::MalformedLength { .. }));
    }

    #[test]
    fn bad_vpls_length_notifies() {
        let reach = hex!(
            "80 0E 1C 0019 41 04 AC1E0504 00"
            "0010 0001AC1E0504000D 0003 0001 0008 400011"
        );
        let mut msg = Vec::new();
        msg.extend_from_slice(&[0xff; 16]);
        msg.extend_from_slice(&((23 + reach.len()) as u16).to_be_bytes());
        msg.push(2);
        msg.extend_from_slice(&[0, 0]);
        msg.extend_from_slice(&(reach.len() as u16).to_be_bytes());
        msg.extend_from_slice(&reach);

        let err = UpdatePacket::parse_packet(&msg, &nego()).unwrap_err();
        assert!(matches!(
            err,
            BgpError::AttributeParseError {
                attr_type: AttrType::MpReachNlri,
                ..
            }
        ));
        let notification = NotificationPacket::from_error(&err).unwrap();
        assert_eq!(notification.sub_code, 10);
    }

    #[test]
    fn not_an_update() {
        let mut msg = vec![0xff; 16];
        msg.extend_from_slice(&[0, 19, 4]);
        assert!(UpdatePacket::parse_packet(&msg, &nego()).is_err());
    }
}
