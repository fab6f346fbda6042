use bgp_update::*;
use hex_literal::hex;

fn nego() -> Negotiated {
    Negotiated::default().with_family(AfiSafi::L2VPN_VPLS)
}

#[test]
pub fn parse_juniper_vpls_update() {
    const PACKET: &[u8] = &hex!(
        "
ff ff ff ff ff ff ff ff ff ff ff ff ff ff ff ff
00 57 02 00 00 00 40 40 01 01 00 40 02 00 40 05
04 00 00 00 64 c0 10 10 00 02 d5 3f 00 00 00 06
80 0a 13 00 00 00 00 64 80 0e 1c 00 19 41 04 ac
1e 05 04 00 00 11 00 01 ac 1e 05 04 00 0d 00 03
00 01 00 08 40 00 11
"
    );
    let (rest, packet) = UpdatePacket::parse_packet(PACKET, &nego()).unwrap();
    assert!(rest.is_empty());
    assert_eq!(packet.header.length as usize, PACKET.len());
    assert!(packet.ipv4_update.is_empty());
    assert!(packet.ipv4_withdraw.is_empty());

    let ext_com = packet.ext_com.as_ref().unwrap();
    assert_eq!(ext_com.0.len(), 2);
    let ExtCommunityValue::L2Info(l2info) = &ext_com.0[1] else {
        panic!("second community must be l2info");
    };
    assert_eq!(l2info.encaps_type(), Some(L2Encaps::Vpls));
    assert!(l2info.control_flags().is_empty());
    assert_eq!(l2info.preference, 100);

    assert_eq!(packet.mp_update.len(), 1);
    let reach = &packet.mp_update[0];
    assert_eq!(reach.afi_safi, AfiSafi::L2VPN_VPLS);
    assert_eq!(reach.nexthop, Some("172.30.5.4".parse().unwrap()));
    assert_eq!(
        reach.updates,
        vec![Nlri::L2vpnVpls(L2vpnNlri::new(
            RouteDistinguisher::ip("172.30.5.4".parse().unwrap(), 13),
            262145,
            1,
            8,
            3
        ))]
    );
}

#[test]
pub fn l2vpn_nlri_fixture() {
    let (nlri, consumed) = Nlri::parse(
        AfiSafi::L2VPN_VPLS,
        &hex!("0011 0001 AC1E 0504 000D 0003 0001 0008 4000 11"),
        false,
    )
    .unwrap();
    assert_eq!(consumed, 19);
    let Nlri::L2vpnVpls(vpls) = &nlri else {
        panic!("expected VPLS NLRI");
    };
    assert_eq!(vpls.rd.to_string(), "172.30.5.4:13");
    assert_eq!(vpls.label_base, 262145);
    assert_eq!(vpls.block_offset, 1);
    assert_eq!(vpls.block_size, 8);
    assert_eq!(vpls.ve_id, 3);

    // The low nibble of the label field is zero on the way out.
    assert_eq!(
        &nlri.pack(false)[..],
        &hex!("0011 0001 AC1E 0504 000D 0003 0001 0008 4000 10")
    );
}

#[test]
pub fn l2vpn_nlri_bad_length() {
    let err = Nlri::parse(
        AfiSafi::L2VPN_VPLS,
        &hex!("0012 0001 AC1E 0504 000D 0003 0001 0008 4000 11 00"),
        false,
    )
    .unwrap_err();
    assert!(matches!(err, BgpError::MalformedNlri(_)));
}

#[test]
pub fn l2info_fixture() {
    let value = ExtCommunityValue::from_bytes(&hex!("800A 1300 0000 0064")).unwrap();
    assert_eq!(value.to_string(), "l2info:19:0:0:100");

    let parsed: ExtCommunityValue = "l2info:19:0:0:100".parse().unwrap();
    assert_eq!(parsed.to_bytes(), hex!("800A 1300 0000 0064"));
}

#[test]
pub fn community_text_round_trip() {
    for bytes in [
        hex!("0002 FDE8 0000 0064"),
        hex!("0102 0A00 0001 0005"),
        hex!("0003 FDE8 0000 0001"),
        hex!("800A 1303 05DC 0064"),
        hex!("0202 0000 FDE8 0064"),
    ] {
        let value = ExtCommunityValue::from_bytes(&bytes).unwrap();
        let parsed: ExtCommunityValue = value.to_string().parse().unwrap();
        assert_eq!(parsed.to_bytes(), bytes, "{value}");
    }
}

#[test]
pub fn route_distinguisher_round_trip() {
    for text in ["65000:100", "10.0.0.1:5", "0:0"] {
        let rd: RouteDistinguisher = text.parse().unwrap();
        let back = RouteDistinguisher::from_bytes(&rd.to_bytes()).unwrap();
        assert_eq!(back, rd);
        assert_eq!(back.to_string(), text);
    }
}

#[test]
pub fn end_of_rib_markers() {
    const IPV4_EOR: &[u8] = &hex!("ffffffffffffffffffffffffffffffff 0017 02 0000 0000");
    let (_, packet) = UpdatePacket::parse_packet(IPV4_EOR, &nego()).unwrap();
    assert_eq!(packet.end_of_rib(), Some(AfiSafi::IPV4_UNICAST));
    assert_eq!(&end_of_rib(AfiSafi::IPV4_UNICAST).unwrap()[..], IPV4_EOR);

    const VPLS_EOR: &[u8] =
        &hex!("ffffffffffffffffffffffffffffffff 001d 02 0000 0006 800f03 0019 41");
    let (_, packet) = UpdatePacket::parse_packet(VPLS_EOR, &nego()).unwrap();
    assert_eq!(packet.end_of_rib(), Some(AfiSafi::L2VPN_VPLS));
    assert_eq!(&end_of_rib(AfiSafi::L2VPN_VPLS).unwrap()[..], VPLS_EOR);
}

#[test]
pub fn unknown_family_is_skipped() {
    // MP_UNREACH_NLRI for L2VPN EVPN next to an IPv4 prefix.
    const PACKET: &[u8] = &hex!(
        "ffffffffffffffffffffffffffffffff 0021 02"
        "0004 18 0a0000"
        "0006 800f03 0019 46"
    );
    let (_, packet) = UpdatePacket::parse_packet(PACKET, &nego()).unwrap();
    assert!(packet.mp_withdraw.is_empty());
    assert_eq!(packet.withdraws().len(), 1);
    assert_eq!(packet.withdraws()[0].to_string(), "10.0.0.0/24");
}

#[test]
pub fn unsupported_end_of_rib_is_not_ipv4() {
    // Empty MP_UNREACH_NLRI for L2VPN EVPN.
    const PACKET: &[u8] =
        &hex!("ffffffffffffffffffffffffffffffff 001d 02 0000 0006 800f03 0019 46");
    let (rest, packet) = UpdatePacket::parse_packet(PACKET, &nego()).unwrap();
    assert!(rest.is_empty());
    assert!(packet.mp_withdraw.is_empty());
    assert_eq!(packet.mp_skipped, vec![AfiSafi::new(Afi::L2vpn, Safi::Evpn)]);
    assert_eq!(packet.end_of_rib(), None);
}
