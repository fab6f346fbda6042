use std::net::IpAddr;

use bgp_update::*;
use bytes::{Bytes, BytesMut};
use hex_literal::hex;

const ATTRS: [u8; 11] = hex!("40 01 01 00 40 03 04 c0000201");

fn vpls(ve_id: u16) -> Nlri {
    let rd = RouteDistinguisher::asn(65000, ve_id as u32 / 7);
    Nlri::L2vpnVpls(L2vpnNlri::new(rd, 800000 + ve_id as u32, 0, 8, ve_id).with_id(ve_id as u32))
}

fn v4(n: u16) -> Nlri {
    let prefix = format!("10.{}.{}.0/24", n >> 8, n & 0xff);
    Nlri::Ipv4Unicast(Ipv4Nlri::new(prefix.parse().unwrap()).with_id(n as u32))
}

fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    for n in 1..=300 {
        routes.push(Route::new(vpls(n)));
        routes.push(Route::new(v4(n)));
    }
    routes
}

fn sorted(mut nlris: Vec<Nlri>) -> Vec<Nlri> {
    nlris.sort_by_key(|n| format!("{n:?}"));
    nlris
}

fn check_messages(msgs: &[BytesMut], nego: &Negotiated, attrs: &[u8]) -> Vec<UpdatePacket> {
    let budget = nego.max_size - BGP_UPDATE_MIN_LEN - attrs.len();
    msgs.iter()
        .map(|msg| {
            assert!(msg.len() <= nego.max_size);
            assert_eq!(peek_bgp_length(msg), msg.len());
            let (rest, packet) = UpdatePacket::parse_packet(msg, nego).unwrap();
            assert!(rest.is_empty());
            assert_eq!(&packet.attrs[..], attrs);

            // Bytes taken by the decoded routes, counted from what came back.
            let addpath = nego.is_add_path_recv(&AfiSafi::IPV4_UNICAST);
            let classic: usize = packet
                .ipv4_withdraw
                .iter()
                .chain(packet.ipv4_update.iter())
                .map(|n| n.len(addpath))
                .sum();
            let mp: usize = packet
                .mp_update
                .iter()
                .map(|a| a.attr_bytes().len())
                .chain(packet.mp_withdraw.iter().map(|a| a.attr_bytes().len()))
                .sum();
            let used = classic + mp;
            assert!(used > 0);
            assert!(used <= budget, "{used} > {budget}");
            assert_eq!(used, msg.len() - BGP_UPDATE_MIN_LEN - attrs.len());
            packet
        })
        .collect()
}

#[test]
pub fn announce_fragments_without_loss() {
    for max_size in [256, 1024, BGP_PACKET_LEN] {
        for addpath in [false, true] {
            let mut nego = Negotiated::default()
                .with_max_size(max_size)
                .with_family(AfiSafi::L2VPN_VPLS);
            if addpath {
                nego = nego
                    .with_addpath(AfiSafi::L2VPN_VPLS, Direct::both())
                    .with_addpath(AfiSafi::IPV4_UNICAST, Direct::both());
            }
            let nh: IpAddr = "192.0.2.1".parse().unwrap();
            let mut update = Update::new(Bytes::from_static(&ATTRS), Some(nh));
            update.routes = routes();
            if !addpath {
                for route in update.routes.iter_mut() {
                    route.nlri = match &route.nlri {
                        Nlri::L2vpnVpls(v) => Nlri::L2vpnVpls(v.clone().with_id(0)),
                        Nlri::Ipv4Unicast(v) => Nlri::Ipv4Unicast(v.clone().with_id(0)),
                        other => other.clone(),
                    };
                }
            }

            let msgs: Vec<BytesMut> = update.announce(&nego).collect::<Result<_, _>>().unwrap();
            assert!(msgs.len() > 1 || max_size == BGP_PACKET_LEN);
            let packets = check_messages(&msgs, &nego, &ATTRS);

            let mut got = Vec::new();
            for packet in packets.iter() {
                assert_eq!(&packet.attrs[..], &ATTRS[..]);
                for route in packet.routes() {
                    assert_eq!(route.nexthop, Some(nh));
                    got.push(route.nlri);
                }
            }
            let sent: Vec<Nlri> = update.routes.iter().map(|r| r.nlri.clone()).collect();
            assert_eq!(sorted(got), sorted(sent), "max_size {max_size} addpath {addpath}");
        }
    }
}

#[test]
pub fn withdraw_fragments_without_loss() {
    let nego = Negotiated::default()
        .with_max_size(512)
        .with_family(AfiSafi::L2VPN_VPLS)
        .with_addpath(AfiSafi::L2VPN_VPLS, Direct::both())
        .with_addpath(AfiSafi::IPV4_UNICAST, Direct::both());
    let update = Update::default().with_routes(routes());

    let msgs: Vec<BytesMut> = update.withdraw(&nego).collect::<Result<_, _>>().unwrap();
    let packets = check_messages(&msgs, &nego, &[]);

    // IPv4 entries go first, each message holds one kind before the switch.
    let first_mp = packets
        .iter()
        .position(|p| !p.mp_withdraw.is_empty())
        .unwrap();
    assert!(packets[..first_mp].iter().all(|p| p.mp_withdraw.is_empty()));
    assert!(packets[first_mp + 1..].iter().all(|p| p.ipv4_withdraw.is_empty()));

    let got: Vec<Nlri> = packets.iter().flat_map(|p| p.withdraws()).collect();
    let sent: Vec<Nlri> = update.routes.iter().map(|r| r.nlri.clone()).collect();
    assert_eq!(got.len(), sent.len());
    assert_eq!(sorted(got), sorted(sent));
}

#[test]
pub fn extended_message_packs_everything_once() {
    let nego = Negotiated::default()
        .with_extended_message()
        .with_family(AfiSafi::L2VPN_VPLS);
    let update = Update::default().with_routes((1..=1000).map(|n| Route::new(vpls(n))));
    let msgs: Vec<BytesMut> = update.withdraw(&nego).collect::<Result<_, _>>().unwrap();
    // 1000 entries of 23 bytes coalesce into a single attribute.
    assert_eq!(msgs.len(), 1);
    let (_, packet) = UpdatePacket::parse_packet(&msgs[0], &nego).unwrap();
    assert_eq!(packet.mp_withdraw.len(), 1);
    assert_eq!(packet.mp_withdraw[0].withdraws.len(), 1000);
}

#[test]
pub fn scenario_withdraw_split() {
    let update = Update::default()
        .with_route(Route::new(Nlri::Ipv4Unicast(Ipv4Nlri::new(
            "192.168.1.0/24".parse().unwrap(),
        ))))
        .with_route(Route::new(vpls(3)));

    let large = Negotiated::default()
        .with_max_size(4096)
        .with_family(AfiSafi::L2VPN_VPLS);
    assert_eq!(update.withdraw(&large).count(), 1);

    // Withdraw of one /24 (4 bytes) and one VPLS entry (25 bytes as an
    // attribute, addpath off) in a 28 byte budget.
    let update = Update::default()
        .with_route(Route::new(Nlri::Ipv4Unicast(Ipv4Nlri::new(
            "192.168.1.0/24".parse().unwrap(),
        ))))
        .with_route(Route::new(L2vpnNlri::new(
            "65000:1".parse().unwrap(),
            1000,
            0,
            8,
            3,
        )));
    let small = large.clone().with_max_size(BGP_UPDATE_MIN_LEN + 28);
    let msgs: Vec<BytesMut> = update.withdraw(&small).collect::<Result<_, _>>().unwrap();
    assert_eq!(msgs.len(), 2);
    let (_, first) = UpdatePacket::parse_packet(&msgs[0], &small).unwrap();
    assert_eq!(first.ipv4_withdraw.len(), 1);
    assert!(first.mp_withdraw.is_empty());
    let (_, second) = UpdatePacket::parse_packet(&msgs[1], &small).unwrap();
    assert_eq!(second.mp_withdraw[0].withdraws.len(), 1);
}

#[test]
pub fn oversize_entry_notification() {
    let nego = Negotiated::default()
        .with_max_size(BGP_UPDATE_MIN_LEN + 10)
        .with_family(AfiSafi::L2VPN_VPLS);
    let update = Update::default().with_route(Route::new(vpls(1)));
    let results: Vec<Result<BytesMut, BgpError>> = update.withdraw(&nego).collect();
    assert_eq!(results.len(), 1);
    let err = results[0].as_ref().unwrap_err();
    assert!(err.is_fatal());

    let notification = NotificationPacket::from_error(err).unwrap();
    assert_eq!(notification.code, NotifyCode::Cease);
    assert_eq!(notification.sub_code, 0);
    let buf: BytesMut = notification.into();
    assert_eq!(buf[18], 3);
    assert_eq!(&buf[19..21], &[6, 0]);
    assert_eq!(peek_bgp_length(&buf), buf.len());
}

#[test]
pub fn negotiated_from_json() {
    let nego: Negotiated = serde_json::from_str(
        r#"{
            "max_size": 65535,
            "families": ["ipv4-unicast", "l2vpn-vpls"],
            "addpath": {"l2vpn-vpls": {"send": true}}
        }"#,
    )
    .unwrap();
    assert_eq!(nego.max_size, BGP_EXTENDED_PACKET_LEN);
    assert!(!nego.as4);
    assert!(nego.has_family(&AfiSafi::L2VPN_VPLS));
    assert!(nego.is_add_path_send(&AfiSafi::L2VPN_VPLS));
    assert!(!nego.is_add_path_recv(&AfiSafi::L2VPN_VPLS));

    let json = serde_json::to_string(&nego).unwrap();
    let back: Negotiated = serde_json::from_str(&json).unwrap();
    assert_eq!(back, nego);
}

#[test]
pub fn negotiated_defaults_from_empty_json() {
    let nego: Negotiated = serde_json::from_str("{}").unwrap();
    assert_eq!(nego, Negotiated::default());
}
