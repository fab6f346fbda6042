use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{AfiSafi, BGP_EXTENDED_PACKET_LEN, BGP_PACKET_LEN};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Direct {
    pub recv: bool,
    pub send: bool,
}

impl Direct {
    pub fn both() -> Self {
        Self {
            recv: true,
            send: true,
        }
    }
}

/// Outcome of capability negotiation with one peer, as far as the UPDATE
/// codec is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Negotiated {
    // Largest message the peer accepts, 4096 or 65535 with RFC 8654.
    pub max_size: usize,
    // AS4
    pub as4: bool,
    // Multiprotocol families both ends announced.
    pub families: BTreeSet<AfiSafi>,
    // AddPath
    pub addpath: BTreeMap<AfiSafi, Direct>,
}

impl Default for Negotiated {
    fn default() -> Self {
        Self {
            max_size: BGP_PACKET_LEN,
            as4: false,
            families: BTreeSet::from([AfiSafi::IPV4_UNICAST]),
            addpath: BTreeMap::new(),
        }
    }
}

impl Negotiated {
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_extended_message(self) -> Self {
        self.with_max_size(BGP_EXTENDED_PACKET_LEN)
    }

    pub fn with_as4(mut self, as4: bool) -> Self {
        self.as4 = as4;
        self
    }

    pub fn with_family(mut self, afi_safi: AfiSafi) -> Self {
        self.families.insert(afi_safi);
        self
    }

    pub fn with_addpath(mut self, afi_safi: AfiSafi, direct: Direct) -> Self {
        self.addpath.insert(afi_safi, direct);
        self
    }

    pub fn has_family(&self, afi_safi: &AfiSafi) -> bool {
        self.families.contains(afi_safi)
    }

    pub fn is_add_path_recv(&self, afi_safi: &AfiSafi) -> bool {
        self.addpath.get(afi_safi).is_some_and(|direct| direct.recv)
    }

    pub fn is_add_path_send(&self, afi_safi: &AfiSafi) -> bool {
        self.addpath.get(afi_safi).is_some_and(|direct| direct.send)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let nego = Negotiated::default();
        assert_eq!(nego.max_size, 4096);
        assert!(nego.has_family(&AfiSafi::IPV4_UNICAST));
        assert!(!nego.has_family(&AfiSafi::L2VPN_VPLS));
        assert!(!nego.is_add_path_send(&AfiSafi::IPV4_UNICAST));
    }

    #[test]
    fn builder() {
        let nego = Negotiated::default()
            .with_extended_message()
            .with_as4(true)
            .with_family(AfiSafi::L2VPN_VPLS)
            .with_addpath(
                AfiSafi::L2VPN_VPLS,
                Direct {
                    recv: false,
                    send: true,
                },
            );
        assert_eq!(nego.max_size, 65535);
        assert!(nego.as4);
        assert!(nego.is_add_path_send(&AfiSafi::L2VPN_VPLS));
        assert!(!nego.is_add_path_recv(&AfiSafi::L2VPN_VPLS));
    }
}
