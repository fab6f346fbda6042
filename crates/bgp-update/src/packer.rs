use bytes::BytesMut;
use fixedbuf::FixedBuf;

use crate::{
    AfiSafi, AfiSafis, BGP_EXTENDED_PACKET_LEN, BGP_HEADER_LEN, BGP_UPDATE_MIN_LEN, BgpError,
    BgpHeader, BgpType, MpBuilder, MpChunk, MpReachBuilder, MpUnreachBuilder, Negotiated, Nlri,
    Route, Update, bgp_debug, bgp_error, bgp_trace, mp_coalesce,
};

/// Offset of the message length in the BGP header.
const LENGTH_POS: usize = 16;

/// Assembles one UPDATE inside `max_size` bytes.
pub fn update_message(
    max_size: usize,
    withdrawn: &[u8],
    attrs: &[&[u8]],
    nlri: &[u8],
) -> Result<BytesMut, BgpError> {
    let mut buf = FixedBuf::new(max_size);
    let header: BytesMut = BgpHeader::new(BgpType::Update, BGP_HEADER_LEN).into();
    buf.put_slice(&header[..])?;

    // Withdrawn routes.
    buf.put_u16(withdrawn.len() as u16)?;
    buf.put_slice(withdrawn)?;

    // Attributes length.
    let attr_len_pos = buf.len();
    buf.put_u16(0u16)?; // Placeholder
    for attr in attrs {
        buf.put_slice(attr)?;
    }
    let attr_len: u16 = (buf.len() - attr_len_pos - 2) as u16;
    buf.put_u16_at(attr_len_pos, attr_len)?;

    // NLRI.
    buf.put_slice(nlri)?;

    let length: u16 = buf.len() as u16;
    buf.put_u16_at(LENGTH_POS, length)?;

    Ok(buf.into_inner())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackMode {
    Announce,
    Withdraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Mp,
    Direct,
    Flush,
}

const ANNOUNCE_STAGES: &[Stage] = &[Stage::Mp, Stage::Direct, Stage::Flush];
const WITHDRAW_STAGES: &[Stage] = &[Stage::Direct, Stage::Mp, Stage::Flush];

/// Lazily splits an [`Update`] into UPDATE messages no larger than the
/// negotiated size.
///
/// Entries are added greedily. When the next one does not fit, the pending
/// message is emitted and the entry starts the next one. An entry which does
/// not fit in an empty message yields [`BgpError::OversizeEntry`] and ends
/// the sequence.
#[derive(Debug, Clone)]
pub struct UpdatePacker<'a> {
    mode: PackMode,
    max_size: usize,
    budget: usize,
    attrs: &'a [u8],
    stages: &'static [Stage],
    stage: usize,
    // Multiprotocol families, one builder each.
    mp: std::vec::IntoIter<MpBuilder<'a>>,
    current: Option<MpBuilder<'a>>,
    // IPv4 entries for the classic sections.
    direct: std::vec::IntoIter<&'a Nlri>,
    direct_addpath: bool,
    pending_mp: Vec<MpChunk>,
    mp_len: usize,
    pending_direct: BytesMut,
}

impl<'a> UpdatePacker<'a> {
    pub fn announce(update: &'a Update, nego: &Negotiated) -> Self {
        let mut direct = Vec::new();
        let mut mp: AfiSafis<Vec<&'a Route>> = AfiSafis::new();

        for route in update.routes.iter() {
            let afi_safi = route.nlri.afi_safi();
            if !nego.has_family(&afi_safi) {
                bgp_debug!(%afi_safi, nlri = %route.nlri, "family not negotiated, route dropped");
                continue;
            }
            let nexthop_match = route.nexthop.is_none() || route.nexthop == update.nexthop;
            if afi_safi.is_classic() && nexthop_match {
                direct.push(&route.nlri);
            } else {
                mp.entry(afi_safi).push(route);
            }
        }

        let builders = mp
            .into_iter()
            .map(|(afi_safi, routes)| {
                MpBuilder::Reach(MpReachBuilder::new(
                    afi_safi,
                    routes,
                    update.nexthop,
                    nego.is_add_path_send(&afi_safi),
                ))
            })
            .collect();

        let max_size = nego.max_size.min(BGP_EXTENDED_PACKET_LEN);
        let budget = max_size.saturating_sub(BGP_UPDATE_MIN_LEN + update.attrs.len());
        Self::new(
            PackMode::Announce,
            max_size,
            budget,
            &update.attrs[..],
            builders,
            direct,
            nego.is_add_path_send(&AfiSafi::IPV4_UNICAST),
        )
    }

    pub fn withdraw(update: &'a Update, nego: &Negotiated) -> Self {
        let mut direct = Vec::new();
        let mut mp: AfiSafis<Vec<&'a Nlri>> = AfiSafis::new();

        for route in update.routes.iter() {
            let afi_safi = route.nlri.afi_safi();
            if !nego.has_family(&afi_safi) {
                bgp_debug!(%afi_safi, nlri = %route.nlri, "family not negotiated, withdraw dropped");
                continue;
            }
            if afi_safi.is_classic() {
                direct.push(&route.nlri);
            } else {
                mp.entry(afi_safi).push(&route.nlri);
            }
        }

        let builders = mp
            .into_iter()
            .map(|(afi_safi, withdraws)| {
                MpBuilder::Unreach(MpUnreachBuilder::new(
                    afi_safi,
                    withdraws,
                    nego.is_add_path_send(&afi_safi),
                ))
            })
            .collect();

        let max_size = nego.max_size.min(BGP_EXTENDED_PACKET_LEN);
        let budget = max_size.saturating_sub(BGP_UPDATE_MIN_LEN);
        Self::new(
            PackMode::Withdraw,
            max_size,
            budget,
            &[],
            builders,
            direct,
            nego.is_add_path_send(&AfiSafi::IPV4_UNICAST),
        )
    }

    fn new(
        mode: PackMode,
        max_size: usize,
        budget: usize,
        attrs: &'a [u8],
        mp: Vec<MpBuilder<'a>>,
        direct: Vec<&'a Nlri>,
        direct_addpath: bool,
    ) -> Self {
        let stages = match mode {
            PackMode::Announce => ANNOUNCE_STAGES,
            PackMode::Withdraw => WITHDRAW_STAGES,
        };
        Self {
            mode,
            max_size,
            budget,
            attrs,
            stages,
            stage: 0,
            mp: mp.into_iter(),
            current: None,
            direct: direct.into_iter(),
            direct_addpath,
            pending_mp: Vec::new(),
            mp_len: 0,
            pending_direct: BytesMut::new(),
        }
    }

    pub fn mode(&self) -> PackMode {
        self.mode
    }

    /// Bytes available to NLRI and multiprotocol attributes per message.
    pub fn budget(&self) -> usize {
        self.budget
    }

    fn pending_len(&self) -> usize {
        self.mp_len + self.pending_direct.len()
    }

    fn next_chunk(&mut self) -> Option<MpChunk> {
        loop {
            if let Some(chunk) = self.current.as_mut().and_then(|builder| builder.next()) {
                return Some(chunk);
            }
            let builder = self.mp.next()?;
            bgp_trace!(afi_safi = %builder.afi_safi(), "packing family");
            self.current = Some(builder);
        }
    }

    // Emits the pending message when `size` more bytes would overflow it.
    fn make_room(&mut self, size: usize) -> Result<Option<BytesMut>, BgpError> {
        let pending = self.pending_len();
        if pending + size <= self.budget {
            return Ok(None);
        }
        if pending == 0 {
            bgp_error!(
                size,
                budget = self.budget,
                "entry does not fit in an empty UPDATE"
            );
            return Err(BgpError::OversizeEntry {
                size,
                budget: self.budget,
            });
        }
        self.flush().map(Some)
    }

    fn push_mp(&mut self, chunk: MpChunk) -> Result<Option<BytesMut>, BgpError> {
        let msg = self.make_room(chunk.len())?;
        self.mp_len += chunk.len();
        self.pending_mp.push(chunk);
        Ok(msg)
    }

    fn push_direct(&mut self, nlri: BytesMut) -> Result<Option<BytesMut>, BgpError> {
        let msg = self.make_room(nlri.len())?;
        self.pending_direct.extend_from_slice(&nlri);
        Ok(msg)
    }

    fn flush(&mut self) -> Result<BytesMut, BgpError> {
        let mut mp = BytesMut::with_capacity(self.mp_len);
        mp_coalesce(&mut mp, &self.pending_mp);

        let msg = match self.mode {
            PackMode::Announce => update_message(
                self.max_size,
                &[],
                &[self.attrs, &mp[..]],
                &self.pending_direct,
            )?,
            PackMode::Withdraw => {
                update_message(self.max_size, &self.pending_direct, &[&mp[..]], &[])?
            }
        };
        bgp_trace!(
            mode = ?self.mode,
            len = msg.len(),
            mp = self.pending_mp.len(),
            "UPDATE packed"
        );

        self.pending_mp.clear();
        self.mp_len = 0;
        self.pending_direct.clear();
        Ok(msg)
    }

    fn step(&mut self, stage: Stage) -> Result<Option<BytesMut>, BgpError> {
        match stage {
            Stage::Mp => match self.next_chunk() {
                Some(chunk) => self.push_mp(chunk),
                None => {
                    self.stage += 1;
                    Ok(None)
                }
            },
            Stage::Direct => match self.direct.next() {
                Some(nlri) => {
                    let packed = nlri.pack(self.direct_addpath);
                    self.push_direct(packed)
                }
                None => {
                    self.stage += 1;
                    Ok(None)
                }
            },
            Stage::Flush => {
                self.stage += 1;
                if self.pending_len() == 0 {
                    return Ok(None);
                }
                self.flush().map(Some)
            }
        }
    }
}

impl Iterator for UpdatePacker<'_> {
    type Item = Result<BytesMut, BgpError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&stage) = self.stages.get(self.stage) {
            match self.step(stage) {
                Ok(Some(msg)) => return Some(Ok(msg)),
                Ok(None) => continue,
                Err(err) => {
                    // Nothing follows an error.
                    self.stage = self.stages.len();
                    return Some(Err(err));
                }
            }
        }
        None
    }
}

impl std::iter::FusedIterator for UpdatePacker<'_> {}
