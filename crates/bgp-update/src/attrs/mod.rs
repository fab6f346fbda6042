pub mod attr;
pub use attr::*;

pub mod flags;
pub use flags::*;

pub mod emitter;
pub use emitter::*;

pub mod rd;
pub use rd::*;

pub mod ext_com;
pub use ext_com::*;

pub mod ext_com_type;
pub use ext_com_type::*;

pub mod nlri;
pub use nlri::*;

pub mod nlri_ipv4;
pub use nlri_ipv4::*;

pub mod nlri_ipv6;
pub use nlri_ipv6::*;

pub mod nlri_l2vpn;
pub use nlri_l2vpn::*;

pub mod mp_chunk;
pub use mp_chunk::{MpBuilder, MpChunk, mp_coalesce};

pub mod mp_reach;
pub use mp_reach::*;

pub mod mp_unreach;
pub use mp_unreach::*;
