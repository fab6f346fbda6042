pub mod tracing;

pub mod packet;
pub use packet::*;

pub mod notification;
pub use notification::*;

pub mod update;
pub use update::*;

pub mod packer;
pub use packer::*;

pub mod negotiated;
pub use negotiated::*;

pub mod afi;
pub use afi::*;

pub mod attrs;
pub use attrs::*;

pub mod error;
pub use error::*;

pub mod label;
pub use label::*;

pub mod many0;
pub use many0::many0_complete;

pub mod parse_be;
pub use parse_be::{ParseBe, ParseNlri, ParseResult};
