use fixedbuf::FixedBufError;
use thiserror::Error;

use crate::{AfiSafi, AttrType, CeaseError, NotifyCode, UpdateError};

#[derive(Error, Debug, PartialEq)]
pub enum BgpError {
    #[error("Malformed length: expected {expected}, got {actual}")]
    MalformedLength { expected: usize, actual: usize },

    #[error("Malformed NLRI: {0}")]
    MalformedNlri(String),

    #[error("Invalid extended community format: {0}")]
    InvalidCommunityFormat(String),

    #[error("Invalid route distinguisher: {0}")]
    InvalidRouteDistinguisher(String),

    #[error("Entry of {size} bytes does not fit in a message budget of {budget} bytes")]
    OversizeEntry { size: usize, budget: usize },

    #[error("Failed to parse BGP attribute {attr_type:?}: {source}")]
    AttributeParseError {
        attr_type: AttrType,
        #[source]
        source: Box<BgpError>,
    },

    #[error("Unsupported address family {0}")]
    UnknownAfiSafi(AfiSafi),

    #[error("Header length is smaller than expected: got {actual}, expected {expected}")]
    InvalidHeaderLength { expected: usize, actual: usize },

    #[error("Nom parsing error: {0}")]
    NomError(String),

    #[error("Incomplete data: need {needed} more bytes")]
    IncompleteData { needed: usize },

    #[error(transparent)]
    Buffer(#[from] FixedBufError),
}

impl BgpError {
    /// NOTIFICATION code and subcode the session layer sends for this error.
    ///
    /// Local failures which never come from the wire return `None`.
    pub fn notify(&self) -> Option<(NotifyCode, u8)> {
        use BgpError::*;
        match self {
            OversizeEntry { .. } | Buffer(_) => {
                Some((NotifyCode::Cease, CeaseError::Unspecific.into()))
            }
            MalformedNlri(_) | UnknownAfiSafi(_) => Some((
                NotifyCode::UpdateMsgError,
                UpdateError::InvalidNetworkField.into(),
            )),
            AttributeParseError { source, .. } => source.notify(),
            MalformedLength { .. } => Some((
                NotifyCode::UpdateMsgError,
                UpdateError::AttributeLengthError.into(),
            )),
            InvalidHeaderLength { .. } => Some((NotifyCode::MsgHeaderError, 2)),
            NomError(_) | IncompleteData { .. } => Some((
                NotifyCode::UpdateMsgError,
                UpdateError::MalformedAttributeList.into(),
            )),
            InvalidCommunityFormat(_) | InvalidRouteDistinguisher(_) => None,
        }
    }

    /// True for the one condition that must tear the session down.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BgpError::OversizeEntry { .. })
    }
}

impl From<nom::Err<BgpError>> for BgpError {
    fn from(err: nom::Err<BgpError>) -> Self {
        match err {
            nom::Err::Incomplete(needed) => {
                let needed_bytes = match needed {
                    nom::Needed::Unknown => 0,
                    nom::Needed::Size(size) => size.get(),
                };
                BgpError::IncompleteData {
                    needed: needed_bytes,
                }
            }
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
        }
    }
}

impl<I> nom::error::ParseError<I> for BgpError {
    fn from_error_kind(_input: I, kind: nom::error::ErrorKind) -> Self {
        BgpError::NomError(format!("Parse error: {:?}", kind))
    }

    fn append(_input: I, kind: nom::error::ErrorKind, other: Self) -> Self {
        match other {
            BgpError::NomError(msg) => BgpError::NomError(format!("{}, {:?}", msg, kind)),
            _ => other,
        }
    }
}

/// Shorthand for returning a typed failure from inside a nom parser.
///
/// Raised as `Failure` so that `many0` style combinators stop and surface it
/// instead of treating it as the end of the list.
pub(crate) fn fail<T>(err: BgpError) -> Result<T, nom::Err<BgpError>> {
    Err(nom::Err::Failure(err))
}
