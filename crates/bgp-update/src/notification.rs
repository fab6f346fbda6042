use std::fmt::Display;

use bytes::{BufMut, BytesMut};

use crate::{BGP_HEADER_LEN, BgpError, BgpHeader, BgpType};

/// NOTIFICATION handed to the session layer when encoding or decoding an
/// UPDATE fails. The codec builds it; sending and teardown happen elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPacket {
    pub header: BgpHeader,
    pub code: NotifyCode,
    pub sub_code: u8,
    pub data: Vec<u8>,
}

impl Display for NotificationPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Notification")?;
        writeln!(f, " Code: {}", self.code)?;
        writeln!(
            f,
            " Sub Code: {}",
            notify_sub_code_str(self.code, self.sub_code)
        )
    }
}

#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NotifyCode {
    MsgHeaderError = 1,
    OpenMsgError = 2,
    UpdateMsgError = 3,
    HoldTimerExpired = 4,
    FsmError = 5,
    Cease = 6,
    RouteRefreshError = 7,
    SendHoldTimeError = 8,
    Unknown(u8),
}

impl From<NotifyCode> for u8 {
    fn from(code: NotifyCode) -> Self {
        use NotifyCode::*;
        match code {
            MsgHeaderError => 1,
            OpenMsgError => 2,
            UpdateMsgError => 3,
            HoldTimerExpired => 4,
            FsmError => 5,
            Cease => 6,
            RouteRefreshError => 7,
            SendHoldTimeError => 8,
            Unknown(v) => v,
        }
    }
}

impl From<u8> for NotifyCode {
    fn from(code: u8) -> Self {
        use NotifyCode::*;
        match code {
            1 => MsgHeaderError,
            2 => OpenMsgError,
            3 => UpdateMsgError,
            4 => HoldTimerExpired,
            5 => FsmError,
            6 => Cease,
            7 => RouteRefreshError,
            8 => SendHoldTimeError,
            v => Unknown(v),
        }
    }
}

impl Display for NotifyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use NotifyCode::*;
        match self {
            MsgHeaderError => write!(f, "MsgHeaderError"),
            OpenMsgError => write!(f, "OpenMsgError"),
            UpdateMsgError => write!(f, "UpdateMsgError"),
            HoldTimerExpired => write!(f, "HoldTimerExpired"),
            FsmError => write!(f, "FsmError"),
            Cease => write!(f, "Cease"),
            RouteRefreshError => write!(f, "RouteRefreshError"),
            SendHoldTimeError => write!(f, "SendHoldTimeError"),
            Unknown(v) => write!(f, "Unknown {}", v),
        }
    }
}

fn notify_sub_code_str(code: NotifyCode, sub_code: u8) -> String {
    use NotifyCode::*;
    match code {
        UpdateMsgError => sub_update_error_str(sub_code.into()),
        Cease => sub_cease_error_str(sub_code.into()),
        _ => format!("{}", sub_code),
    }
}

#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UpdateError {
    MalformedAttributeList = 1,
    UnrecognizedWellknownAttribute = 2,
    MissingWellknownAttribute = 3,
    AttributeFlagsError = 4,
    AttributeLengthError = 5,
    InvalidOriginAttribute = 6,
    // [Deprecated] = 7,
    InvalidNexthopAttribute = 8,
    OptionalAttributeError = 9,
    InvalidNetworkField = 10,
    MalformedAspath = 11,
    Unknown(u8),
}

impl From<u8> for UpdateError {
    fn from(sub_code: u8) -> Self {
        use UpdateError::*;
        match sub_code {
            1 => MalformedAttributeList,
            2 => UnrecognizedWellknownAttribute,
            3 => MissingWellknownAttribute,
            4 => AttributeFlagsError,
            5 => AttributeLengthError,
            6 => InvalidOriginAttribute,
            8 => InvalidNexthopAttribute,
            9 => OptionalAttributeError,
            10 => InvalidNetworkField,
            11 => MalformedAspath,
            v => Unknown(v),
        }
    }
}

impl From<UpdateError> for u8 {
    fn from(error: UpdateError) -> Self {
        use UpdateError::*;
        match error {
            MalformedAttributeList => 1,
            UnrecognizedWellknownAttribute => 2,
            MissingWellknownAttribute => 3,
            AttributeFlagsError => 4,
            AttributeLengthError => 5,
            InvalidOriginAttribute => 6,
            InvalidNexthopAttribute => 8,
            OptionalAttributeError => 9,
            InvalidNetworkField => 10,
            MalformedAspath => 11,
            Unknown(v) => v,
        }
    }
}

fn sub_update_error_str(sub_code: UpdateError) -> String {
    use UpdateError::*;
    match sub_code {
        MalformedAttributeList => "Malformed Attribute List".into(),
        UnrecognizedWellknownAttribute => "Unrecognized Wellknown Attribute".into(),
        MissingWellknownAttribute => "Missing Wellknown Attribute".into(),
        AttributeFlagsError => "Attribute Flags Error".into(),
        AttributeLengthError => "Attribute Length Error".into(),
        InvalidOriginAttribute => "Invalid Origin Attribute".into(),
        InvalidNexthopAttribute => "Invalid Nexthop Attribute".into(),
        OptionalAttributeError => "Optional Attribute Error".into(),
        InvalidNetworkField => "Invalid Network Field".into(),
        MalformedAspath => "Malformed Aspath".into(),
        Unknown(v) => format!("Unknown({})", v),
    }
}

#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CeaseError {
    Unspecific = 0,
    MaximumNumberOfPrefixReached = 1, // RFC4486
    AdministrativeShutdown = 2,       // RFC4486|RFC9003
    OutOfResources = 8,               // RFC4486
    Unknown(u8),
}

impl From<u8> for CeaseError {
    fn from(sub_code: u8) -> Self {
        use CeaseError::*;
        match sub_code {
            0 => Unspecific,
            1 => MaximumNumberOfPrefixReached,
            2 => AdministrativeShutdown,
            8 => OutOfResources,
            v => Unknown(v),
        }
    }
}

impl From<CeaseError> for u8 {
    fn from(error: CeaseError) -> Self {
        use CeaseError::*;
        match error {
            Unspecific => 0,
            MaximumNumberOfPrefixReached => 1,
            AdministrativeShutdown => 2,
            OutOfResources => 8,
            Unknown(v) => v,
        }
    }
}

fn sub_cease_error_str(sub_code: CeaseError) -> String {
    use CeaseError::*;
    match sub_code {
        Unspecific => "Unspecific".into(),
        MaximumNumberOfPrefixReached => "Maximum Number of Prefixes Reached".into(),
        AdministrativeShutdown => "Administrative Shutdown".into(),
        OutOfResources => "Out of Resources".into(),
        Unknown(v) => format!("Unknown({})", v),
    }
}

impl NotificationPacket {
    pub fn new(code: NotifyCode, sub_code: u8, data: Vec<u8>) -> Self {
        Self {
            header: BgpHeader::new(BgpType::Notification, BGP_HEADER_LEN),
            code,
            sub_code,
            data,
        }
    }

    /// Builds the NOTIFICATION matching a codec error, the error text is
    /// carried as data.
    pub fn from_error(err: &BgpError) -> Option<Self> {
        let (code, sub_code) = err.notify()?;
        Some(Self::new(code, sub_code, err.to_string().into_bytes()))
    }
}

impl From<NotificationPacket> for BytesMut {
    fn from(notification: NotificationPacket) -> Self {
        let mut buf = BytesMut::new();
        let header: BytesMut = notification.header.into();
        buf.put(&header[..]);
        buf.put_u8(notification.code.into());
        buf.put_u8(notification.sub_code);
        buf.put(&notification.data[..]);

        const LENGTH_POS: std::ops::Range<usize> = 16..18;
        let length: u16 = buf.len() as u16;
        buf[LENGTH_POS].copy_from_slice(&length.to_be_bytes());

        buf
    }
}
