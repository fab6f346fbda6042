use crate::BgpError;

// MPLS Label encoding (RFC 3032):
// 0                   1                   2                   3
// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                Label (20 bits)                | Exp |S| TTL   |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
// In BGP NLRI only 3 octets are used (no TTL field):
// |                Label (20 bits)                | Exp |S|
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Label {
    pub label: u32,
    pub exp: u8,
    pub bos: bool,
}

pub const LABEL_MAX: u32 = 0x000f_ffff;

impl TryFrom<&[u8]> for Label {
    type Error = BgpError;

    fn try_from(val: &[u8]) -> Result<Self, Self::Error> {
        if val.len() < 3 {
            return Err(BgpError::MalformedLength {
                expected: 3,
                actual: val.len(),
            });
        }

        let label = ((val[0] as u32) << 12) | ((val[1] as u32) << 4) | ((val[2] as u32) >> 4);
        let exp = (val[2] >> 1) & 0x07;
        let bos = (val[2] & 0x01) == 1;

        Ok(Label { label, exp, bos })
    }
}

impl Label {
    pub fn new(label: u32, exp: u8, bos: bool) -> Self {
        Label { label, exp, bos }
    }

    /// Label with the trailing nibble zero filled. Bits above the 20 bit
    /// label value are discarded.
    pub fn base(label: u32) -> Self {
        Label::new(label & LABEL_MAX, 0, false)
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        let mut bytes = [0u8; 3];
        bytes[0] = ((self.label >> 12) & 0xFF) as u8;
        bytes[1] = ((self.label >> 4) & 0xFF) as u8;
        bytes[2] = (((self.label & 0x0F) << 4)
            | ((self.exp as u32 & 0x07) << 1)
            | (self.bos as u32)) as u8;
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_nibble_is_ignored() {
        let label = Label::try_from(&[0x40, 0x00, 0x11][..]).unwrap();
        assert_eq!(label.label, 262145);
        assert!(label.bos);

        assert_eq!(Label::base(262145).to_bytes(), [0x40, 0x00, 0x10]);
    }

    #[test]
    fn short_input() {
        assert!(Label::try_from(&[0x40, 0x00][..]).is_err());
    }

    #[test]
    fn base_masks_to_twenty_bits() {
        assert_eq!(Label::base(0x0123_4567).label, 0x0003_4567);
    }
}
