use bytes::{BufMut, BytesMut};

use crate::{AttrFlags, AttrType};

/// Attributes with values up to this size use the one octet length form.
pub const ATTR_SHORT_LEN_MAX: usize = 255;

/// Size of the flags, type and length octets for a value of `len` bytes.
pub fn attr_header_len(len: usize) -> usize {
    if len > ATTR_SHORT_LEN_MAX { 4 } else { 3 }
}

/// Writes an attribute header, switching to the extended length form when
/// the value does not fit in one octet.
pub fn attr_emit_header(buf: &mut BytesMut, flags: AttrFlags, typ: AttrType, len: usize) {
    if len > ATTR_SHORT_LEN_MAX {
        buf.put_u8(flags.with_extended(true).into());
        buf.put_u8(typ.into());
        buf.put_u16(len as u16);
    } else {
        buf.put_u8(flags.with_extended(false).into());
        buf.put_u8(typ.into());
        buf.put_u8(len as u8);
    }
}

pub trait AttrEmitter {
    fn attr_flags(&self) -> AttrFlags;

    fn attr_type(&self) -> AttrType;

    fn len(&self) -> Option<usize>;

    fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    fn emit(&self, buf: &mut BytesMut);

    fn attr_emit(&self, buf: &mut BytesMut) {
        if let Some(len) = self.len() {
            attr_emit_header(buf, self.attr_flags(), self.attr_type(), len);
            self.emit(buf);
        } else {
            // Buffer the value to learn its length.
            let mut attr_buf = BytesMut::new();
            self.emit(&mut attr_buf);
            attr_emit_header(buf, self.attr_flags(), self.attr_type(), attr_buf.len());
            buf.put(&attr_buf[..]);
        }
    }

    /// The attribute as a standalone byte sequence, header included.
    fn attr_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::new();
        self.attr_emit(&mut buf);
        buf
    }
}
