use std::fmt;

use bitfield_struct::bitfield;
use serde::Serialize;

#[bitfield(u8, debug = true)]
#[derive(Serialize, PartialEq)]
pub struct AttrFlags {
    #[bits(4)]
    pub resvd: u8,
    pub extended: bool,
    pub partial: bool,
    pub transitive: bool,
    pub optional: bool,
}

impl fmt::Display for AttrFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut v: Vec<&str> = Vec::new();
        if self.optional() {
            v.push("OPTIONAL");
        }
        if self.transitive() {
            v.push("TRANSITIVE");
        }
        if self.partial() {
            v.push("PARTIAL");
        }
        if self.extended() {
            v.push("EXTENDED");
        }
        write!(f, "{}", v.join("|"))
    }
}
