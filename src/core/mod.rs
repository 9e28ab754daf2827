pub(crate) mod numeric;

/// This serialises the numeric types into a compact binary format.
pub trait Serialize {
    fn serialize(&self, buff: &mut Vec<u8>);
}
