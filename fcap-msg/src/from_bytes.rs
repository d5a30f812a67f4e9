use crate::pkt::{Entries, Header};
use crate::{Error, Packet, Version, HEADER_SIZE, MTU};

/// Trait for parsing a data structure out of a byte slice.
pub trait TryFromBytes: Sized {
  /// Error type yielded if parsing fails
  type Error;

  /// Try to parse a `Self` out of `src`. The whole slice must be consumed.
  fn try_from_bytes(src: &[u8]) -> Result<Self, Self::Error>;
}

impl Packet {
  /// Replace this packet's contents with the packet serialized in `src`.
  ///
  /// `src` must hold exactly one whole packet: no more than [`MTU`] bytes,
  /// version 0, and a KTV region whose walked length agrees with
  /// `src.len()` exactly - trailing garbage, truncated entries and
  /// duplicate keys are all rejected with [`Error::Invalid`]. Nothing is
  /// committed until validation passes, so the packet is untouched on
  /// failure.
  ///
  /// ```
  /// use fcap_msg::{Key, Packet};
  ///
  /// let mut wire = [0u8; fcap_msg::MTU];
  /// let mut sent = Packet::new();
  /// sent.add_u16(Key::C, 1434).unwrap();
  /// let n = fcap_msg::TryIntoBytes::try_into_bytes(&sent, &mut wire).unwrap();
  ///
  /// let mut rcvd = Packet::new();
  /// rcvd.decode_into(&wire[..n]).unwrap();
  /// assert_eq!(rcvd, sent);
  /// ```
  pub fn decode_into(&mut self, src: &[u8]) -> Result<(), Error> {
    if src.len() > MTU || src.len() < HEADER_SIZE {
      return Err(Error::Invalid);
    }

    let header = Header::from_bytes([src[0], src[1]]);
    if header.ver != Version(0) {
      return Err(Error::Invalid);
    }

    let ktv_bytes = &src[HEADER_SIZE..];

    // walk every declared entry, tallying their wire size and checking
    // key uniqueness as we go (keys are 5-bit, a u32 covers the space)
    let mut seen: u32 = 0;
    let mut walked = 0usize;
    for entry in Entries::new(ktv_bytes, header.num_keys) {
      let entry = entry?;
      let bit = 1u32 << (entry.key as u8);
      if seen & bit != 0 {
        return Err(Error::Invalid);
      }
      seen |= bit;
      walked += entry.wire_size();
    }

    if walked != ktv_bytes.len() {
      return Err(Error::Invalid);
    }

    self.ver = header.ver;
    self.ty = header.ty;
    self.id = header.id;
    self.num_keys = header.num_keys;
    self.ktvs.clear();
    self.ktvs.extend_from_slice(ktv_bytes);

    Ok(())
  }
}

impl TryFromBytes for Packet {
  type Error = Error;

  /// Parse one whole packet; see [`Packet::decode_into`] for the
  /// validation rules.
  fn try_from_bytes(src: &[u8]) -> Result<Self, Self::Error> {
    let mut pkt = Packet::new();
    pkt.decode_into(src)?;
    Ok(pkt)
  }
}
