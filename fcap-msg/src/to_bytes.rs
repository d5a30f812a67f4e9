use crate::{Error, Packet};

/// Trait for serializing a data structure into a caller-provided byte
/// buffer.
///
/// FCAP never allocates, so "into bytes" means "into the front of this
/// slice"; the returned count says how much of it is meaningful.
pub trait TryIntoBytes {
  /// Error type yielded if serialization fails
  type Error;

  /// Serialize `self` into `dst`, yielding the number of bytes written.
  fn try_into_bytes(&self, dst: &mut [u8]) -> Result<usize, Self::Error>;
}

impl TryIntoBytes for Packet {
  type Error = Error;

  /// Copy the packet onto the wire: 2 header bytes, then the packed KTV
  /// region. Exactly [`Packet::num_bytes`] bytes are written.
  ///
  /// [`Error::NoMem`] when `dst` is too short.
  ///
  /// ```
  /// use fcap_msg::{Key, Packet, TryIntoBytes};
  ///
  /// let mut pkt = Packet::new();
  /// pkt.add_u8(Key::A, 13).unwrap();
  ///
  /// let mut wire = [0u8; fcap_msg::MTU];
  /// let n = pkt.try_into_bytes(&mut wire).unwrap();
  ///
  /// assert_eq!(n, 4);
  /// assert_eq!(&wire[..n], &[0b000_00001, 0b0_0000000, 0b001_00000, 13]);
  /// ```
  fn try_into_bytes(&self, dst: &mut [u8]) -> Result<usize, Self::Error> {
    let size = self.num_bytes();
    if dst.len() < size {
      return Err(Error::NoMem);
    }

    let [b0, b1] = self.header().to_bytes();
    dst[0] = b0;
    dst[1] = b1;
    dst[crate::HEADER_SIZE..size].copy_from_slice(&self.ktvs);

    Ok(size)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Id, Key, PktType};

  #[test]
  fn short_buffer_rejected() {
    let mut pkt = Packet::new();
    pkt.add_i64(Key::A, -1).unwrap();

    let mut wire = [0u8; 8];
    assert_eq!(pkt.try_into_bytes(&mut wire), Err(Error::NoMem));
  }

  #[test]
  fn header_first_then_entries_in_insertion_order() {
    let mut pkt = Packet::new();
    pkt.set_id(Id(7));
    pkt.set_pkt_type(PktType::Response);
    pkt.add_u8(Key::A, 13).unwrap();
    pkt.add_u8(Key::B, 42).unwrap();

    let mut wire = [0u8; crate::MTU];
    let n = pkt.try_into_bytes(&mut wire).unwrap();

    assert_eq!(n, 6);
    assert_eq!(&wire[..n],
               &[0b000_00010, 0b1_0000111, 0b001_00000, 13, 0b001_00001, 42]);
  }
}
