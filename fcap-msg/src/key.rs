use crate::Error;

/// The closed FCAP key space.
///
/// A key is a 5-bit identifier, so a packet can name at most 32 distinct
/// fields. What each key *means* is a contract between the two peers; the
/// protocol only promises that keys within one packet are unique.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
#[repr(u8)]
pub enum Key {
  A = 0,
  B,
  C,
  D,
  E,
  F,
  G,
  H,
  I,
  J,
  K,
  L,
  M,
  N,
  O,
  P,
  Q,
  R,
  S,
  T,
  U,
  V,
  W,
  X,
  Y,
  Z,
  Aa,
  Ab,
  Ac,
  Ad,
  Ae,
  Af,
}

impl Key {
  /// Every key, in wire order.
  pub const ALL: [Key; 32] = [Key::A,
                              Key::B,
                              Key::C,
                              Key::D,
                              Key::E,
                              Key::F,
                              Key::G,
                              Key::H,
                              Key::I,
                              Key::J,
                              Key::K,
                              Key::L,
                              Key::M,
                              Key::N,
                              Key::O,
                              Key::P,
                              Key::Q,
                              Key::R,
                              Key::S,
                              Key::T,
                              Key::U,
                              Key::V,
                              Key::W,
                              Key::X,
                              Key::Y,
                              Key::Z,
                              Key::Aa,
                              Key::Ab,
                              Key::Ac,
                              Key::Ad,
                              Key::Ae,
                              Key::Af];

  /// Interpret the low 5 bits of a KTV header byte as a key.
  ///
  /// Infallible: the field is exactly as wide as the key space.
  pub(crate) fn from_bits(bits: u8) -> Self {
    Self::ALL[(bits & 0x1f) as usize]
  }
}

impl TryFrom<u8> for Key {
  type Error = Error;

  /// ```
  /// use fcap_msg::Key;
  ///
  /// assert_eq!(Key::try_from(0), Ok(Key::A));
  /// assert_eq!(Key::try_from(31), Ok(Key::Af));
  /// assert!(Key::try_from(32).is_err());
  /// ```
  fn try_from(byte: u8) -> Result<Self, Self::Error> {
    Self::ALL.get(byte as usize).copied().ok_or(Error::Invalid)
  }
}
