/// The closed FCAP type space.
///
/// A 3-bit identifier in every KTV header byte. All seven numeric types
/// serialize to a deterministic number of bytes; [`Type::Binary`] carries a
/// one-byte length prefix followed by that many payload bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Type {
  /// Length-prefixed opaque bytes, 0-255 of them.
  Binary = 0,
  /// Unsigned 8-bit integer.
  U8,
  /// Unsigned 16-bit integer.
  U16,
  /// Signed 16-bit integer.
  I16,
  /// Signed 32-bit integer.
  I32,
  /// Signed 64-bit integer.
  I64,
  /// 32-bit IEEE-754 float.
  F32,
  /// 64-bit IEEE-754 float.
  F64,
}

impl Type {
  /// Serialized payload size of a value of this type.
  ///
  /// `None` for [`Type::Binary`], whose size is carried on the wire.
  ///
  /// ```
  /// use fcap_msg::Type;
  ///
  /// assert_eq!(Type::U8.size(), Some(1));
  /// assert_eq!(Type::I64.size(), Some(8));
  /// assert_eq!(Type::Binary.size(), None);
  /// ```
  pub fn size(&self) -> Option<usize> {
    match self {
      | Self::Binary => None,
      | Self::U8 => Some(1),
      | Self::U16 | Self::I16 => Some(2),
      | Self::I32 | Self::F32 => Some(4),
      | Self::I64 | Self::F64 => Some(8),
    }
  }

  /// Interpret the high 3 bits of a KTV header byte.
  ///
  /// Infallible: the field is exactly as wide as the type space.
  pub(crate) fn from_bits(bits: u8) -> Self {
    match bits & 0x7 {
      | 0 => Self::Binary,
      | 1 => Self::U8,
      | 2 => Self::U16,
      | 3 => Self::I16,
      | 4 => Self::I32,
      | 5 => Self::I64,
      | 6 => Self::F32,
      | _ => Self::F64,
    }
  }
}

/// A single typed FCAP value.
///
/// Numeric variants are owned; [`Value::Binary`] borrows its bytes, either
/// from the caller (when adding) or from the packet (when getting).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Value<'a> {
  /// See [`Type::Binary`].
  Binary(&'a [u8]),
  /// See [`Type::U8`].
  U8(u8),
  /// See [`Type::U16`].
  U16(u16),
  /// See [`Type::I16`].
  I16(i16),
  /// See [`Type::I32`].
  I32(i32),
  /// See [`Type::I64`].
  I64(i64),
  /// See [`Type::F32`].
  F32(f32),
  /// See [`Type::F64`].
  F64(f64),
}

impl Value<'_> {
  /// The wire type tag for this value.
  ///
  /// ```
  /// use fcap_msg::{Type, Value};
  ///
  /// assert_eq!(Value::U16(4096).ty(), Type::U16);
  /// assert_eq!(Value::Binary(&[1, 2, 3]).ty(), Type::Binary);
  /// ```
  pub fn ty(&self) -> Type {
    match self {
      | Self::Binary(_) => Type::Binary,
      | Self::U8(_) => Type::U8,
      | Self::U16(_) => Type::U16,
      | Self::I16(_) => Type::I16,
      | Self::I32(_) => Type::I32,
      | Self::I64(_) => Type::I64,
      | Self::F32(_) => Type::F32,
      | Self::F64(_) => Type::F64,
    }
  }

  /// Serialized size of the whole KTV entry this value would occupy:
  /// header byte, length prefix when binary, payload.
  pub(crate) fn wire_size(&self) -> usize {
    match self {
      | Self::Binary(bytes) => crate::KTV_HEADER_SIZE + 1 + bytes.len(),
      | other => {
        // size() is Some for every numeric variant
        crate::KTV_HEADER_SIZE + other.ty().size().unwrap_or(0)
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn type_bits_round_trip() {
    for bits in 0..8u8 {
      let ty = Type::from_bits(bits);
      assert_eq!(ty as u8, bits);
    }
  }

  #[test]
  fn wire_sizes() {
    assert_eq!(Value::U8(0).wire_size(), 2);
    assert_eq!(Value::I16(-2).wire_size(), 3);
    assert_eq!(Value::F64(0.5).wire_size(), 9);
    assert_eq!(Value::Binary(&[0; 10]).wire_size(), 12);
    assert_eq!(Value::Binary(&[]).wire_size(), 2);
  }
}
