use core::fmt;

use tinyvec::ArrayVec;

use crate::{Error, Id, Key, PktType, Type, Value, Version, HEADER_SIZE, KTV_CAPACITY, MAX_KEYS,
            MTU};

/// The packet header, 2 bytes on the wire.
///
/// ```text
/// byte 0        byte 1
/// vvvkkkkk      tiiiiiii
/// |  |          ||
/// |  |          |message id (7 bits)
/// |  |          request/response bit
/// |  number of KTV entries (5 bits)
/// protocol version (3 bits)
/// ```
///
/// Encoded with explicit shifts and masks; bit-field struct layout is a
/// compiler property, not a wire contract.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Header {
  pub(crate) ver: Version,
  pub(crate) num_keys: u8,
  pub(crate) ty: PktType,
  pub(crate) id: Id,
}

impl Header {
  pub(crate) fn to_bytes(self) -> [u8; 2] {
    [(self.ver.0 << 5) | (self.num_keys & 0x1f),
     ((self.ty as u8) << 7) | (self.id.0 & 0x7f)]
  }

  pub(crate) fn from_bytes([b0, b1]: [u8; 2]) -> Self {
    Header { ver: Version(b0 >> 5),
             num_keys: b0 & 0x1f,
             ty: PktType::from_bit(b1 >> 7),
             id: Id(b1 & 0x7f) }
  }
}

/// One decoded KTV entry, borrowed from the packet's KTV region.
///
/// `payload` excludes the entry header byte and, for binary entries, the
/// length prefix.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Entry<'a> {
  pub(crate) key: Key,
  pub(crate) ty: Type,
  pub(crate) payload: &'a [u8],
}

impl<'a> Entry<'a> {
  /// Bytes this entry occupies on the wire.
  pub(crate) fn wire_size(&self) -> usize {
    match self.ty {
      | Type::Binary => 2 + self.payload.len(),
      | _ => 1 + self.payload.len(),
    }
  }

  pub(crate) fn value(&self) -> Value<'a> {
    fn arr<const N: usize>(bytes: &[u8]) -> [u8; N] {
      let mut out = [0u8; N];
      out.copy_from_slice(bytes);
      out
    }

    // the walker only yields entries whose payload length matches the type
    match self.ty {
      | Type::Binary => Value::Binary(self.payload),
      | Type::U8 => Value::U8(self.payload[0]),
      | Type::U16 => Value::U16(u16::from_ne_bytes(arr(self.payload))),
      | Type::I16 => Value::I16(i16::from_ne_bytes(arr(self.payload))),
      | Type::I32 => Value::I32(i32::from_ne_bytes(arr(self.payload))),
      | Type::I64 => Value::I64(i64::from_ne_bytes(arr(self.payload))),
      | Type::F32 => Value::F32(f32::from_ne_bytes(arr(self.payload))),
      | Type::F64 => Value::F64(f64::from_ne_bytes(arr(self.payload))),
    }
  }
}

/// Fallible iterator over the KTV entries of a byte region.
///
/// Entries are variable width, so there is no random access: every lookup
/// walks from offset 0. Each step re-checks the remaining length against
/// the declared type size before advancing, which makes the walker safe on
/// truncated or hostile input (decode validation leans on this).
#[derive(Copy, Clone, Debug)]
pub(crate) struct Entries<'a> {
  bytes: &'a [u8],
  left: u8,
}

impl<'a> Entries<'a> {
  pub(crate) fn new(bytes: &'a [u8], num_keys: u8) -> Self {
    Entries { bytes, left: num_keys }
  }
}

impl<'a> Iterator for Entries<'a> {
  type Item = Result<Entry<'a>, Error>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.left == 0 {
      return None;
    }
    self.left -= 1;

    let (&hdr, rest) = match self.bytes.split_first() {
      | Some(split) => split,
      | None => return Some(Err(Error::Invalid)),
    };

    let ty = Type::from_bits(hdr >> 5);
    let key = Key::from_bits(hdr & 0x1f);

    let (payload, rest) = match ty.size() {
      | Some(size) if rest.len() >= size => (&rest[..size], &rest[size..]),
      | Some(_) => return Some(Err(Error::Invalid)),
      | None => {
        let (&len, bin) = match rest.split_first() {
          | Some(split) => split,
          | None => return Some(Err(Error::Invalid)),
        };
        let len = len as usize;
        if bin.len() < len {
          return Some(Err(Error::Invalid));
        }
        (&bin[..len], &bin[len..])
      },
    };

    self.bytes = rest;
    Some(Ok(Entry { key, ty, payload }))
  }
}

/// An FCAP packet: header plus a region of packed KTV entries.
///
/// Lives entirely on the stack, sized by the protocol MTU. A fresh packet
/// is an empty request with id 0; [`Packet::reset`] returns any packet to
/// that state.
///
/// ```
/// use fcap_msg::{Key, Packet, Type, Value};
///
/// let mut pkt = Packet::new();
/// pkt.add_f32(Key::A, 12.34).unwrap();
/// pkt.add_bin(Key::Z, b"field 7").unwrap();
///
/// assert_eq!(pkt.get(Key::A), Ok(Value::F32(12.34)));
/// assert_eq!(pkt.get_bin(Key::Z), Ok(&b"field 7"[..]));
/// assert!(!pkt.has(Key::B));
/// ```
#[derive(Clone, Default, PartialEq)]
// 255 bytes is too large to copy implicitly
#[allow(missing_copy_implementations)]
pub struct Packet {
  pub(crate) ver: Version,
  pub(crate) ty: PktType,
  pub(crate) id: Id,
  pub(crate) num_keys: u8,
  pub(crate) ktvs: ArrayVec<[u8; KTV_CAPACITY]>,
}

impl Packet {
  /// An empty request packet: version 0, no keys, id 0.
  pub fn new() -> Self {
    Default::default()
  }

  /// Return this packet to the state [`Packet::new`] creates.
  pub fn reset(&mut self) {
    self.ver = Version(0);
    self.ty = PktType::Request;
    self.id = Id(0);
    self.num_keys = 0;
    self.ktvs.clear();
  }

  /// Exact on-wire size of this packet: header plus every KTV entry.
  pub fn num_bytes(&self) -> usize {
    HEADER_SIZE + self.ktvs.len()
  }

  /// How many KTV entries the packet carries.
  pub fn num_keys(&self) -> u8 {
    self.num_keys
  }

  /// The message id echoed between a request and its response.
  pub fn id(&self) -> Id {
    self.id
  }

  /// Set the message id. Only the low 7 bits travel on the wire.
  pub fn set_id(&mut self, id: Id) {
    self.id = id;
  }

  /// Whether this packet is a request or a response.
  pub fn pkt_type(&self) -> PktType {
    self.ty
  }

  /// Mark this packet as a request or a response.
  pub fn set_pkt_type(&mut self, ty: PktType) {
    self.ty = ty;
  }

  /// The protocol version this packet claims.
  pub fn version(&self) -> Version {
    self.ver
  }

  pub(crate) fn header(&self) -> Header {
    Header { ver: self.ver,
             num_keys: self.num_keys,
             ty: self.ty,
             id: self.id }
  }

  pub(crate) fn entries(&self) -> Entries<'_> {
    Entries::new(&self.ktvs, self.num_keys)
  }

  /// Append a KTV entry.
  ///
  /// Fails with [`Error::Invalid`] when `key` is already present or a
  /// binary payload exceeds 255 bytes, and with [`Error::NoMem`] when the
  /// entry would not fit in the remaining MTU budget or the packet already
  /// carries 31 entries. The packet is untouched on failure.
  ///
  /// ```
  /// use fcap_msg::{Error, Key, Packet, Value};
  ///
  /// let mut pkt = Packet::new();
  /// assert_eq!(pkt.add(Key::A, Value::U8(13)), Ok(()));
  /// assert_eq!(pkt.add(Key::A, Value::U8(99)), Err(Error::Invalid));
  /// assert_eq!(pkt.get(Key::A), Ok(Value::U8(13)));
  /// ```
  pub fn add(&mut self, key: Key, value: Value<'_>) -> Result<(), Error> {
    if self.num_keys >= MAX_KEYS {
      return Err(Error::NoMem);
    }

    for entry in self.entries() {
      if entry?.key == key {
        return Err(Error::Invalid);
      }
    }

    if let Value::Binary(bytes) = value {
      if bytes.len() > u8::MAX as usize {
        return Err(Error::Invalid);
      }
    }

    if self.num_bytes() + value.wire_size() > MTU {
      return Err(Error::NoMem);
    }

    self.ktvs.push(((value.ty() as u8) << 5) | (key as u8));
    match value {
      | Value::Binary(bytes) => {
        self.ktvs.push(bytes.len() as u8);
        self.ktvs.extend_from_slice(bytes);
      },
      | Value::U8(v) => self.ktvs.push(v),
      | Value::U16(v) => self.ktvs.extend_from_slice(&v.to_ne_bytes()),
      | Value::I16(v) => self.ktvs.extend_from_slice(&v.to_ne_bytes()),
      | Value::I32(v) => self.ktvs.extend_from_slice(&v.to_ne_bytes()),
      | Value::I64(v) => self.ktvs.extend_from_slice(&v.to_ne_bytes()),
      | Value::F32(v) => self.ktvs.extend_from_slice(&v.to_ne_bytes()),
      | Value::F64(v) => self.ktvs.extend_from_slice(&v.to_ne_bytes()),
    }
    self.num_keys += 1;

    Ok(())
  }

  /// Look a key up, yielding its typed value.
  ///
  /// Linear scan from the front; [`Error::NoKey`] when absent.
  pub fn get(&self, key: Key) -> Result<Value<'_>, Error> {
    for entry in self.entries() {
      let entry = entry?;
      if entry.key == key {
        return Ok(entry.value());
      }
    }

    Err(Error::NoKey)
  }

  /// Whether `key` is present, without touching its value.
  pub fn has(&self, key: Key) -> bool {
    self.entries().any(|e| matches!(e, Ok(entry) if entry.key == key))
  }

  /// Append a binary value under `key`. At most 255 bytes.
  pub fn add_bin(&mut self, key: Key, bytes: &[u8]) -> Result<(), Error> {
    self.add(key, Value::Binary(bytes))
  }

  /// Borrow the binary value stored under `key`.
  ///
  /// [`Error::TypeMismatch`] when the stored value is not binary.
  pub fn get_bin(&self, key: Key) -> Result<&[u8], Error> {
    match self.get(key)? {
      | Value::Binary(bytes) => Ok(bytes),
      | _ => Err(Error::TypeMismatch),
    }
  }
}

macro_rules! typed_accessors {
  ($($add:ident / $get:ident => $variant:ident($ty:ty)),+ $(,)?) => {
    impl Packet {
      $(
        #[doc = concat!("Append a `", stringify!($ty), "` value under `key`.")]
        pub fn $add(&mut self, key: Key, value: $ty) -> Result<(), Error> {
          self.add(key, Value::$variant(value))
        }

        #[doc = concat!("Read the `",
                        stringify!($ty),
                        "` value stored under `key`.\n\n[`Error::TypeMismatch`] when the stored type differs.")]
        pub fn $get(&self, key: Key) -> Result<$ty, Error> {
          match self.get(key)? {
            | Value::$variant(value) => Ok(value),
            | _ => Err(Error::TypeMismatch),
          }
        }
      )+
    }
  };
}

typed_accessors! {
  add_u8 / get_u8 => U8(u8),
  add_u16 / get_u16 => U16(u16),
  add_i16 / get_i16 => I16(i16),
  add_i32 / get_i32 => I32(i32),
  add_i64 / get_i64 => I64(i64),
  add_f32 / get_f32 => F32(f32),
  add_f64 / get_f64 => F64(f64),
}

struct Ktvs<'a>(&'a Packet);

impl fmt::Debug for Ktvs<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut map = f.debug_map();
    for entry in self.0.entries() {
      match entry {
        | Ok(entry) => {
          map.entry(&entry.key, &entry.value());
        },
        | Err(_) => {
          map.entry(&"..", &"truncated KTV region");
          break;
        },
      }
    }
    map.finish()
  }
}

/// Renders the header and each KTV instead of raw region bytes.
///
/// Diagnostics only; not intended for the hot path.
impl fmt::Debug for Packet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Packet")
     .field("version", &self.ver.0)
     .field("type", &self.ty)
     .field("id", &self.id.0)
     .field("num_keys", &self.num_keys)
     .field("ktvs", &Ktvs(self))
     .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn u8_round_trip() {
    let mut pkt = Packet::new();
    pkt.add(Key::A, Value::U8(13)).unwrap();

    assert_eq!(pkt.get(Key::A), Ok(Value::U8(13)));
    assert_eq!(pkt.num_bytes(), 4);
  }

  #[test]
  fn every_fixed_type_round_trips_bitwise() {
    let values = [Value::U8(13),
                  Value::U16(0xfeed),
                  Value::I16(-13),
                  Value::I32(i32::MAX - 9),
                  Value::I64(i64::MIN + 1),
                  Value::F32(-19.28),
                  Value::F64(-0.12345671234567)];

    for (key, value) in Key::ALL.iter().zip(values) {
      let mut pkt = Packet::new();
      pkt.add(*key, value).unwrap();
      assert_eq!(pkt.get(*key), Ok(value));
    }
  }

  #[test]
  fn two_keys() {
    let mut pkt = Packet::new();
    pkt.add_u8(Key::A, 13).unwrap();
    pkt.add_u8(Key::B, 42).unwrap();

    assert_eq!(pkt.get_u8(Key::A), Ok(13));
    assert_eq!(pkt.get_u8(Key::B), Ok(42));
    assert!(!pkt.has(Key::C));
  }

  #[test]
  fn duplicate_key_rejected_and_original_kept() {
    let mut pkt = Packet::new();
    assert_eq!(pkt.add_u8(Key::A, 13), Ok(()));
    assert_eq!(pkt.add_u8(Key::A, 99), Err(Error::Invalid));
    assert_eq!(pkt.get_u8(Key::A), Ok(13));
    assert_eq!(pkt.num_keys(), 1);
  }

  #[test]
  fn binary_round_trip() {
    let mut pkt = Packet::new();
    pkt.add_bin(Key::Z, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]).unwrap();

    assert_eq!(pkt.get(Key::Z), Ok(Value::Binary(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10])));
    assert_eq!(pkt.get_bin(Key::Z).unwrap().len(), 10);
  }

  #[test]
  fn typed_getter_rejects_wrong_type() {
    let mut pkt = Packet::new();
    pkt.add_f64(Key::Q, 2.5).unwrap();

    assert_eq!(pkt.get_u8(Key::Q), Err(Error::TypeMismatch));
    assert_eq!(pkt.get_bin(Key::Q), Err(Error::TypeMismatch));
    assert_eq!(pkt.get_f64(Key::Q), Ok(2.5));
  }

  #[test]
  fn absent_key_is_nokey() {
    let pkt = Packet::new();
    assert_eq!(pkt.get(Key::M), Err(Error::NoKey));
    assert_eq!(pkt.get_i32(Key::M), Err(Error::NoKey));
    assert!(!pkt.has(Key::M));
  }

  #[test]
  fn mtu_budget_enforced_and_packet_untouched() {
    let mut pkt = Packet::new();
    // header (2) + entry (2 + 251) == MTU exactly
    pkt.add_bin(Key::A, &[0xab; 251]).unwrap();
    assert_eq!(pkt.num_bytes(), MTU);

    let before = pkt.clone();
    assert_eq!(pkt.add_u8(Key::B, 1), Err(Error::NoMem));
    assert_eq!(pkt, before);
    assert_eq!(pkt.num_keys(), 1);
  }

  #[test]
  fn oversized_binary_rejected() {
    let mut pkt = Packet::new();
    assert_eq!(pkt.add_bin(Key::A, &[0; 256]), Err(Error::Invalid));
    assert_eq!(pkt.num_keys(), 0);
  }

  #[test]
  fn key_count_saturates_at_31() {
    let mut pkt = Packet::new();
    for key in Key::ALL.iter().take(31) {
      pkt.add_u8(*key, *key as u8).unwrap();
    }

    assert_eq!(pkt.num_keys(), 31);
    assert_eq!(pkt.add_u8(Key::Af, 0), Err(Error::NoMem));
    assert_eq!(pkt.num_keys(), 31);
  }

  #[test]
  fn lookup_is_insertion_order_independent() {
    let keys = [Key::Q, Key::A, Key::Af, Key::B];

    let mut forward = Packet::new();
    let mut backward = Packet::new();
    for key in keys {
      forward.add_u8(key, key as u8).unwrap();
    }
    for key in keys.iter().rev() {
      backward.add_u8(*key, *key as u8).unwrap();
    }

    for key in keys {
      assert_eq!(forward.get_u8(key), Ok(key as u8));
      assert_eq!(backward.get_u8(key), Ok(key as u8));
    }
  }

  #[test]
  fn reset_clears_everything() {
    let mut pkt = Packet::new();
    pkt.set_id(Id(99));
    pkt.set_pkt_type(PktType::Response);
    pkt.add_u8(Key::A, 1).unwrap();

    pkt.reset();

    assert_eq!(pkt, Packet::new());
    assert_eq!(pkt.num_bytes(), HEADER_SIZE);
  }

  #[test]
  fn header_bit_layout() {
    let header = Header { ver: Version(0),
                          num_keys: 3,
                          ty: PktType::Response,
                          id: Id(7) };

    assert_eq!(header.to_bytes(), [0b000_00011, 0b1_0000111]);
    assert_eq!(Header::from_bytes(header.to_bytes()), header);
  }

  #[test]
  fn debug_renders_entries() {
    let mut pkt = Packet::new();
    pkt.add_u8(Key::A, 13).unwrap();

    let rendered = format!("{:?}", pkt);
    assert!(rendered.contains("A"));
    assert!(rendered.contains("13"));
  }
}
