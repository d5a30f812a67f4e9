//! # fcap-msg
//! Low-level representation of FCAP packets.
//!
//! ## FCAP
//! FCAP ("Field Capture Protocol") is a compact request/response protocol
//! for constrained devices. One datagram carries one packet: a 2-byte
//! bit-packed header followed by up to 31 Key-Type-Value (KTV) entries,
//! the whole thing bounded by a 255-byte MTU.
//!
//! Keys are drawn from a closed 5-bit space ([`Key`]), values from a closed
//! 3-bit type space ([`Type`]). Fixed-width values travel in host byte
//! order; peers are assumed to share endianness.
//!
//! ## No allocation
//! [`Packet`] is a plain stack value backed by a fixed-capacity
//! [`tinyvec::ArrayVec`]. Building, traversing, encoding and decoding
//! packets never touches the heap.
//!
//! ```
//! use fcap_msg::{Key, Packet};
//!
//! let mut pkt = Packet::new();
//! pkt.add_u8(Key::A, 13).unwrap();
//!
//! assert_eq!(pkt.get_u8(Key::A), Ok(13));
//! assert_eq!(pkt.num_bytes(), 4); // header + ktv header + value
//! ```

#![doc(html_root_url = "https://docs.rs/fcap-msg/0.1.0")]
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(not(test),
            deny(missing_debug_implementations,
                 unreachable_pub,
                 unsafe_code,
                 missing_copy_implementations))]
#![cfg_attr(any(docsrs, feature = "docs"), feature(doc_cfg))]
#![deny(missing_docs)]

#[doc(hidden)]
pub mod from_bytes;
#[doc(hidden)]
pub mod key;
#[doc(hidden)]
pub mod pkt;
#[doc(hidden)]
pub mod to_bytes;
#[doc(hidden)]
pub mod value;

#[doc(inline)]
pub use from_bytes::TryFromBytes;
#[doc(inline)]
pub use key::Key;
#[doc(inline)]
pub use pkt::Packet;
#[doc(inline)]
pub use to_bytes::TryIntoBytes;
#[doc(inline)]
pub use value::{Type, Value};

/// Maximum Transmission Unit: the on-wire size limit of a whole packet,
/// header included. One datagram == one packet; there is no fragmentation.
pub const MTU: usize = 255;

/// Serialized size of the packet header.
pub const HEADER_SIZE: usize = 2;

/// Serialized size of a KTV entry header.
pub const KTV_HEADER_SIZE: usize = 1;

/// Capacity of the KTV region of a packet.
pub const KTV_CAPACITY: usize = MTU - HEADER_SIZE;

/// Most KTV entries one packet can carry (`num_keys` is a 5-bit field).
pub const MAX_KEYS: u8 = 31;

/// Error codes shared by every fallible FCAP operation.
///
/// The set mirrors the protocol's error taxonomy; success ("`ENONE`") is
/// `Ok` rather than a variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
  /// An output buffer, the packet's MTU budget, or its key count is
  /// exhausted.
  NoMem,
  /// A key is already present.
  ///
  /// Defined by the protocol but never produced by this implementation:
  /// [`Packet::add`] reports duplicate keys as [`Error::Invalid`].
  Exist,
  /// Malformed input: an oversized binary value, a decode of a packet with
  /// the wrong version or a length that disagrees with its contents, or a
  /// handler abort surfaced by the runtime.
  Invalid,
  /// The requested key is not present in the packet.
  NoKey,
  /// A typed accessor was invoked on a value of a different type.
  TypeMismatch,
}

impl core::fmt::Display for Error {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      | Self::NoMem => f.write_str("buffer or packet budget exhausted"),
      | Self::Exist => f.write_str("key already present"),
      | Self::Invalid => f.write_str("malformed packet or argument"),
      | Self::NoKey => f.write_str("key not present"),
      | Self::TypeMismatch => f.write_str("stored type differs from requested type"),
    }
  }
}

#[cfg(feature = "std")]
#[cfg_attr(any(docsrs, feature = "docs"), doc(cfg(feature = "std")))]
impl std::error::Error for Error {}

/// Identifies a request so the matching response can be recognized.
///
/// Chosen by the requester and echoed verbatim in the response. Only the
/// low 7 bits travel on the wire; meaningful values are `0..=127`.
///
/// No correlation table is kept anywhere in FCAP - matching a response's
/// `Id` back to an outstanding request is the embedder's job.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Id(pub u8);

/// Version of the FCAP protocol a packet adheres to.
///
/// Always 0 today; packets claiming any other version are rejected on
/// decode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Version(pub u8);

/// Whether a packet asks a question or answers one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PktType {
  /// The packet expects a response carrying the same [`Id`].
  Request = 0,
  /// The packet answers a request.
  Response = 1,
}

impl Default for PktType {
  fn default() -> Self {
    PktType::Request
  }
}

impl PktType {
  pub(crate) fn from_bit(bit: u8) -> Self {
    match bit & 1 {
      | 0 => Self::Request,
      | _ => Self::Response,
    }
  }
}
