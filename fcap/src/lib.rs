//! `fcap` is the application runtime for FCAP, the Field Capture Protocol:
//! a compact request/response protocol for constrained devices where one
//! datagram carries one packet of Key-Type-Value entries.
//!
//! The runtime binds byte-oriented [`Transport`]s through an ordered
//! [`Middleware`] stack and drives a non-blocking poll loop that
//! dispatches inbound requests to a user [`Handler`], synthesizes and
//! emits responses, and hands inbound responses back to the application.
//!
//! ## Shape of an application
//! Everything is wired up from plain stack values - the runtime borrows
//! arrays the embedder declares, owns the two packet buffers, and never
//! allocates:
//!
//! ```
//! use fcap::{App, Control, Event, Handler, Key, Packet};
//! # use fcap::{Error, Transport};
//! # struct Loopback;
//! # impl Transport for Loopback {
//! #   fn send_bytes(&mut self, bytes: &[u8]) -> Result<usize, Error> { Ok(bytes.len()) }
//! #   fn recv_bytes(&mut self, _: &mut [u8]) -> nb::Result<usize, Error> { Err(nb::Error::WouldBlock) }
//! # }
//!
//! struct Fielder;
//!
//! impl Handler for Fielder {
//!   fn on_request(&mut self, event: &mut Event<'_>, res: &mut Packet) -> Control {
//!     // echo field A back, report our reading in B
//!     if let Ok(v) = event.pkt.get_f32(Key::A) {
//!       res.add_f32(Key::A, v).ok();
//!     }
//!     res.add_i64(Key::B, 58).ok();
//!     Control::Respond
//!   }
//! }
//!
//! let mut loopback = Loopback;
//! let mut transports: [&mut dyn fcap::Transport; 1] = [&mut loopback];
//! let mut middleware: [&mut dyn fcap::Middleware; 0] = [];
//!
//! let mut app = App::new(&mut transports, &mut middleware, Fielder);
//! app.poll().unwrap(); // one tick; nothing queued on the loopback yet
//! ```
//!
//! ## What the runtime does *not* do
//! No fragmentation (one datagram == one packet), no reliability or
//! encryption on top of the transport, no timers, and no correlation
//! table - responses carry the request's [`Id`] and matching it back to
//! an outstanding request is the embedder's business.

#![doc(html_root_url = "https://docs.rs/fcap/0.1.0")]
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(not(test),
            deny(missing_debug_implementations,
                 unreachable_pub,
                 unsafe_code,
                 missing_copy_implementations))]
#![cfg_attr(any(docsrs, feature = "docs"), feature(doc_cfg))]
#![deny(missing_docs)]

/// The application object and its poll/dispatch engine
pub mod app;

/// Events handed to middleware and handlers
pub mod event;

/// The ordered middleware pipeline
pub mod middleware;

/// The byte-level transport contract
pub mod transport;

/// Reference transports backed by `std::net`
#[cfg(feature = "std")]
#[cfg_attr(any(docsrs, feature = "docs"), doc(cfg(feature = "std")))]
pub mod std;

#[cfg(test)]
pub(crate) mod test;

#[doc(inline)]
pub use app::{App, Handler};
#[doc(inline)]
pub use event::{Direction, Event};
#[doc(inline)]
pub use fcap_msg::{Error, Id, Key, Packet, PktType, TryFromBytes, TryIntoBytes, Type, Value,
                   Version, HEADER_SIZE, MTU};
#[doc(inline)]
pub use middleware::{Control, Middleware};
#[doc(inline)]
pub use transport::Transport;

/// The well-known FCAP UDP port, `1024 + b'f' + b'c' + b'a' + b'p'`.
pub const PORT: u16 = 1434;
