use fcap_msg::Error;

/// A byte-level datagram capability: something packets can be sent over
/// and received from.
///
/// Transports are externally owned; an [`App`](crate::App) borrows them
/// for its lifetime. The trait is object-safe so an application can hold
/// a mixed bag of them (UDP next to a serial link next to a test tube).
///
/// Both operations are strictly non-blocking. An implementation that has
/// to wait for I/O must time-slice and report
/// [`nb::Error::WouldBlock`] so the poll loop can move on.
pub trait Transport {
  /// Transmit `bytes` as exactly one datagram.
  ///
  /// Yields the number of bytes sent, which must equal `bytes.len()`; a
  /// short send is a transport failure, not a partial success.
  fn send_bytes(&mut self, bytes: &[u8]) -> Result<usize, Error>;

  /// Pull at most one whole datagram into `buf`.
  ///
  /// Yields the datagram's length, [`nb::Error::WouldBlock`] when nothing
  /// is ready, or a real error. Partial datagrams must never be
  /// delivered: the wire is datagram-oriented and one call maps to one
  /// packet.
  fn recv_bytes(&mut self, buf: &mut [u8]) -> nb::Result<usize, Error>;
}
