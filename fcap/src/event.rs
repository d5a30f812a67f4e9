use fcap_msg::Packet;

use crate::transport::Transport;

/// Which way a packet is travelling through the middleware stack.
///
/// Direction decides traversal order: outbound events walk the stack
/// front to back, inbound events back to front, so the middleware that
/// wraps an outbound request is the first to see the matching inbound
/// response - the classic onion.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
  /// The packet is about to leave through a transport.
  Outbound,
  /// The packet just arrived from a transport.
  Inbound,
}

/// A packet in flight: the transport it belongs to, the packet itself,
/// and which way it is going.
///
/// Handlers receive events by exclusive borrow for the duration of one
/// call and may mutate the packet in place; mutations are visible to
/// every later handler in the traversal.
#[allow(missing_debug_implementations)]
pub struct Event<'a> {
  /// The transport this packet arrived on or will leave through.
  pub transport: &'a mut dyn Transport,
  /// The packet under consideration.
  pub pkt: &'a mut Packet,
  /// Which way the packet is travelling.
  pub direction: Direction,
}
