use fcap_msg::Packet;

use crate::event::Event;

/// Verdict returned by every middleware and user handler.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Control {
  /// Drop the packet; the dispatcher surfaces an error.
  Abort,
  /// Proceed to the next handler in the traversal (or, when none remain,
  /// to the user callback).
  Continue,
  /// From a request handler: the response slot has been filled, emit it
  /// now without consulting anything further down the chain.
  ///
  /// Responding to a response is meaningless, so in the response
  /// direction this carries no emission semantics. From a middleware's
  /// [`Middleware::on_response`] it still terminates dispatch of the
  /// inbound response (the user handler is not invoked); from the user
  /// handler's own `on_response` it is treated as [`Control::Continue`].
  Respond,
}

/// An ordered, short-circuiting stage in the packet pipeline.
///
/// Middleware are externally owned; an [`App`](crate::App) holds them as
/// an ordered sequence of borrows and walks that sequence forward for
/// outbound events and in reverse for inbound ones (see
/// [`Direction`](crate::Direction)).
///
/// Both hooks default to [`Control::Continue`], so a middleware that only
/// cares about one direction implements one method and ignores the other.
/// Any non-`Continue` verdict terminates the traversal immediately.
///
/// ```
/// use fcap::{Control, Event, Key, Middleware, Packet};
///
/// /// Tags every request that passes through with a device id.
/// struct DeviceTag(u8);
///
/// impl Middleware for DeviceTag {
///   fn on_request(&mut self, event: &mut Event<'_>, _res: &mut Packet) -> Control {
///     event.pkt.add_u8(Key::Af, self.0).ok();
///     Control::Continue
///   }
/// }
/// ```
pub trait Middleware {
  /// Inspect or mutate a request.
  ///
  /// For inbound requests `res` is the application's response slot: a
  /// middleware may fill it and return [`Control::Respond`] to answer
  /// locally, short-circuiting the rest of the chain and the user
  /// callback. For outbound requests `res` is the application's inbound
  /// buffer, free for the same purpose until the next poll tick.
  fn on_request(&mut self, _event: &mut Event<'_>, _res: &mut Packet) -> Control {
    Control::Continue
  }

  /// Inspect or mutate a response.
  fn on_response(&mut self, _event: &mut Event<'_>) -> Control {
    Control::Continue
  }
}
