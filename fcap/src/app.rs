use fcap_msg::{Error, Id, Key, Packet, PktType, TryIntoBytes, MTU};
use log::{debug, trace, warn};

use crate::event::{Direction, Event};
use crate::middleware::{Control, Middleware};
use crate::transport::Transport;

/// The application's callbacks, invoked once a packet has cleared the
/// middleware stack.
///
/// Both hooks default to [`Control::Continue`], so a pure client only
/// implements [`Handler::on_response`] and a pure server only
/// [`Handler::on_request`].
pub trait Handler {
  /// An inbound request survived the middleware chain.
  ///
  /// Fill `res` and return [`Control::Respond`] to answer it; the
  /// dispatcher stamps the request's id and the response type before
  /// emitting, so the handler only writes fields.
  fn on_request(&mut self, _event: &mut Event<'_>, _res: &mut Packet) -> Control {
    Control::Continue
  }

  /// An inbound response survived the middleware chain.
  ///
  /// Matching `event.pkt.id()` back to whichever outstanding request it
  /// answers is this handler's job; the runtime keeps no correlation
  /// table. [`Control::Respond`] is treated as [`Control::Continue`].
  fn on_response(&mut self, _event: &mut Event<'_>) -> Control {
    Control::Continue
  }
}

/// An FCAP application: a set of transports, an ordered middleware
/// stack, a user [`Handler`], and the two packet buffers everything
/// flows through.
///
/// The transport and middleware arrays are declared by the embedder and
/// borrowed here, so a whole application wires up on the stack with no
/// registration step and no allocation. One `App` is owned by one task;
/// nothing here is `Sync` and nothing needs to be.
///
/// `out` is where outbound requests are built (via the typed `add_*`
/// delegates or [`App::out_pkt`]) and where responses to inbound
/// requests materialize. `inb` receives whatever the transports deliver.
#[allow(missing_debug_implementations)]
pub struct App<'a, H> {
  transports: &'a mut [&'a mut dyn Transport],
  middleware: &'a mut [&'a mut dyn Middleware],
  handler: H,
  out: Packet,
  inb: Packet,
}

impl<'a, H: Handler> App<'a, H> {
  /// Bind an application to its transports, middleware and handler.
  pub fn new(transports: &'a mut [&'a mut dyn Transport],
             middleware: &'a mut [&'a mut dyn Middleware],
             handler: H)
             -> Self {
    Self { transports,
           middleware,
           handler,
           out: Packet::new(),
           inb: Packet::new() }
  }

  /// Reset both packet buffers to their pristine state.
  pub fn reset(&mut self) {
    self.out.reset();
    self.inb.reset();
  }

  /// Borrow the user handler.
  pub fn handler(&self) -> &H {
    &self.handler
  }

  /// Mutably borrow the user handler.
  pub fn handler_mut(&mut self) -> &mut H {
    &mut self.handler
  }

  /// The outbound packet buffer, for building the next request.
  ///
  /// Contents only live until the next [`App::send_request`]; see the
  /// ownership note there.
  pub fn out_pkt(&mut self) -> &mut Packet {
    &mut self.out
  }

  /// How many transports this application polls.
  pub fn num_transports(&self) -> usize {
    self.transports.len()
  }

  /// Send the packet built in the outbound buffer as a request on the
  /// transport at `transport` (its index in declared order).
  ///
  /// The request middleware chain runs front to back first. `Abort`
  /// surfaces as [`Error::Invalid`]; `Respond` means a middleware
  /// answered the request locally and the network send is skipped.
  ///
  /// The outbound buffer is reset afterward *unconditionally* - its
  /// contents are surrendered the moment they are handed over, and the
  /// caller rebuilds from scratch before the next send. Use it or lose
  /// it.
  pub fn send_request(&mut self, transport: usize) -> Result<(), Error> {
    let Self { transports,
               middleware,
               out,
               inb,
               .. } = self;

    let transport: &mut dyn Transport = match transports.get_mut(transport) {
      | Some(t) => &mut **t,
      | None => return Err(Error::Invalid),
    };

    let mut code = Control::Continue;
    for mw in middleware.iter_mut() {
      let mut event = Event { transport: &mut *transport,
                              pkt: &mut *out,
                              direction: Direction::Outbound };
      code = mw.on_request(&mut event, inb);
      if code != Control::Continue {
        break;
      }
    }

    let result = match code {
      | Control::Abort => Err(Error::Invalid),
      | Control::Respond => {
        // a middleware answered locally; nothing goes on the wire
        debug!("request handled locally by middleware");
        Ok(())
      },
      | Control::Continue => Self::emit(&mut *transport, out),
    };

    out.reset();
    result
  }

  /// One tick of the engine.
  ///
  /// Transports are polled in declared order. For each datagram that
  /// arrives: decode and validate it, walk it through the middleware
  /// stack back to front, hand it to the [`Handler`], and - for requests
  /// the handler (or a middleware) chose to answer - stamp, filter and
  /// emit the response on the transport the request came in on.
  ///
  /// Decode failures, handler aborts and transport failures surface as
  /// errors and end the tick early; the application stays usable and the
  /// next call picks up with a fresh inbound buffer.
  pub fn poll(&mut self) -> Result<(), Error> {
    for ix in 0..self.transports.len() {
      self.inb.reset();

      let mut buf = [0u8; MTU];
      let n = match self.transports[ix].recv_bytes(&mut buf) {
        | Ok(n) => n,
        | Err(nb::Error::WouldBlock) => continue,
        | Err(nb::Error::Other(e)) => return Err(e),
      };
      if n == 0 {
        continue;
      }

      trace!("transport {}: received {} byte datagram", ix, n);

      if let Err(e) = self.inb.decode_into(&buf[..n]) {
        warn!("transport {}: dropping undecodable datagram: {}", ix, e);
        return Err(e);
      }

      match self.inb.pkt_type() {
        | PktType::Request => self.dispatch_request(ix)?,
        | PktType::Response => self.dispatch_response(ix)?,
      }
    }

    Ok(())
  }

  /// Drive one inbound request through middleware, handler and the
  /// response emission path.
  fn dispatch_request(&mut self, ix: usize) -> Result<(), Error> {
    let Self { transports,
               middleware,
               handler,
               out,
               inb } = self;
    let transport: &mut dyn Transport = &mut *transports[ix];

    // the response slot is cleaned before any handler runs; whatever the
    // chain or the user writes into it from here on *is* the response
    out.reset();

    let mut code = Control::Continue;
    for mw in middleware.iter_mut().rev() {
      let mut event = Event { transport: &mut *transport,
                              pkt: &mut *inb,
                              direction: Direction::Inbound };
      code = mw.on_request(&mut event, out);
      if code != Control::Continue {
        break;
      }
    }

    if code == Control::Continue {
      let mut event = Event { transport: &mut *transport,
                              pkt: &mut *inb,
                              direction: Direction::Inbound };
      code = handler.on_request(&mut event, out);
    }

    match code {
      | Control::Abort => {
        debug!("request {:?} aborted", inb.id());
        Err(Error::Invalid)
      },
      | Control::Continue => Ok(()),
      | Control::Respond => {
        out.set_id(inb.id());
        out.set_pkt_type(PktType::Response);

        let mut code = Control::Continue;
        for mw in middleware.iter_mut() {
          let mut event = Event { transport: &mut *transport,
                                  pkt: &mut *out,
                                  direction: Direction::Outbound };
          code = mw.on_response(&mut event);
          if code != Control::Continue {
            break;
          }
        }

        let result = match code {
          | Control::Abort => {
            debug!("response to {:?} aborted", inb.id());
            Err(Error::Invalid)
          },
          | _ => Self::emit(&mut *transport, out),
        };

        out.reset();
        result
      },
    }
  }

  /// Drive one inbound response through middleware and the handler.
  fn dispatch_response(&mut self, ix: usize) -> Result<(), Error> {
    let Self { transports,
               middleware,
               handler,
               inb,
               .. } = self;
    let transport: &mut dyn Transport = &mut *transports[ix];

    let mut code = Control::Continue;
    for mw in middleware.iter_mut().rev() {
      let mut event = Event { transport: &mut *transport,
                              pkt: &mut *inb,
                              direction: Direction::Inbound };
      code = mw.on_response(&mut event);
      if code != Control::Continue {
        break;
      }
    }

    match code {
      | Control::Abort => return Err(Error::Invalid),
      // responding to a response is meaningless
      | Control::Respond => return Ok(()),
      | Control::Continue => {},
    }

    let mut event = Event { transport: &mut *transport,
                            pkt: &mut *inb,
                            direction: Direction::Inbound };
    match handler.on_response(&mut event) {
      | Control::Abort => Err(Error::Invalid),
      | _ => Ok(()),
    }
  }

  /// Serialize a packet and put it on the wire as one datagram.
  fn emit(transport: &mut dyn Transport, pkt: &Packet) -> Result<(), Error> {
    let mut buf = [0u8; MTU];
    let n = pkt.try_into_bytes(&mut buf)?;
    transport.send_bytes(&buf[..n])?;
    trace!("emitted {} byte {:?} {:?}", n, pkt.pkt_type(), pkt.id());
    Ok(())
  }
}

macro_rules! delegate_out {
  ($($add:ident / $get:ident: $ty:ty),+ $(,)?) => {
    impl<H: Handler> App<'_, H> {
      $(
        #[doc = concat!("Append a `",
                        stringify!($ty),
                        "` value to the outbound packet. Delegates to the codec.")]
        pub fn $add(&mut self, key: Key, value: $ty) -> Result<(), Error> {
          self.out.$add(key, value)
        }

        #[doc = concat!("Read a `",
                        stringify!($ty),
                        "` value back out of the outbound packet.")]
        pub fn $get(&self, key: Key) -> Result<$ty, Error> {
          self.out.$get(key)
        }
      )+
    }
  };
}

delegate_out! {
  add_u8 / get_u8: u8,
  add_u16 / get_u16: u16,
  add_i16 / get_i16: i16,
  add_i32 / get_i32: i32,
  add_i64 / get_i64: i64,
  add_f32 / get_f32: f32,
  add_f64 / get_f64: f64,
}

impl<H: Handler> App<'_, H> {
  /// Append a binary value to the outbound packet. Delegates to the
  /// codec.
  pub fn add_bin(&mut self, key: Key, bytes: &[u8]) -> Result<(), Error> {
    self.out.add_bin(key, bytes)
  }

  /// Borrow a binary value back out of the outbound packet.
  pub fn get_bin(&self, key: Key) -> Result<&[u8], Error> {
    self.out.get_bin(key)
  }

  /// Set the message id of the outbound packet.
  pub fn set_id(&mut self, id: Id) {
    self.out.set_id(id);
  }
}
