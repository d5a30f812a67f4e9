//! A small FCAP field server on loopback UDP.
//!
//! Run this first, then `cargo run --example client` in another shell.

use std::time::Duration;

use fcap::std::Udp;
use fcap::{App, Control, Event, Handler, Key, Middleware, Packet, Transport, PORT};

/// Answers requests for field A with the reading echoed back and an
/// uptime counter in B.
struct FieldServer {
  served: i64,
}

impl Handler for FieldServer {
  fn on_request(&mut self, event: &mut Event<'_>, res: &mut Packet) -> Control {
    log::info!("request {:?}: {:?}", event.pkt.id(), event.pkt);

    if let Ok(reading) = event.pkt.get_f32(Key::A) {
      res.add_f32(Key::A, reading).unwrap();
    }

    self.served += 1;
    res.add_i64(Key::B, self.served).unwrap();
    Control::Respond
  }
}

fn main() {
  simple_logger::init_with_level(log::Level::Debug).unwrap();

  let mut udp = Udp::bind(("127.0.0.1", PORT), ("127.0.0.1", PORT + 1)).unwrap();
  let mut transports: [&mut dyn Transport; 1] = [&mut udp];
  let mut middleware: [&mut dyn Middleware; 0] = [];
  let mut app = App::new(&mut transports, &mut middleware, FieldServer { served: 0 });

  log::info!("field server listening on udp/{}", PORT);

  loop {
    if let Err(e) = app.poll() {
      log::warn!("dropped a packet: {}", e);
    }
    std::thread::sleep(Duration::from_millis(10));
  }
}
