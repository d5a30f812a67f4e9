//! Sends one FCAP request to the example server and waits for the
//! response.

use std::time::Duration;

use fcap::std::Udp;
use fcap::{App, Control, Event, Handler, Id, Key, Middleware, Transport, PORT};

#[derive(Default)]
struct PrintResponse {
  done: bool,
}

impl Handler for PrintResponse {
  fn on_response(&mut self, event: &mut Event<'_>) -> Control {
    log::info!("response {:?}: {:?}", event.pkt.id(), event.pkt);
    self.done = true;
    Control::Continue
  }
}

fn main() {
  simple_logger::init_with_level(log::Level::Debug).unwrap();

  let mut udp = Udp::bind(("127.0.0.1", PORT + 1), ("127.0.0.1", PORT)).unwrap();
  let mut transports: [&mut dyn Transport; 1] = [&mut udp];
  let mut middleware: [&mut dyn Middleware; 0] = [];
  let mut app = App::new(&mut transports, &mut middleware, PrintResponse::default());

  app.set_id(Id(7));
  app.add_f32(Key::A, 12.34).unwrap();
  app.send_request(0).unwrap();
  log::info!("request 7 sent, polling for the response");

  while !app.handler().done {
    if let Err(e) = app.poll() {
      log::warn!("poll failed: {}", e);
    }
    std::thread::sleep(Duration::from_millis(10));
  }
}
