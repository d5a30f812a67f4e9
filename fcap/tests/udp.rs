//! Request/response round-trip over loopback UDP.

#![cfg(feature = "std")]

use std::net::UdpSocket;
use std::time::Duration;

use fcap::std::Udp;
use fcap::{App, Control, Error, Event, Handler, Id, Key, Middleware, Packet, Transport};

/// Answers `{A: f32}` requests with `{A: <echo>, B: 58}`.
struct FieldServer {
  served: usize,
}

impl Handler for FieldServer {
  fn on_request(&mut self, event: &mut Event<'_>, res: &mut Packet) -> Control {
    let reading = match event.pkt.get_f32(Key::A) {
      | Ok(v) => v,
      | Err(_) => return Control::Abort,
    };

    res.add_f32(Key::A, reading).unwrap();
    res.add_i64(Key::B, 58).unwrap();
    self.served += 1;
    Control::Respond
  }
}

/// Remembers the responses it sees.
#[derive(Default)]
struct FieldClient {
  got: Option<(Id, f32, i64)>,
}

impl Handler for FieldClient {
  fn on_response(&mut self, event: &mut Event<'_>) -> Control {
    let a = event.pkt.get_f32(Key::A).unwrap();
    let b = event.pkt.get_i64(Key::B).unwrap();
    self.got = Some((event.pkt.id(), a, b));
    Control::Continue
  }
}

fn transport_pair() -> (Udp, Udp) {
  let a = UdpSocket::bind("127.0.0.1:0").unwrap();
  let b = UdpSocket::bind("127.0.0.1:0").unwrap();
  let a_addr = a.local_addr().unwrap();
  let b_addr = b.local_addr().unwrap();

  (Udp::from_socket(a, b_addr).unwrap(), Udp::from_socket(b, a_addr).unwrap())
}

fn tick<H: Handler>(app: &mut App<'_, H>) -> Result<(), Error> {
  std::thread::sleep(Duration::from_millis(5));
  app.poll()
}

#[test]
fn round_trip_over_loopback() {
  let (mut client_udp, mut server_udp) = transport_pair();

  let mut server_transports: [&mut dyn Transport; 1] = [&mut server_udp];
  let mut server_middleware: [&mut dyn Middleware; 0] = [];
  let mut server = App::new(&mut server_transports,
                            &mut server_middleware,
                            FieldServer { served: 0 });

  let mut client_transports: [&mut dyn Transport; 1] = [&mut client_udp];
  let mut client_middleware: [&mut dyn Middleware; 0] = [];
  let mut client = App::new(&mut client_transports,
                            &mut client_middleware,
                            FieldClient::default());

  client.set_id(Id(7));
  client.add_f32(Key::A, 12.34).unwrap();
  client.send_request(0).unwrap();

  // the out buffer was surrendered at send
  assert_eq!(client.out_pkt().num_keys(), 0);

  for _ in 0..100 {
    tick(&mut server).unwrap();
    tick(&mut client).unwrap();
    if client.handler().got.is_some() {
      break;
    }
  }

  let (id, a, b) = client.handler().got.expect("no response within budget");
  assert_eq!(id, Id(7));
  assert_eq!(a, 12.34);
  assert_eq!(b, 58);
  assert_eq!(server.handler().served, 1);
}
