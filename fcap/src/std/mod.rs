use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use fcap_msg::Error;

use crate::transport::Transport;

/// The reference FCAP transport: a bound, non-blocking UDP socket with a
/// single fixed peer.
///
/// Datagrams arriving from any other address are silently discarded -
/// an FCAP transport is a point-to-point byte pipe, and whoever else is
/// shouting at the socket is not our peer.
///
/// ```no_run
/// use fcap::std::Udp;
///
/// let udp = Udp::bind(("0.0.0.0", fcap::PORT), ("192.168.1.40", fcap::PORT)).unwrap();
/// ```
#[derive(Debug)]
pub struct Udp {
  sock: UdpSocket,
  peer: SocketAddr,
}

impl Udp {
  /// Bind a local UDP socket and fix the peer all packets go to and come
  /// from.
  pub fn bind<L: ToSocketAddrs, P: ToSocketAddrs>(local: L, peer: P) -> io::Result<Self> {
    Self::from_socket(UdpSocket::bind(local)?, peer)
  }

  /// Wrap an already-bound socket. Puts it into non-blocking mode.
  pub fn from_socket<P: ToSocketAddrs>(sock: UdpSocket, peer: P) -> io::Result<Self> {
    sock.set_nonblocking(true)?;
    let peer = peer.to_socket_addrs()?
                   .next()
                   .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no peer address"))?;

    Ok(Self { sock, peer })
  }

  /// The peer this transport exchanges packets with.
  pub fn peer(&self) -> SocketAddr {
    self.peer
  }

  /// The local address the socket is bound to.
  pub fn local_addr(&self) -> io::Result<SocketAddr> {
    self.sock.local_addr()
  }
}

impl Transport for Udp {
  fn send_bytes(&mut self, bytes: &[u8]) -> Result<usize, Error> {
    match self.sock.send_to(bytes, self.peer) {
      | Ok(n) if n == bytes.len() => Ok(n),
      | Ok(_) | Err(_) => Err(Error::Invalid),
    }
  }

  fn recv_bytes(&mut self, buf: &mut [u8]) -> nb::Result<usize, Error> {
    loop {
      match self.sock.recv_from(buf) {
        | Ok((n, from)) if from == self.peer => return Ok(n),
        // a stranger's datagram; drop it and look again
        | Ok(_) => continue,
        | Err(e) => return Err(io_to_nb(e)),
      }
    }
  }
}

fn io_to_nb(err: io::Error) -> nb::Error<Error> {
  match err.kind() {
    | io::ErrorKind::WouldBlock => nb::Error::WouldBlock,
    | _ => nb::Error::Other(Error::Invalid),
  }
}
