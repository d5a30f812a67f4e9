#![allow(dead_code)]

use fcap_msg::Error;

use crate::transport::Transport;

/// An in-memory transport: datagrams pushed into `rx` come out of
/// `recv_bytes` one per call, and everything sent lands in `tx`.
#[derive(Debug, Default)]
pub(crate) struct TubeTransport {
  /// Inbound datagrams, oldest first.
  pub(crate) rx: Vec<Vec<u8>>,
  /// Outbound datagrams, in emission order.
  pub(crate) tx: Vec<Vec<u8>>,
  /// When set, the next `recv_bytes` yields this error instead of data.
  pub(crate) recv_err: Option<Error>,
  /// When set, every `send_bytes` fails with this error.
  pub(crate) send_err: Option<Error>,
}

impl Transport for TubeTransport {
  fn send_bytes(&mut self, bytes: &[u8]) -> Result<usize, Error> {
    if let Some(err) = self.send_err {
      return Err(err);
    }

    self.tx.push(bytes.to_vec());
    Ok(bytes.len())
  }

  fn recv_bytes(&mut self, buf: &mut [u8]) -> nb::Result<usize, Error> {
    if let Some(err) = self.recv_err.take() {
      return Err(nb::Error::Other(err));
    }

    if self.rx.is_empty() {
      return Err(nb::Error::WouldBlock);
    }

    let dgram = self.rx.remove(0);
    buf[..dgram.len()].copy_from_slice(&dgram);
    Ok(dgram.len())
  }
}
