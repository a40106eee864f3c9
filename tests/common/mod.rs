//! Shared test harness: two kinds of fake [`TransportPort`].
//!
//! [`ScriptedTransport`] drives a single machine (just the `Receiver` or
//! just the `Sender`) against a pre-recorded sequence of reads, so
//! timeouts, corruption, and duplicate delivery can be tested without
//! real wall-clock delay. [`loopback_pair`] wires up two transports over
//! channels so a real `Sender` and `Receiver` can run concurrently in
//! separate threads, the way the reference crate's own loopback test
//! does.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::mpsc::{sync_channel, Receiver as ChanRx, RecvTimeoutError, SyncSender};
use std::time::Duration;

use xmodem_core::error::PortError;
use xmodem_core::ports::{ClockPort, TransportPort};

/// A clock that doesn't actually sleep, for tests that shouldn't spend
/// real wall-clock time on retry back-off.
pub struct NoopClock;

impl ClockPort for NoopClock {
	fn sleep_ms(&mut self, _ms: u32) {}
}

enum ReadStep {
	Bytes(Vec<u8>),
	Timeout,
}

/// A single-ended transport driven by a pre-scripted sequence of reads.
/// Once the script is exhausted, every further read times out -- handy
/// for testing "the peer never responds again" scenarios without having
/// to script an explicit timeout for every remaining retry.
pub struct ScriptedTransport {
	reads: VecDeque<ReadStep>,
	pub written: Vec<u8>,
}

impl ScriptedTransport {
	pub fn new() -> Self {
		ScriptedTransport {
			reads: VecDeque::new(),
			written: Vec::new(),
		}
	}

	pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
		self.reads.push_back(ReadStep::Bytes(bytes.to_vec()));
		self
	}

	pub fn push_timeout(&mut self) -> &mut Self {
		self.reads.push_back(ReadStep::Timeout);
		self
	}
}

impl TransportPort for ScriptedTransport {
	fn read(&mut self, buf: &mut [u8], _timeout_ms: u32) -> Result<(), PortError> {
		match self.reads.pop_front() {
			Some(ReadStep::Bytes(bytes)) => {
				assert_eq!(
					bytes.len(),
					buf.len(),
					"scripted read length mismatch: script has {}, caller wanted {}",
					bytes.len(),
					buf.len()
				);
				buf.copy_from_slice(&bytes);
				Ok(())
			}
			Some(ReadStep::Timeout) => Err(PortError::Timeout),
			None => Err(PortError::Timeout),
		}
	}

	fn write(&mut self, buf: &[u8], _timeout_ms: u32) -> Result<(), PortError> {
		self.written.extend_from_slice(buf);
		Ok(())
	}
}

/// A transport backed by a pair of bounded channels, for running a real
/// `Sender` and `Receiver` concurrently against each other.
pub struct ChannelTransport {
	rx: ChanRx<u8>,
	tx: SyncSender<u8>,
	timeout: Duration,
}

impl TransportPort for ChannelTransport {
	fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<(), PortError> {
		let timeout = if timeout_ms == 0 {
			self.timeout
		} else {
			Duration::from_millis(timeout_ms as u64)
		};
		for slot in buf.iter_mut() {
			match self.rx.recv_timeout(timeout) {
				Ok(byte) => *slot = byte,
				Err(RecvTimeoutError::Timeout) => return Err(PortError::Timeout),
				Err(RecvTimeoutError::Disconnected) => return Err(PortError::Io),
			}
		}
		Ok(())
	}

	fn write(&mut self, buf: &[u8], _timeout_ms: u32) -> Result<(), PortError> {
		for &byte in buf {
			self.tx.send(byte).map_err(|_| PortError::Io)?;
		}
		Ok(())
	}
}

/// Builds a connected pair of [`ChannelTransport`]s. `timeout` should be
/// generous enough to never fire on the happy path but short enough that
/// a genuinely hung test fails fast.
pub fn loopback_pair(timeout: Duration) -> (ChannelTransport, ChannelTransport) {
	let (tx_a, rx_a) = sync_channel(4096);
	let (tx_b, rx_b) = sync_channel(4096);
	(
		ChannelTransport { rx: rx_a, tx: tx_b, timeout },
		ChannelTransport { rx: rx_b, tx: tx_a, timeout },
	)
}
