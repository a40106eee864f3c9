//! The receiver (server) role: negotiates a handshake, accepts packets,
//! verifies them, writes accepted payloads to storage, and terminates on
//! a clean EOT handshake.

use ::log::{debug, warn};

use crate::codec::{self, BlockLength, Checksum, ACK, CAN, CRC, EOT, NAK, SOH};
use crate::config::XmodemConfig;
use crate::error::Error;
use crate::fsm::{self, Outcome};
use crate::ports::{StorageSink, TransportPort};

#[derive(Copy, Clone, Debug)]
enum Phase {
	Start,
	PacketGet,
	PacketProc,
	AwaitNext,
	End,
}

/// Drives one receive transfer. Constructed fresh for each shell
/// command; owns nothing but its configuration and a scratch buffer for
/// the duration of `run`.
pub struct Receiver {
	config: XmodemConfig,
}

impl Receiver {
	pub fn new(config: XmodemConfig) -> Self {
		Receiver { config }
	}

	/// Drains bytes from `transport` into `sink` until EOT is received
	/// and acknowledged.
	///
	/// `mode` picks the handshake byte this receiver advertises (`C` for
	/// CRC-16, `NAK` for the legacy checksum) and the trailer format it
	/// expects on every packet.
	pub fn run<T, S>(
		&mut self,
		transport: &mut T,
		sink: &mut S,
		mode: Checksum,
	) -> Result<(), Error>
	where
		T: TransportPort,
		S: StorageSink,
	{
		let block_length = self.config.block_length;
		let timeout_ms = self.config.start_timeout_ms;
		let max_errors = self.config.max_errors;
		let handshake_byte = match mode {
			Checksum::Standard => NAK,
			Checksum::Crc16 => CRC,
		};

		let adu_len = codec::adu_len(block_length, mode);
		let mut buf = [0u8; codec::adu_len(BlockLength::Standard, Checksum::Crc16)];

		let mut expected_id: u8 = 1;
		let mut last_acked: Option<u8> = None;

		debug!("starting XMODEM receive");

		fsm::run_to_completion(Phase::Start, max_errors, |phase| -> Outcome<Phase> {
			match phase {
				Phase::Start => match transport.read(&mut buf[..1], timeout_ms) {
					Ok(()) => match buf[0] {
						SOH => Outcome::Continue(Phase::PacketGet),
						// A sender with nothing to send goes straight from
						// SEND to EOT, so the receiver can see EOT here
						// before it ever sees a packet.
						EOT => Outcome::Continue(Phase::End),
						CAN => Outcome::Fatal(Error::Cancelled),
						other => {
							warn!("unexpected byte {:#x} waiting for start of transfer", other);
							Outcome::SoftError(Phase::Start)
						}
					},
					Err(crate::error::PortError::Timeout) => {
						if let Err(e) = transport.write(&[handshake_byte], timeout_ms) {
							return Outcome::Fatal(e.into());
						}
						Outcome::SoftError(Phase::Start)
					}
					Err(e) => Outcome::Fatal(e.into()),
				},

				Phase::PacketGet => match transport.read(&mut buf[1..adu_len], timeout_ms) {
					Ok(()) => Outcome::Continue(Phase::PacketProc),
					Err(crate::error::PortError::Timeout) => {
						warn!("timed out mid-packet");
						Outcome::SoftError(Phase::AwaitNext)
					}
					Err(e) => Outcome::Fatal(e.into()),
				},

				Phase::PacketProc => {
					match codec::decode(&buf[..adu_len], mode, block_length) {
						Err(decode_err) => {
							warn!("packet rejected: {}", decode_err);
							if let Err(e) = transport.write(&[NAK], timeout_ms) {
								return Outcome::Fatal(e.into());
							}
							Outcome::SoftError(Phase::AwaitNext)
						}
						Ok(decoded) if Some(decoded.id) == last_acked => {
							debug!("duplicate packet {}, not re-writing", decoded.id);
							if let Err(e) = transport.write(&[ACK], timeout_ms) {
								return Outcome::Fatal(e.into());
							}
							Outcome::Continue(Phase::AwaitNext)
						}
						Ok(decoded) if decoded.id == expected_id => {
							if let Err(e) = sink.write(decoded.payload) {
								return Outcome::Fatal(Error::Storage(e));
							}
							if let Err(e) = transport.write(&[ACK], timeout_ms) {
								return Outcome::Fatal(e.into());
							}
							last_acked = Some(expected_id);
							expected_id = expected_id.wrapping_add(1);
							Outcome::Reset(Phase::AwaitNext)
						}
						Ok(decoded) => {
							warn!(
								"packet id {} matches neither expected {} nor last-acked",
								decoded.id, expected_id
							);
							if let Err(e) = transport.write(&[NAK], timeout_ms) {
								return Outcome::Fatal(e.into());
							}
							Outcome::SoftError(Phase::AwaitNext)
						}
					}
				}

				Phase::AwaitNext => match transport.read(&mut buf[..1], timeout_ms) {
					Ok(()) => match buf[0] {
						SOH => Outcome::Continue(Phase::PacketGet),
						EOT => Outcome::Continue(Phase::End),
						CAN => Outcome::Fatal(Error::Cancelled),
						other => {
							warn!("unexpected byte {:#x} awaiting next packet", other);
							Outcome::SoftError(Phase::AwaitNext)
						}
					},
					Err(crate::error::PortError::Timeout) => Outcome::SoftError(Phase::AwaitNext),
					Err(e) => Outcome::Fatal(e.into()),
				},

				Phase::End => match transport.write(&[ACK], timeout_ms) {
					Ok(()) => Outcome::Done,
					Err(e) => Outcome::Fatal(e.into()),
				},
			}
		})
	}
}
