//! The sender (client) role: waits for the receiver's handshake, reads
//! bounded chunks from a storage source, frames and (re)transmits them,
//! and performs the EOT handshake once the source is exhausted.

use ::log::{debug, info, warn};

use crate::codec::{self, BlockLength, Checksum, ACK, CAN, EOT, NAK, CRC};
use crate::config::XmodemConfig;
use crate::error::Error;
use crate::fsm::{self, Outcome};
use crate::ports::{ClockPort, StorageSource, TransportPort};

#[derive(Copy, Clone, Debug)]
enum Phase {
	WaitHandshake,
	Send,
	WaitResp,
	Eot,
}

/// Drives one send transfer. Constructed fresh for each shell command;
/// owns nothing but its configuration and a scratch buffer for the
/// duration of `run`.
pub struct Sender {
	config: XmodemConfig,
}

impl Sender {
	pub fn new(config: XmodemConfig) -> Self {
		Sender { config }
	}

	/// Pulls bytes from `source` and frames them into packets until the
	/// source is exhausted, then performs the EOT handshake.
	///
	/// The checksum mode is not a parameter: it is negotiated from the
	/// handshake byte the receiver sends (`C` requests CRC-16, `NAK`
	/// requests the legacy checksum), exactly as the wire protocol
	/// specifies.
	///
	/// `clock` backs off for `config.retry_backoff_ms` before every
	/// retransmission triggered by a `NAK`; pass a no-op [`ClockPort`] to
	/// disable the delay outright, or set `retry_backoff_ms` to `0`.
	pub fn run<T, R, C>(
		&mut self,
		transport: &mut T,
		source: &mut R,
		clock: &mut C,
	) -> Result<(), Error>
	where
		T: TransportPort,
		R: StorageSource,
		C: ClockPort,
	{
		let block_length = self.config.block_length;
		let pad_byte = self.config.pad_byte;
		let timeout_ms = self.config.start_timeout_ms;
		let max_errors = self.config.max_errors;
		let retry_backoff_ms = self.config.retry_backoff_ms;

		let pdu_len = block_length.pdu_len();
		let mut buf = [0u8; codec::adu_len(BlockLength::Standard, Checksum::Crc16)];
		let mut payload_buf = [0u8; codec::PDU_LEN_1K];

		let mut mode = Checksum::Crc16;
		let mut next_id: u8 = 1;
		let mut byte_offset: u64 = 0;
		let mut chunk_len: usize = 0;

		debug!("starting XMODEM send");

		fsm::run_to_completion(Phase::WaitHandshake, max_errors, |phase| -> Outcome<Phase> {
			match phase {
				Phase::WaitHandshake => match transport.read(&mut buf[..1], timeout_ms) {
					Ok(()) => match buf[0] {
						CRC => {
							debug!("16-bit CRC requested");
							mode = Checksum::Crc16;
							next_id = 1;
							byte_offset = 0;
							Outcome::Reset(Phase::Send)
						}
						NAK => {
							debug!("standard checksum requested");
							mode = Checksum::Standard;
							next_id = 1;
							byte_offset = 0;
							Outcome::Reset(Phase::Send)
						}
						CAN => Outcome::Fatal(Error::Cancelled),
						other => {
							warn!("unexpected byte {:#x} waiting for handshake", other);
							Outcome::SoftError(Phase::WaitHandshake)
						}
					},
					Err(crate::error::PortError::Timeout) => {
						Outcome::SoftError(Phase::WaitHandshake)
					}
					Err(e) => Outcome::Fatal(e.into()),
				},

				Phase::Send => {
					match source.read(byte_offset, &mut payload_buf[..pdu_len]) {
						Ok(0) => {
							debug!("reached end of source");
							Outcome::Continue(Phase::Eot)
						}
						Ok(n) => {
							chunk_len = n;
							codec::encode(
								&mut buf,
								&payload_buf[..n],
								next_id,
								mode,
								block_length,
								pad_byte,
							);
							let adu_len = codec::adu_len(block_length, mode);
							debug!("sending block {}", next_id);
							match transport.write(&buf[..adu_len], timeout_ms) {
								Ok(()) => Outcome::Continue(Phase::WaitResp),
								Err(e) => Outcome::Fatal(e.into()),
							}
						}
						Err(e) => Outcome::Fatal(Error::Storage(e)),
					}
				}

				Phase::WaitResp => match transport.read(&mut buf[..1], timeout_ms) {
					Ok(()) => match buf[0] {
						ACK => {
							debug!("received ACK for block {}", next_id);
							byte_offset += chunk_len as u64;
							next_id = next_id.wrapping_add(1);
							Outcome::Reset(Phase::Send)
						}
						NAK => {
							warn!("received NAK for block {}, retransmitting", next_id);
							clock.sleep_ms(retry_backoff_ms);
							Outcome::SoftError(Phase::Send)
						}
						CAN => Outcome::Fatal(Error::Cancelled),
						other => {
							warn!("expected ACK/NAK, got {:#x}", other);
							Outcome::SoftError(Phase::WaitResp)
						}
					},
					Err(crate::error::PortError::Timeout) => {
						warn!("timed out waiting for ACK for block {}", next_id);
						Outcome::SoftError(Phase::WaitResp)
					}
					Err(e) => Outcome::Fatal(e.into()),
				},

				Phase::Eot => {
					if let Err(e) = transport.write(&[EOT], timeout_ms) {
						return Outcome::Fatal(e.into());
					}
					match transport.read(&mut buf[..1], timeout_ms) {
						Ok(()) => match buf[0] {
							ACK => {
								info!("XMODEM transmission successful");
								Outcome::Done
							}
							other => {
								warn!("expected ACK for EOT, got {:#x}", other);
								Outcome::SoftError(Phase::Eot)
							}
						},
						Err(crate::error::PortError::Timeout) => {
							warn!("timed out waiting for ACK for EOT");
							Outcome::SoftError(Phase::Eot)
						}
						Err(e) => Outcome::Fatal(e.into()),
					}
				}
			}
		})
	}
}
