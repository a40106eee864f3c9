use crate::codec::BlockLength;

/// Timeout, in milliseconds, used by every state that blocks on a single
/// byte from the transport.
pub const START_TIMEOUT_MS: u32 = 3000;

/// Number of consecutive soft errors a machine tolerates before it
/// terminates with [`crate::Error::RetryExhausted`].
pub const MAX_ERR_COUNT: u32 = 15;

/// Tunables shared by [`crate::Receiver`] and [`crate::Sender`].
///
/// Constructed once per shell command and handed to the machine; nothing
/// here is mutated during a transfer.
#[derive(Copy, Clone, Debug)]
pub struct XmodemConfig {
	/// Consecutive soft-error cap. See [`MAX_ERR_COUNT`].
	pub max_errors: u32,

	/// Byte used to pad the final, short block.
	pub pad_byte: u8,

	/// Block size negotiated for this transfer. The shell's default
	/// command path only ever uses [`BlockLength::Standard`].
	pub block_length: BlockLength,

	/// Timeout applied to every single-byte wait.
	pub start_timeout_ms: u32,

	/// Delay, via [`crate::ports::ClockPort`], the sender waits before
	/// retransmitting a block after a `NAK`. Zero disables the back-off.
	pub retry_backoff_ms: u32,
}

impl Default for XmodemConfig {
	fn default() -> Self {
		XmodemConfig {
			max_errors: MAX_ERR_COUNT,
			pad_byte: crate::codec::SUB,
			block_length: BlockLength::Standard,
			start_timeout_ms: START_TIMEOUT_MS,
			retry_backoff_ms: 0,
		}
	}
}
