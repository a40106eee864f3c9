#[cfg(not(feature = "std"))]
use core::fmt;
#[cfg(feature = "std")]
use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Top-level error taxonomy for a transfer.
///
/// `Decode*`, `Timeout` and the protocol-level soft conditions are
/// absorbed by the state machines themselves and never escape `run()`;
/// what reaches the caller here is always one of the fatal kinds, or
/// `RetryExhausted` once a machine gives up on a soft condition.
#[derive(Debug)]
pub enum Error {
	/// A precondition was violated by the caller (e.g. an oversized
	/// payload handed to the codec).
	InvalidArgs,

	/// The codec rejected a received ADU.
	Decode(DecodeError),

	/// A blocking read returned no byte within its timeout.
	Timeout,

	/// The storage sink or source returned an error.
	Storage(StorageError),

	/// The transport returned a hard I/O error.
	Transport(PortError),

	/// A `CAN` byte was observed on the wire.
	Cancelled,

	/// `errorCount` reached `MAX_ERR_COUNT` before the transfer completed.
	RetryExhausted,

	/// An invariant of the state machine was violated.
	Internal,
}

impl From<DecodeError> for Error {
	fn from(err: DecodeError) -> Error {
		Error::Decode(err)
	}
}

impl From<StorageError> for Error {
	fn from(err: StorageError) -> Error {
		Error::Storage(err)
	}
}

impl From<PortError> for Error {
	fn from(err: PortError) -> Error {
		match err {
			PortError::Timeout => Error::Timeout,
			other => Error::Transport(other),
		}
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::InvalidArgs => write!(f, "invalid arguments"),
			Error::Decode(e) => write!(f, "packet decode error: {}", e),
			Error::Timeout => write!(f, "timed out waiting for a byte"),
			Error::Storage(e) => write!(f, "storage error: {}", e),
			Error::Transport(e) => write!(f, "transport error: {}", e),
			Error::Cancelled => write!(f, "transfer cancelled by peer"),
			Error::RetryExhausted => {
				write!(f, "exhausted retries before completing transfer")
			}
			Error::Internal => write!(f, "internal state machine error"),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Distinct reasons the codec can reject a received ADU.
///
/// Every variant counts as a soft error toward `MAX_ERR_COUNT` and
/// triggers a `NAK` from the receiver.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DecodeError {
	/// `preamble != SOH` (and not `STX`/`EOT` either).
	BadPreamble,

	/// `id ^ idComp != 0xFF`.
	BadId,

	/// The recomputed checksum/CRC does not match the trailer.
	BadCrc,
}

impl fmt::Display for DecodeError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			DecodeError::BadPreamble => write!(f, "bad preamble byte"),
			DecodeError::BadId => write!(f, "id/complement mismatch"),
			DecodeError::BadCrc => write!(f, "checksum or CRC mismatch"),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// Error surfaced by a [`crate::ports::TransportPort`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PortError {
	/// No byte arrived before the caller-supplied timeout elapsed.
	Timeout,

	/// A hard, non-recoverable transport failure.
	Io,
}

impl fmt::Display for PortError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			PortError::Timeout => write!(f, "timed out"),
			PortError::Io => write!(f, "i/o error"),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for PortError {}

/// Error surfaced by a [`crate::ports::StorageSink`] or
/// [`crate::ports::StorageSource`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StorageError {
	/// The underlying storage (file, flash region, ...) failed.
	Io,

	/// A caller-supplied reason, for sinks/sources that can't produce a
	/// richer error in a `no_std` context.
	Other(&'static str),
}

impl fmt::Display for StorageError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			StorageError::Io => write!(f, "storage i/o error"),
			StorageError::Other(msg) => write!(f, "storage error: {}", msg),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}
