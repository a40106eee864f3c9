//! The capability set a transfer is driven through. Contracts only:
//! nothing in this module performs I/O. An external collaborator (the
//! virtual comm port driver, the file-system layer) implements these
//! traits; the state machines just borrow them for the duration of a
//! `run()` call.

use crate::error::{PortError, StorageError};

/// A byte-stream transport with explicit, per-call timeouts.
///
/// Unlike `std::io::Read`/`Write`, the timeout is part of the call, not
/// configured out-of-band on the device handle. This is what lets the
/// same trait serve both a `std` socket wrapper and a bare-metal UART
/// driver with no OS-level timeout of its own.
pub trait TransportPort {
	/// Blocks until `buf` is filled or `timeout_ms` elapses.
	fn read(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<(), PortError>;

	/// Blocks until all of `buf` has been transmitted or a hard error
	/// occurs. Unlike `read`, exceeding `timeout_ms` here is always a
	/// fatal [`PortError::Io`]. See the timeout-policy note on
	/// [`crate::Sender::run`] and [`crate::Receiver::run`].
	fn write(&mut self, buf: &[u8], timeout_ms: u32) -> Result<(), PortError>;
}

/// A monotonic millisecond clock, used for retry back-off.
pub trait ClockPort {
	fn sleep_ms(&mut self, ms: u32);
}

/// Receiver-side storage: an append-only sink for accepted payloads.
pub trait StorageSink {
	fn write(&mut self, bytes: &[u8]) -> Result<(), StorageError>;
}

/// Sender-side storage: a random-access byte source.
///
/// `read` returns the number of bytes copied into `buf`, or `0` once
/// `offset` has reached the end of the source. That's the sender's
/// only EOF signal.
pub trait StorageSource {
	fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, StorageError>;
}

#[cfg(any(feature = "std", feature = "core"))]
mod io_transport {
	use super::*;

	#[cfg(feature = "std")]
	use std::io::{self, Read, Write};

	#[cfg(all(feature = "core", not(feature = "std")))]
	use core_io::{self as io, Read, Write};

	/// Adapts any blocking `Read + Write` device into a [`TransportPort`].
	///
	/// `timeout_ms` is informational only: as in the reference
	/// implementation, this type has no way to impose a timeout on `D`
	/// itself, so the caller is responsible for configuring one on the
	/// underlying device (e.g. a serial port's read timeout). A
	/// `TimedOut` error from `D` is translated to [`PortError::Timeout`];
	/// anything else is a hard [`PortError::Io`].
	pub struct IoTransport<D> {
		pub dev: D,
	}

	impl<D> IoTransport<D> {
		pub fn new(dev: D) -> Self {
			IoTransport { dev }
		}

		pub fn into_inner(self) -> D {
			self.dev
		}
	}

	impl<D: Read + Write> TransportPort for IoTransport<D> {
		fn read(&mut self, buf: &mut [u8], _timeout_ms: u32) -> Result<(), PortError> {
			match self.dev.read_exact(buf) {
				Ok(()) => Ok(()),
				Err(err) => {
					if err.kind() == io::ErrorKind::TimedOut {
						Err(PortError::Timeout)
					} else {
						Err(PortError::Io)
					}
				}
			}
		}

		fn write(&mut self, buf: &[u8], _timeout_ms: u32) -> Result<(), PortError> {
			self.dev.write_all(buf).map_err(|_| PortError::Io)
		}
	}
}

#[cfg(any(feature = "std", feature = "core"))]
pub use io_transport::IoTransport;

#[cfg(feature = "std")]
mod std_storage {
	use super::*;
	use std::io::{Read, Seek, SeekFrom, Write};

	/// An in-memory [`StorageSink`] over a growable `Vec<u8>`.
	#[derive(Default)]
	pub struct VecSink {
		pub data: Vec<u8>,
	}

	impl StorageSink for VecSink {
		fn write(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
			self.data.extend_from_slice(bytes);
			Ok(())
		}
	}

	/// A [`StorageSource`] over an in-memory byte slice.
	pub struct SliceSource<'a> {
		data: &'a [u8],
	}

	impl<'a> SliceSource<'a> {
		pub fn new(data: &'a [u8]) -> Self {
			SliceSource { data }
		}
	}

	impl StorageSource for SliceSource<'_> {
		fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, StorageError> {
			let offset = offset as usize;
			if offset >= self.data.len() {
				return Ok(0);
			}
			let n = core::cmp::min(buf.len(), self.data.len() - offset);
			buf[..n].copy_from_slice(&self.data[offset..offset + n]);
			Ok(n)
		}
	}

	/// A [`StorageSink`] that appends to an open file. This is the shape
	/// the shell's `write <name>` command actually hands to the receiver.
	pub struct FileSink<F> {
		file: F,
	}

	impl<F: Write> FileSink<F> {
		pub fn new(file: F) -> Self {
			FileSink { file }
		}
	}

	impl<F: Write> StorageSink for FileSink<F> {
		fn write(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
			self.file.write_all(bytes).map_err(|_| StorageError::Io)
		}
	}

	/// A [`StorageSource`] that reads from an open, seekable file.
	pub struct FileSource<F> {
		file: F,
	}

	impl<F: Read + Seek> FileSource<F> {
		pub fn new(file: F) -> Self {
			FileSource { file }
		}
	}

	impl<F: Read + Seek> StorageSource for FileSource<F> {
		fn read(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, StorageError> {
			self.file
				.seek(SeekFrom::Start(offset))
				.map_err(|_| StorageError::Io)?;
			let mut total = 0;
			while total < buf.len() {
				match self.file.read(&mut buf[total..]) {
					Ok(0) => break,
					Ok(n) => total += n,
					Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
					Err(_) => return Err(StorageError::Io),
				}
			}
			Ok(total)
		}
	}
}

#[cfg(feature = "std")]
pub use std_storage::{FileSink, FileSource, SliceSource, VecSink};
