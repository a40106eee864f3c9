//! Pure ADU (Application Data Unit) framing: no I/O, no state beyond what's
//! passed in. `decode(encode(p, id))` round-trips for any payload and id,
//! which is what makes this half property-testable without a transport.

use crate::error::DecodeError;

pub const SOH: u8 = 0x01;
pub const STX: u8 = 0x02;
pub const EOT: u8 = 0x04;
pub const ACK: u8 = 0x06;
pub const NAK: u8 = 0x15;
pub const CAN: u8 = 0x18;
pub const CRC: u8 = 0x43;

/// Substitution byte used to pad a short final block.
pub const SUB: u8 = 0x1a;

/// Size of the payload (PDU) carried by a standard 128-byte block.
pub const PDU_LEN_STANDARD: usize = 128;

/// Size of the payload carried by an XMODEM-1k block.
pub const PDU_LEN_1K: usize = 1024;

/// Checksum mode negotiated at handshake time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Checksum {
	/// Legacy 8-bit arithmetic checksum, requested with `NAK`.
	Standard,
	/// CRC-16-CCITT (XMODEM variant), requested with `C`.
	Crc16,
}

/// Payload block size. The shell's default configuration only ever
/// negotiates `Standard`; `OneK` is carried for codec completeness and to
/// let `decode` tolerate an `STX`-prefixed ADU the way the reference
/// implementation does.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockLength {
	Standard = 128,
	OneK = 1024,
}

impl BlockLength {
	pub const fn pdu_len(self) -> usize {
		match self {
			BlockLength::Standard => PDU_LEN_STANDARD,
			BlockLength::OneK => PDU_LEN_1K,
		}
	}

	fn preamble(self) -> u8 {
		match self {
			BlockLength::Standard => SOH,
			BlockLength::OneK => STX,
		}
	}

	fn from_preamble(byte: u8) -> Option<BlockLength> {
		match byte {
			SOH => Some(BlockLength::Standard),
			STX => Some(BlockLength::OneK),
			_ => None,
		}
	}
}

/// Number of trailing checksum/CRC bytes for a given mode.
const fn trailer_len(mode: Checksum) -> usize {
	match mode {
		Checksum::Standard => 1,
		Checksum::Crc16 => 2,
	}
}

/// Total ADU length (header + PDU + trailer) for a block length and mode.
pub const fn adu_len(block_length: BlockLength, mode: Checksum) -> usize {
	3 + block_length.pdu_len() + trailer_len(mode)
}

/// A decoded ADU, borrowing its payload out of the caller's scratch buffer.
pub struct DecodedAdu<'a> {
	pub id: u8,
	pub payload: &'a [u8],
}

/// Encode `payload` (at most `block_length.pdu_len()` bytes) into `buf`.
///
/// `buf` must be at least `adu_len(block_length, mode)` bytes; only that
/// many bytes are written. Short payloads are padded with `pad_byte` to
/// fill the PDU before the CRC/checksum is computed, per the XMODEM
/// convention of padding with the substitution byte ([`SUB`]).
///
/// # Panics
/// Panics if `payload.len() > block_length.pdu_len()` or `buf` is too
/// small; both are caller preconditions, not recoverable error
/// conditions.
pub fn encode(
	buf: &mut [u8],
	payload: &[u8],
	id: u8,
	mode: Checksum,
	block_length: BlockLength,
	pad_byte: u8,
) {
	let pdu_len = block_length.pdu_len();
	assert!(payload.len() <= pdu_len, "payload exceeds block length");
	assert!(buf.len() >= adu_len(block_length, mode), "buf too small for ADU");

	buf[0] = block_length.preamble();
	buf[1] = id;
	buf[2] = 0xFF ^ id;

	let pdu = &mut buf[3..3 + pdu_len];
	pdu[..payload.len()].copy_from_slice(payload);
	for b in &mut pdu[payload.len()..] {
		*b = pad_byte;
	}

	match mode {
		Checksum::Standard => {
			buf[3 + pdu_len] = crc8_sum(&buf[3..3 + pdu_len]);
		}
		Checksum::Crc16 => {
			let crc = crc16_ccitt(&buf[3..3 + pdu_len]);
			buf[3 + pdu_len] = (crc >> 8) as u8;
			buf[3 + pdu_len + 1] = (crc & 0xFF) as u8;
		}
	}
}

/// Decode and validate a full ADU already sitting in `raw`.
///
/// Checks, in order: preamble, id/complement, CRC. The first failing
/// check determines the returned [`DecodeError`].
///
/// # Panics
/// Panics if `raw.len() != adu_len(block_length, mode)`; the caller is
/// responsible for reading exactly that many bytes off the wire before
/// calling `decode`.
pub fn decode(
	raw: &[u8],
	mode: Checksum,
	block_length: BlockLength,
) -> core::result::Result<DecodedAdu, DecodeError> {
	assert_eq!(
		raw.len(),
		adu_len(block_length, mode),
		"raw buffer does not match the expected ADU length"
	);

	if BlockLength::from_preamble(raw[0]) != Some(block_length) {
		return Err(DecodeError::BadPreamble);
	}

	let id = raw[1];
	let id_comp = raw[2];
	if id ^ id_comp != 0xFF {
		return Err(DecodeError::BadId);
	}

	let pdu_len = block_length.pdu_len();
	let payload = &raw[3..3 + pdu_len];
	let crc_ok = match mode {
		Checksum::Standard => raw[3 + pdu_len] == crc8_sum(payload),
		Checksum::Crc16 => {
			let crc = crc16_ccitt(payload);
			raw[3 + pdu_len] == (crc >> 8) as u8
				&& raw[3 + pdu_len + 1] == (crc & 0xFF) as u8
		}
	};

	if !crc_ok {
		return Err(DecodeError::BadCrc);
	}

	Ok(DecodedAdu { id, payload })
}

/// CRC-16-CCITT (XMODEM variant): polynomial `0x1021`, initial value
/// `0x0000`, no reflection, no final XOR. Delegated to the `crc16` crate's
/// `XMODEM` state, which implements exactly that variant.
pub fn crc16_ccitt(bytes: &[u8]) -> u16 {
	crc16::State::<crc16::XMODEM>::calculate(bytes)
}

/// Legacy 8-bit arithmetic checksum: byte-wise sum modulo 256.
pub fn crc8_sum(bytes: &[u8]) -> u8 {
	bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}
