//! Receiver-side scenarios from the spec's end-to-end seed list, driven
//! against a scripted transport so timeouts and corruption are exercised
//! without real delay.

mod common;

use common::ScriptedTransport;
use xmodem_core::codec::{self, BlockLength, Checksum, ACK, CAN, EOT, NAK, SOH, SUB};
use xmodem_core::ports::VecSink;
use xmodem_core::{Error, Receiver, XmodemConfig};

fn packet(id: u8, payload: &[u8]) -> Vec<u8> {
	let mut buf = [0u8; codec::adu_len(BlockLength::Standard, Checksum::Crc16)];
	codec::encode(&mut buf, payload, id, Checksum::Crc16, BlockLength::Standard, SUB);
	buf.to_vec()
}

#[test]
fn s2_bit_flipped_packet_is_nakked_then_accepted_on_retransmit() {
	let good = packet(1, &[0xAB; 128]);
	let mut corrupt = good.clone();
	corrupt[10] ^= 0x01;

	let mut transport = ScriptedTransport::new();
	transport.push_bytes(&corrupt[..1]);
	transport.push_bytes(&corrupt[1..]);
	// Sender retransmits byte-for-byte on NAK.
	transport.push_bytes(&good[..1]);
	transport.push_bytes(&good[1..]);
	transport.push_bytes(&[EOT]);

	let mut sink = VecSink::default();
	let mut receiver = Receiver::new(XmodemConfig::default());
	receiver.run(&mut transport, &mut sink, Checksum::Crc16).unwrap();

	assert_eq!(sink.data, vec![0xABu8; 128]);
	// First response is a NAK for the corrupt packet, then ACK, then ACK for EOT.
	assert_eq!(transport.written, vec![NAK, ACK, ACK]);
}

#[test]
fn s3_duplicate_packet_is_acked_but_not_rewritten() {
	let first = packet(1, &[0x11; 128]);

	let mut transport = ScriptedTransport::new();
	transport.push_bytes(&first[..1]);
	transport.push_bytes(&first[1..]);
	// The sender's ACK was dropped, so it retransmits the identical packet.
	transport.push_bytes(&first[..1]);
	transport.push_bytes(&first[1..]);
	transport.push_bytes(&[EOT]);

	let mut sink = VecSink::default();
	let mut receiver = Receiver::new(XmodemConfig::default());
	receiver.run(&mut transport, &mut sink, Checksum::Crc16).unwrap();

	// Exactly one copy of the payload reached storage.
	assert_eq!(sink.data, vec![0x11u8; 128]);
	assert_eq!(transport.written, vec![ACK, ACK, ACK]);
}

#[test]
fn s5_exhausted_handshake_terminates_with_retry_exhausted() {
	let mut transport = ScriptedTransport::new();
	// No scripted bytes at all -> every read times out forever.
	let mut sink = VecSink::default();
	let mut receiver = Receiver::new(XmodemConfig::default());
	let result = receiver.run(&mut transport, &mut sink, Checksum::Crc16);

	assert!(matches!(result, Err(Error::RetryExhausted)));
	assert!(sink.data.is_empty());
	// One handshake byte ('C') sent per soft timeout, MAX_ERR_COUNT times.
	assert_eq!(transport.written.len(), xmodem_core::MAX_ERR_COUNT as usize);
	assert!(transport.written.iter().all(|&b| b == codec::CRC));
}

#[test]
fn s6_truncated_packet_counts_one_soft_error_and_continues() {
	let good = packet(1, &[0x22; 128]);

	let mut transport = ScriptedTransport::new();
	transport.push_bytes(&good[..1]); // SOH arrives
	transport.push_timeout(); // then silence mid-packet
	transport.push_bytes(&good[..1]); // SOH again, successful retry
	transport.push_bytes(&good[1..]);
	transport.push_bytes(&[EOT]);

	let mut sink = VecSink::default();
	let mut receiver = Receiver::new(XmodemConfig::default());
	receiver.run(&mut transport, &mut sink, Checksum::Crc16).unwrap();

	assert_eq!(sink.data, vec![0x22u8; 128]);
}

#[test]
fn cancel_byte_aborts_with_cancelled() {
	let mut transport = ScriptedTransport::new();
	transport.push_bytes(&[CAN]);

	let mut sink = VecSink::default();
	let mut receiver = Receiver::new(XmodemConfig::default());
	let result = receiver.run(&mut transport, &mut sink, Checksum::Crc16);
	assert!(matches!(result, Err(Error::Cancelled)));
}

#[test]
fn out_of_order_id_is_nakked_without_storing() {
	// Expected id is 1, but packet 3 arrives.
	let stray = packet(3, &[0x33; 128]);
	let correct = packet(1, &[0x44; 128]);

	let mut transport = ScriptedTransport::new();
	transport.push_bytes(&stray[..1]);
	transport.push_bytes(&stray[1..]);
	transport.push_bytes(&correct[..1]);
	transport.push_bytes(&correct[1..]);
	transport.push_bytes(&[EOT]);

	let mut sink = VecSink::default();
	let mut receiver = Receiver::new(XmodemConfig::default());
	receiver.run(&mut transport, &mut sink, Checksum::Crc16).unwrap();

	assert_eq!(sink.data, vec![0x44u8; 128]);
	assert_eq!(transport.written, vec![NAK, ACK, ACK]);
}

#[test]
fn storage_failure_is_fatal_and_suppresses_ack() {
	struct FailingSink;
	impl xmodem_core::ports::StorageSink for FailingSink {
		fn write(&mut self, _bytes: &[u8]) -> Result<(), xmodem_core::StorageError> {
			Err(xmodem_core::StorageError::Other("disk full"))
		}
	}

	let first = packet(1, &[0x55; 128]);
	let mut transport = ScriptedTransport::new();
	transport.push_bytes(&first[..1]);
	transport.push_bytes(&first[1..]);

	let mut sink = FailingSink;
	let mut receiver = Receiver::new(XmodemConfig::default());
	let result = receiver.run(&mut transport, &mut sink, Checksum::Crc16);

	assert!(matches!(result, Err(Error::Storage(_))));
	// No ACK was sent for the packet that failed to store.
	assert!(!transport.written.contains(&ACK));
}

#[test]
fn reject_wrong_preamble_byte_variant_named_soh() {
	// Regression guard for the historical typo the spec calls out: START
	// must compare against the literal SOH control byte, not a state enum
	// discriminant that happens to share a name.
	assert_eq!(SOH, 0x01);
}
