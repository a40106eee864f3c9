#![cfg_attr(not(feature = "std"), no_std)]
//! XMODEM transfer engine for an embedded micro-shell.
//!
//! This crate is the serial file-transfer core consumed by a shell's
//! `write <name>` and `read <name>` commands: a frame codec
//! ([`codec`]), a receiver state machine ([`Receiver`]), and a sender
//! state machine ([`Sender`]), all driven synchronously over a
//! caller-supplied [`TransportPort`](ports::TransportPort). The
//! interactive shell, the file-system commands, and the comm-port
//! driver itself live outside this crate; it only consumes their thin
//! interfaces (transport, storage, clock).
//!
//! Each machine is constructed fresh for one transfer and runs to a
//! terminal state, either `Ok(())` or an [`Error`], before returning.
//! There is no long-lived state between transfers.

pub mod codec;
mod config;
pub mod error;
pub mod fsm;
pub mod ports;
mod receiver;
mod sender;

pub use codec::{BlockLength, Checksum};
pub use config::{XmodemConfig, MAX_ERR_COUNT, START_TIMEOUT_MS};
pub use error::{DecodeError, Error, PortError, Result, StorageError};
pub use receiver::Receiver;
pub use sender::Sender;
