//! The one piece of control flow [`crate::Receiver`] and [`crate::Sender`]
//! share: a synchronous loop that dispatches on the current phase,
//! tracks `errorCount`, and enforces the retry cap. Factored out so both
//! machines terminate on exactly the same conditions instead of each
//! repeating its own `if errors >= max_errors { ... }` check at every
//! state that can fail softly.

use ::log::error;

use crate::error::Error;

/// What a single phase's step function decided to do.
pub enum Outcome<Phase> {
	/// Move to the next phase; `errorCount` is untouched.
	Continue(Phase),

	/// Move to the next phase and reset `errorCount` to zero. Used after
	/// a fully successful packet exchange.
	Reset(Phase),

	/// A soft error occurred (timeout, bad CRC, bad id, ...); increment
	/// `errorCount` and move to the given phase. If this breaches the
	/// cap the driver returns `RetryExhausted` instead of continuing.
	SoftError(Phase),

	/// The machine reached its terminal state successfully.
	Done,

	/// A fatal condition occurred; unwind immediately.
	Fatal(Error),
}

/// Drive `step` from `initial` until it reports `Done` or `Fatal`, or
/// until `errorCount` reaches `max_errors`.
pub fn run_to_completion<Phase, F>(
	initial: Phase,
	max_errors: u32,
	mut step: F,
) -> Result<(), Error>
where
	F: FnMut(Phase) -> Outcome<Phase>,
{
	let mut phase = initial;
	let mut errors: u32 = 0;

	loop {
		match step(phase) {
			Outcome::Continue(next) => phase = next,
			Outcome::Reset(next) => {
				errors = 0;
				phase = next;
			}
			Outcome::SoftError(next) => {
				errors += 1;
				if errors >= max_errors {
					error!(
						"exhausted max retries ({}) before completing transfer",
						max_errors
					);
					return Err(Error::RetryExhausted);
				}
				phase = next;
			}
			Outcome::Done => return Ok(()),
			Outcome::Fatal(e) => return Err(e),
		}
	}
}
