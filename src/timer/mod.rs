//! Countdown timer reporting progress to a delegate.

mod countdown;

pub(crate) use countdown::CountdownHandle;
pub use countdown::{CountdownTimer, CountdownTimerDelegate, CountdownTimerState};
