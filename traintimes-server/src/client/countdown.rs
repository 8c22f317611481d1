//! Refresh countdown.

/// Seconds between board refreshes.
pub const REFRESH_SECS: u32 = 15;

/// A repeating countdown, ticked once a second.
///
/// When it runs out the refresh counter goes up and the countdown starts
/// again from the top.
///
/// # Examples
///
/// ```
/// use traintimes_server::client::Countdown;
///
/// let mut countdown = Countdown::new(3);
/// assert!(!countdown.tick());
/// assert!(!countdown.tick());
/// assert!(countdown.tick());
/// assert_eq!(countdown.refreshes(), 1);
/// assert_eq!(countdown.remaining(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
    refreshes: u64,
}

impl Countdown {
    /// A countdown of `duration` ticks. Zero is treated as one.
    pub fn new(duration: u32) -> Self {
        let duration = duration.max(1);
        Self {
            duration,
            remaining: duration,
            refreshes: 0,
        }
    }

    /// Advance one second. Returns true when a refresh is due.
    pub fn tick(&mut self) -> bool {
        if self.remaining <= 1 {
            self.remaining = self.duration;
            self.refreshes += 1;
            true
        } else {
            self.remaining -= 1;
            false
        }
    }

    /// Seconds until the next refresh.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// How many times the countdown has run out.
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(REFRESH_SECS)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// After n ticks, exactly n / duration refreshes have happened
        #[test]
        fn refreshes_match_ticks(duration in 1u32..60, ticks in 0usize..500) {
            let mut countdown = Countdown::new(duration);
            for _ in 0..ticks {
                countdown.tick();
            }
            prop_assert_eq!(countdown.refreshes(), (ticks / duration as usize) as u64);
            prop_assert!(countdown.remaining() >= 1 && countdown.remaining() <= duration);
        }
    }
}
