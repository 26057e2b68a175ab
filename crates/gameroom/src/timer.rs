/// Generation counter guarding the auto-advance timer.
///
/// Every scheduled timer carries the token current at issue time; any
/// accepted explicit action bumps the generation, so a timer that fires
/// late finds its token stale and does nothing. This makes the
/// explicit-versus-timeout race resolve to exactly one advance without
/// holding a lock across the sleep.
#[derive(Debug, Default)]
pub struct Countdown {
    epoch: u64,
}

impl Countdown {
    /// Bumps the generation and returns the token for a new timer.
    pub fn issue(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }
    /// Invalidates every outstanding token without issuing a new one.
    pub fn cancel(&mut self) {
        self.epoch += 1;
    }
    /// Whether a timer holding this token is still the live one.
    pub fn live(&self, token: u64) -> bool {
        self.epoch == token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_is_live_until_superseded() {
        let mut countdown = Countdown::default();
        let first = countdown.issue();
        assert!(countdown.live(first));
        let second = countdown.issue();
        assert!(!countdown.live(first));
        assert!(countdown.live(second));
    }

    #[test]
    fn cancel_invalidates_without_new_token() {
        let mut countdown = Countdown::default();
        let token = countdown.issue();
        countdown.cancel();
        assert!(!countdown.live(token));
    }
}
