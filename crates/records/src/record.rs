use prosit_core::Sips;

/// A player's historical best for the ladder endgame.
///
/// The two fields are merged independently: a new run lowers `attempts` and
/// `sips` each on its own, so the stored record may describe a run that
/// never happened (fewest attempts from one night, fewest sips from
/// another). Longstanding behavior the rankings are built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LadderRecord {
    pub attempts: u32,
    pub sips: Sips,
}

impl LadderRecord {
    /// Folds a finished run into the record, keeping each field's minimum.
    pub fn merge(&mut self, attempts: u32, sips: Sips) {
        self.attempts = self.attempts.min(attempts);
        self.sips = self.sips.min(sips);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_merge_independently() {
        let mut record = LadderRecord {
            attempts: 3,
            sips: 7,
        };
        record.merge(1, 10);
        assert_eq!(
            record,
            LadderRecord {
                attempts: 1,
                sips: 7,
            }
        );
    }
}
