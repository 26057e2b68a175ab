use prosit_core::*;
use std::time::Duration;

/// Game-shape parameters, overridable for testing with shorter games.
#[derive(Debug, Clone, Copy)]
pub struct Rules {
    pub rounds: usize,
    pub rungs: usize,
    pub min_players: usize,
    pub min_entrants: usize,
    pub finish: u8,
    pub checkpoints: usize,
    pub stake_min: Sips,
    pub stake_max: Sips,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            rounds: ROUNDS,
            rungs: LADDER_RUNGS,
            min_players: MIN_PLAYERS,
            min_entrants: MIN_ENTRANTS,
            finish: RACE_FINISH,
            checkpoints: BLOCKADE_COUNT,
            stake_min: STAKE_MIN,
            stake_max: STAKE_MAX,
        }
    }
}

/// Timer parameters, overridable for testing with compressed timers.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    /// How long a resolved turn waits before advancing on its own.
    pub advance: Duration,
    /// Pause between race simulation steps.
    pub tick: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            advance: Duration::from_secs(ADVANCE_TIMEOUT),
            tick: Duration::from_secs(TICK_INTERVAL),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_come_from_shared_constants() {
        let rules = Rules::default();
        assert_eq!(rules.rounds, 4);
        assert_eq!(rules.rungs, 5);
        assert_eq!(rules.finish, 5);
        assert_eq!(rules.checkpoints, 4);
        let timing = Timing::default();
        assert_eq!(timing.advance, Duration::from_secs(ADVANCE_TIMEOUT));
        assert_eq!(timing.tick, Duration::from_secs(TICK_INTERVAL));
    }
}
