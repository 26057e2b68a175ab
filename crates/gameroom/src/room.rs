use super::config::Rules;
use super::config::Timing;
use super::error::RoomError;
use super::timer::Countdown;
use super::view::LadderView;
use super::view::NextStep;
use super::view::TableView;
use prosit_cards::Deck;
use prosit_core::GuildId;
use prosit_core::ID;
use prosit_core::PlayerId;
use prosit_core::Points;
use prosit_core::Unique;
use prosit_gameplay::Game;
use prosit_gameplay::GameError;
use prosit_gameplay::Guess;
use prosit_gameplay::Ladder;
use prosit_gameplay::Order;
use prosit_gameplay::Phase;
use prosit_gameplay::Step;
use prosit_records::Recorder;
use rand::rngs::SmallRng;
use std::sync::Arc;
use tokio::sync::Mutex;

enum CardState {
    Lobby {
        host: PlayerId,
        players: Vec<PlayerId>,
    },
    Playing {
        game: Game,
    },
    Ladder {
        driver: PlayerId,
        ladder: Ladder,
        last: Option<Step>,
    },
    Closed,
}

struct Shared {
    state: CardState,
    countdown: Countdown,
    rng: SmallRng,
}

/// One guild's round-game session: lobby, round game, then the loser's
/// ladder endgame.
///
/// Imperative shell over the functional cores in `prosit-gameplay`. All
/// user actions and the auto-advance timer serialize through one mutex;
/// persistence is awaited after the lock drops so a slow or failing store
/// can never wedge or corrupt the session.
pub struct CardRoom {
    id: ID<Self>,
    guild: GuildId,
    rules: Rules,
    timing: Timing,
    recorder: Arc<dyn Recorder>,
    shared: Mutex<Shared>,
}

impl CardRoom {
    pub fn new(
        guild: GuildId,
        host: PlayerId,
        rules: Rules,
        timing: Timing,
        recorder: Arc<dyn Recorder>,
        rng: SmallRng,
    ) -> Self {
        let id = ID::default();
        log::debug!("[room {}] card session opened for guild {} by {}", id, guild, host);
        Self {
            id,
            guild,
            rules,
            timing,
            recorder,
            shared: Mutex::new(Shared {
                state: CardState::Lobby {
                    host,
                    players: vec![host],
                },
                countdown: Countdown::default(),
                rng,
            }),
        }
    }

    pub fn guild(&self) -> GuildId {
        self.guild
    }

    /// Seats the player. Joining twice is a no-op that just redraws the
    /// lobby.
    pub async fn join(&self, player: PlayerId) -> Result<TableView, RoomError> {
        let mut shared = self.shared.lock().await;
        let CardState::Lobby { players, .. } = &mut shared.state else {
            return Err(RoomError::OutOfPhase);
        };
        if !players.contains(&player) {
            players.push(player);
            log::debug!("[room {}] {} joined ({} seated)", self.id, player, players.len());
        }
        Ok(self.render(&shared))
    }

    /// Unseats the player; leaving without having joined is a no-op.
    pub async fn leave(&self, player: PlayerId) -> Result<TableView, RoomError> {
        let mut shared = self.shared.lock().await;
        let CardState::Lobby { host, players } = &mut shared.state else {
            return Err(RoomError::OutOfPhase);
        };
        let Some(seat) = players.iter().position(|&p| p == player) else {
            return Ok(self.render(&shared));
        };
        players.remove(seat);
        match players.first() {
            Some(&next) => {
                if *host == player {
                    *host = next;
                }
                Ok(self.render(&shared))
            }
            None => {
                shared.state = CardState::Closed;
                Ok(self.render(&shared))
            }
        }
    }

    /// Deals the deck and opens round one. Host only.
    pub async fn start(&self, player: PlayerId) -> Result<TableView, RoomError> {
        let mut shared = self.shared.lock().await;
        let Shared { state, rng, .. } = &mut *shared;
        let CardState::Lobby { host, players } = state else {
            return Err(RoomError::OutOfPhase);
        };
        if *host != player {
            return Err(RoomError::NotHost);
        }
        if players.len() < self.rules.min_players {
            return Err(RoomError::InsufficientPlayers);
        }
        let deck = Deck::standard(rng);
        let game = Game::new(players.clone(), deck, self.rules.rounds);
        log::debug!("[room {}] game started with {} players", self.id, game.standings().len());
        *state = CardState::Playing { game };
        Ok(self.render(&shared))
    }

    /// Resolves the current player's guess and arms the auto-advance
    /// timer. The drawn card stays on display until the player advances
    /// explicitly or the timer fires, whichever comes first.
    pub async fn guess(self: Arc<Self>, player: PlayerId, guess: Guess) -> Result<TableView, RoomError> {
        let mut shared = self.shared.lock().await;
        let CardState::Playing { game } = &mut shared.state else {
            return Err(RoomError::OutOfPhase);
        };
        match game.resolve(player, guess) {
            Ok(_) => {
                let token = shared.countdown.issue();
                let view = self.render(&shared);
                drop(shared);
                let room = Arc::clone(&self);
                tokio::spawn(async move {
                    tokio::time::sleep(room.timing.advance).await;
                    room.auto_advance(token).await;
                });
                Ok(view)
            }
            Err(GameError::DeckExhausted) => {
                log::warn!("[room {}] deck exhausted mid-game, aborting", self.id);
                shared.state = CardState::Closed;
                Ok(self.render(&shared))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Explicit advance by the player whose outcome is on display.
    pub async fn advance(&self, player: PlayerId) -> Result<TableView, RoomError> {
        let mut shared = self.shared.lock().await;
        let CardState::Playing { game } = &shared.state else {
            return Err(RoomError::OutOfPhase);
        };
        if game.current() != Some(player) {
            return Err(RoomError::NotCurrentPlayer);
        }
        let (view, scores) = self.advance_locked(&mut shared)?;
        drop(shared);
        self.flush(scores).await;
        Ok(view)
    }

    /// Timer path: a no-op unless its token is still the live one.
    async fn auto_advance(&self, token: u64) {
        let mut shared = self.shared.lock().await;
        if !shared.countdown.live(token) {
            return;
        }
        if !matches!(shared.state, CardState::Playing { .. }) {
            return;
        }
        log::debug!("[room {}] auto-advance after timeout", self.id);
        match self.advance_locked(&mut shared) {
            Ok((_, scores)) => {
                drop(shared);
                self.flush(scores).await;
            }
            Err(e) => log::warn!("[room {}] auto-advance failed: {}", self.id, e),
        }
    }

    /// Moves the turn forward under the lock; on game finish draws the
    /// loser, hands them the ladder, and returns the final scores for
    /// recording after the lock drops.
    fn advance_locked(
        &self,
        shared: &mut Shared,
    ) -> Result<(TableView, Vec<(PlayerId, Points)>), RoomError> {
        let Shared {
            state,
            countdown,
            rng,
        } = shared;
        let CardState::Playing { game } = state else {
            return Err(RoomError::OutOfPhase);
        };
        let phase = game.advance()?;
        countdown.cancel();
        match phase {
            Phase::Finished => {
                let scores = game.scores();
                let players = game.standings().iter().map(|s| s.id()).collect();
                let last = game.last().copied();
                match game.loser(rng) {
                    Some(loser) => {
                        log::debug!("[room {}] game over, {} drives the bus", self.id, loser);
                        *state = CardState::Ladder {
                            driver: loser,
                            ladder: Ladder::new(self.rules.rungs, rng),
                            last: None,
                        };
                        let view = TableView {
                            guild: self.guild,
                            round: self.rules.rounds,
                            rounds: self.rules.rounds,
                            players,
                            scores: scores.clone(),
                            last,
                            next: NextStep::LadderReady { loser },
                        };
                        Ok((view, scores))
                    }
                    None => {
                        *state = CardState::Closed;
                        let view = TableView {
                            guild: self.guild,
                            round: self.rules.rounds,
                            rounds: self.rules.rounds,
                            players,
                            scores,
                            last,
                            next: NextStep::Aborted,
                        };
                        Ok((view, Vec::new()))
                    }
                }
            }
            _ => Ok((self.render(shared), Vec::new())),
        }
    }

    /// The ladder driver's higher/lower/equal call against the current
    /// rung. Completion hands the record off to persistence and closes
    /// the session.
    pub async fn ladder_guess(&self, player: PlayerId, order: Order) -> Result<LadderView, RoomError> {
        let mut shared = self.shared.lock().await;
        let Shared { state, rng, .. } = &mut *shared;
        let CardState::Ladder {
            driver,
            ladder,
            last,
        } = state
        else {
            return Err(RoomError::OutOfPhase);
        };
        let driver = *driver;
        if driver != player {
            return Err(RoomError::NotCurrentPlayer);
        }
        let step = ladder.guess(order, rng)?;
        *last = Some(step);
        match step {
            Step::Completed { .. } => {
                let attempts = ladder.attempts();
                let sips = ladder.sips();
                let view = self.ladder_render(
                    driver,
                    ladder,
                    NextStep::LadderDone { attempts, sips },
                );
                log::debug!(
                    "[room {}] ladder complete: {} attempts, {} sips",
                    self.id,
                    attempts,
                    sips
                );
                *state = CardState::Closed;
                drop(shared);
                if let Err(e) = self
                    .recorder
                    .record_ladder(self.guild, driver, attempts, sips)
                    .await
                {
                    log::warn!("[room {}] ladder record failed: {}", self.id, e);
                }
                Ok(view)
            }
            Step::Failed { penalty, .. } => {
                Ok(self.ladder_render(driver, ladder, NextStep::AwaitRetry { penalty }))
            }
            Step::Climbed { rung, .. } => {
                Ok(self.ladder_render(driver, ladder, NextStep::AwaitClimb { rung }))
            }
        }
    }

    /// Acknowledges a failed climb so a fresh one can start from rung 0.
    pub async fn ladder_retry(&self, player: PlayerId) -> Result<LadderView, RoomError> {
        let mut shared = self.shared.lock().await;
        let CardState::Ladder {
            driver,
            ladder,
            last,
        } = &mut shared.state
        else {
            return Err(RoomError::OutOfPhase);
        };
        let driver = *driver;
        if driver != player {
            return Err(RoomError::NotCurrentPlayer);
        }
        ladder.retry()?;
        *last = None;
        let next = NextStep::AwaitClimb { rung: 0 };
        Ok(self.ladder_render(driver, ladder, next))
    }

    /// Tears the session down. Pending timers find a stale token or a
    /// closed state and do nothing.
    pub async fn close(&self) {
        let mut shared = self.shared.lock().await;
        shared.countdown.cancel();
        shared.state = CardState::Closed;
        log::debug!("[room {}] card session closed", self.id);
    }

    pub async fn view(&self) -> TableView {
        self.render(&*self.shared.lock().await)
    }

    async fn flush(&self, scores: Vec<(PlayerId, Points)>) {
        for (player, points) in scores {
            if let Err(e) = self.recorder.record_game(self.guild, player, points).await {
                log::warn!("[room {}] game record failed for {}: {}", self.id, player, e);
            }
        }
    }

    fn render(&self, shared: &Shared) -> TableView {
        match &shared.state {
            CardState::Lobby { players, .. } => TableView {
                guild: self.guild,
                round: 0,
                rounds: self.rules.rounds,
                players: players.clone(),
                scores: Vec::new(),
                last: None,
                next: NextStep::AwaitPlayers {
                    joined: players.len(),
                    required: self.rules.min_players,
                },
            },
            CardState::Playing { game } => {
                let next = match (game.phase(), game.current()) {
                    (Phase::Guessing, Some(player)) => NextStep::AwaitGuess {
                        player,
                        round: game.round(),
                    },
                    (Phase::Advancing, Some(player)) => NextStep::AwaitAdvance {
                        player,
                        timeout_ms: self.timing.advance.as_millis() as u64,
                    },
                    _ => NextStep::Aborted,
                };
                TableView {
                    guild: self.guild,
                    round: game.round(),
                    rounds: game.rounds(),
                    players: game.standings().iter().map(|s| s.id()).collect(),
                    scores: game.scores(),
                    last: game.last().copied(),
                    next,
                }
            }
            CardState::Ladder { driver, .. } => TableView {
                guild: self.guild,
                round: self.rules.rounds,
                rounds: self.rules.rounds,
                players: Vec::new(),
                scores: Vec::new(),
                last: None,
                next: NextStep::LadderReady { loser: *driver },
            },
            CardState::Closed => TableView {
                guild: self.guild,
                round: 0,
                rounds: self.rules.rounds,
                players: Vec::new(),
                scores: Vec::new(),
                last: None,
                next: NextStep::Aborted,
            },
        }
    }

    fn ladder_render(&self, driver: PlayerId, ladder: &Ladder, next: NextStep) -> LadderView {
        LadderView {
            guild: self.guild,
            driver,
            rung: ladder.rung(),
            rungs: ladder.rungs(),
            revealed: ladder.tops()[..ladder.revealed()].to_vec(),
            drawn: ladder.drawn().to_vec(),
            attempts: ladder.attempts(),
            sips: ladder.sips(),
            next,
        }
    }
}

impl Unique for CardRoom {
    fn id(&self) -> ID<Self> {
        self.id
    }
}
