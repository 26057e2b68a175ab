use super::config::Rules;
use super::config::Timing;
use super::error::RoomError;
use super::view::NextStep;
use super::view::RaceView;
use prosit_cards::Card;
use prosit_cards::Suit;
use prosit_core::GuildId;
use prosit_core::ID;
use prosit_core::PlayerId;
use prosit_core::Sips;
use prosit_core::Unique;
use prosit_gameplay::Entrant;
use prosit_gameplay::Payout;
use prosit_gameplay::Race;
use prosit_gameplay::RaceError;
use prosit_records::Recorder;
use rand::rngs::SmallRng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::watch;

#[derive(Debug, Default, Clone, Copy)]
struct Selection {
    horse: Option<Suit>,
    stake: Option<Sips>,
}

enum RaceState {
    Lobby {
        host: PlayerId,
        pending: HashMap<PlayerId, Selection>,
        entrants: Vec<Entrant>,
    },
    Running {
        race: Race,
        entrants: Vec<Entrant>,
        last: Option<Card>,
    },
    Done {
        winner: Suit,
        entrants: Vec<Entrant>,
        payouts: Vec<Payout>,
        last: Option<Card>,
        progress: Vec<(Suit, u8)>,
        flipped: Vec<u8>,
    },
    Closed,
}

/// One guild's horse-race session.
///
/// Joining is two-phase: a player opens a bet slip, picks a horse and a
/// stake, then confirms. Once started the race drives itself from a
/// background ticker; every tick publishes a fresh [`RaceView`] on a watch
/// channel so the presentation layer can redraw without polling internals.
pub struct RaceRoom {
    id: ID<Self>,
    guild: GuildId,
    rules: Rules,
    timing: Timing,
    recorder: Arc<dyn Recorder>,
    shared: Mutex<Shared>,
    views: watch::Sender<RaceView>,
}

struct Shared {
    state: RaceState,
    rng: SmallRng,
}

impl RaceRoom {
    pub fn new(
        guild: GuildId,
        host: PlayerId,
        rules: Rules,
        timing: Timing,
        recorder: Arc<dyn Recorder>,
        rng: SmallRng,
    ) -> Self {
        let id = ID::default();
        log::debug!("[room {}] race session opened for guild {} by {}", id, guild, host);
        let state = RaceState::Lobby {
            host,
            pending: HashMap::new(),
            entrants: Vec::new(),
        };
        let initial = Self::state_view(guild, rules, &state);
        let (views, _) = watch::channel(initial);
        Self {
            id,
            guild,
            rules,
            timing,
            recorder,
            shared: Mutex::new(Shared { state, rng }),
            views,
        }
    }

    pub fn guild(&self) -> GuildId {
        self.guild
    }

    /// Tick-by-tick view feed; holds the latest view at all times.
    pub fn subscribe(&self) -> watch::Receiver<RaceView> {
        self.views.subscribe()
    }

    /// Opens a bet slip for the player.
    pub async fn begin_join(&self, player: PlayerId) -> Result<RaceView, RoomError> {
        let mut shared = self.shared.lock().await;
        let RaceState::Lobby {
            pending, entrants, ..
        } = &mut shared.state
        else {
            return Err(RoomError::OutOfPhase);
        };
        if pending.contains_key(&player) || entrants.iter().any(|e| e.player == player) {
            return Err(RoomError::AlreadyJoined);
        }
        pending.insert(player, Selection::default());
        Ok(self.render(&shared))
    }

    pub async fn pick_horse(&self, player: PlayerId, horse: Suit) -> Result<RaceView, RoomError> {
        let mut shared = self.shared.lock().await;
        let RaceState::Lobby { pending, .. } = &mut shared.state else {
            return Err(RoomError::OutOfPhase);
        };
        let Some(selection) = pending.get_mut(&player) else {
            return Err(RoomError::NotJoined);
        };
        selection.horse = Some(horse);
        Ok(self.render(&shared))
    }

    pub async fn place_stake(&self, player: PlayerId, stake: Sips) -> Result<RaceView, RoomError> {
        if stake < self.rules.stake_min || stake > self.rules.stake_max {
            return Err(RoomError::InvalidStake);
        }
        let mut shared = self.shared.lock().await;
        let RaceState::Lobby { pending, .. } = &mut shared.state else {
            return Err(RoomError::OutOfPhase);
        };
        let Some(selection) = pending.get_mut(&player) else {
            return Err(RoomError::NotJoined);
        };
        selection.stake = Some(stake);
        Ok(self.render(&shared))
    }

    /// Locks the bet slip in. Requires both a horse and a stake.
    pub async fn confirm_join(&self, player: PlayerId) -> Result<RaceView, RoomError> {
        let mut shared = self.shared.lock().await;
        let RaceState::Lobby {
            pending, entrants, ..
        } = &mut shared.state
        else {
            return Err(RoomError::OutOfPhase);
        };
        let Some(selection) = pending.get(&player) else {
            return Err(RoomError::NotJoined);
        };
        let (Some(horse), Some(stake)) = (selection.horse, selection.stake) else {
            return Err(RoomError::IncompleteSelection);
        };
        pending.remove(&player);
        entrants.push(Entrant {
            player,
            horse,
            stake,
        });
        log::debug!("[room {}] {} backs {} for {}", self.id, player, horse.name(), stake);
        Ok(self.render(&shared))
    }

    /// Withdraws from the betting lobby, tearing up a pending slip or a
    /// confirmed bet. Leaving without having joined is a no-op.
    pub async fn leave(&self, player: PlayerId) -> Result<RaceView, RoomError> {
        let mut shared = self.shared.lock().await;
        let RaceState::Lobby {
            pending, entrants, ..
        } = &mut shared.state
        else {
            return Err(RoomError::OutOfPhase);
        };
        if pending.remove(&player).is_some() {
            log::debug!("[room {}] {} tore up their slip", self.id, player);
        } else if let Some(at) = entrants.iter().position(|e| e.player == player) {
            entrants.remove(at);
            log::debug!("[room {}] {} withdrew their bet", self.id, player);
        }
        Ok(self.render(&shared))
    }

    /// Deals the track and flags the race ready to run. Host only. The
    /// caller spawns [`RaceRoom::run`] to drive it.
    pub async fn start(&self, player: PlayerId) -> Result<RaceView, RoomError> {
        let mut shared = self.shared.lock().await;
        let Shared { state, rng } = &mut *shared;
        let RaceState::Lobby { host, entrants, .. } = state else {
            return Err(RoomError::OutOfPhase);
        };
        if *host != player {
            return Err(RoomError::NotHost);
        }
        if entrants.len() < self.rules.min_entrants {
            return Err(RoomError::InsufficientPlayers);
        }
        let race = Race::new(self.rules.finish, self.rules.checkpoints, rng);
        log::debug!("[room {}] race started with {} entrants", self.id, entrants.len());
        *state = RaceState::Running {
            race,
            entrants: std::mem::take(entrants),
            last: None,
        };
        let view = self.render(&shared);
        self.views.send_replace(view.clone());
        Ok(view)
    }

    /// The background ticker. Sleeps between steps without holding the
    /// lock, re-validates state on every wake so teardown stops it
    /// cleanly, and settles exactly once when a winner crosses the line.
    pub async fn run(self: Arc<Self>) {
        loop {
            tokio::time::sleep(self.timing.tick).await;
            let mut shared = self.shared.lock().await;
            let RaceState::Running {
                race,
                entrants,
                last,
            } = &mut shared.state
            else {
                // torn down or already settled between wakes
                return;
            };
            match race.tick() {
                Ok(tick) => {
                    *last = Some(tick.card);
                    match tick.winner {
                        Some(winner) => {
                            let payouts = race.settle(entrants).unwrap_or_default();
                            let progress =
                                Suit::all().iter().map(|&s| (s, race.progress(s))).collect();
                            let flipped = race.flipped();
                            let entrants = std::mem::take(entrants);
                            log::debug!("[room {}] {} wins the race", self.id, winner.name());
                            shared.state = RaceState::Done {
                                winner,
                                entrants,
                                payouts: payouts.clone(),
                                last: Some(tick.card),
                                progress,
                                flipped,
                            };
                            let view = self.render(&shared);
                            drop(shared);
                            self.views.send_replace(view);
                            self.flush(payouts).await;
                            return;
                        }
                        None => {
                            let view = self.render(&shared);
                            drop(shared);
                            self.views.send_replace(view);
                        }
                    }
                }
                Err(RaceError::DeckExhausted) => {
                    log::warn!("[room {}] race deck exhausted, aborting", self.id);
                    shared.state = RaceState::Closed;
                    let view = self.render(&shared);
                    drop(shared);
                    self.views.send_replace(view);
                    return;
                }
                Err(RaceError::Finished) => return,
            }
        }
    }

    /// Tears the session down; the ticker exits on its next wake.
    pub async fn close(&self) {
        let mut shared = self.shared.lock().await;
        shared.state = RaceState::Closed;
        log::debug!("[room {}] race session closed", self.id);
    }

    pub async fn view(&self) -> RaceView {
        self.render(&*self.shared.lock().await)
    }

    async fn flush(&self, payouts: Vec<Payout>) {
        for payout in payouts {
            if let Err(e) = self
                .recorder
                .record_race(self.guild, payout.player, payout.sips)
                .await
            {
                log::warn!(
                    "[room {}] race record failed for {}: {}",
                    self.id,
                    payout.player,
                    e
                );
            }
        }
    }

    fn render(&self, shared: &Shared) -> RaceView {
        Self::state_view(self.guild, self.rules, &shared.state)
    }

    fn state_view(guild: GuildId, rules: Rules, state: &RaceState) -> RaceView {
        match state {
            RaceState::Lobby {
                pending, entrants, ..
            } => RaceView {
                guild,
                finish: rules.finish,
                progress: Suit::all().iter().map(|&s| (s, 0)).collect(),
                flipped: Vec::new(),
                last: None,
                entrants: entrants.clone(),
                payouts: Vec::new(),
                next: NextStep::AwaitEntrants {
                    joined: entrants.len() + pending.len(),
                    required: rules.min_entrants,
                },
            },
            RaceState::Running {
                race,
                entrants,
                last,
            } => RaceView {
                guild,
                finish: race.finish(),
                progress: Suit::all().iter().map(|&s| (s, race.progress(s))).collect(),
                flipped: race.flipped(),
                last: *last,
                entrants: entrants.clone(),
                payouts: Vec::new(),
                next: NextStep::Racing,
            },
            RaceState::Done {
                winner,
                entrants,
                payouts,
                last,
                progress,
                flipped,
            } => RaceView {
                guild,
                finish: rules.finish,
                progress: progress.clone(),
                flipped: flipped.clone(),
                last: *last,
                entrants: entrants.clone(),
                payouts: payouts.clone(),
                next: NextStep::RaceDone { winner: *winner },
            },
            RaceState::Closed => RaceView {
                guild,
                finish: rules.finish,
                progress: Vec::new(),
                flipped: Vec::new(),
                last: None,
                entrants: Vec::new(),
                payouts: Vec::new(),
                next: NextStep::Aborted,
            },
        }
    }
}

impl Unique for RaceRoom {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prosit_records::MemoryStore;
    use rand::SeedableRng;
    use std::time::Duration;

    fn room(rules: Rules, store: &Arc<MemoryStore>, seed: u64) -> Arc<RaceRoom> {
        Arc::new(RaceRoom::new(
            1,
            100,
            rules,
            Timing::default(),
            Arc::clone(store) as Arc<dyn Recorder>,
            SmallRng::seed_from_u64(seed),
        ))
    }

    async fn enter(room: &Arc<RaceRoom>, player: PlayerId, horse: Suit, stake: Sips) {
        room.begin_join(player).await.unwrap();
        room.pick_horse(player, horse).await.unwrap();
        room.place_stake(player, stake).await.unwrap();
        room.confirm_join(player).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn join_is_two_phase() {
        let store = Arc::new(MemoryStore::new());
        let room = room(Rules::default(), &store, 0);
        room.begin_join(100).await.unwrap();
        assert_eq!(
            room.confirm_join(100).await.err(),
            Some(RoomError::IncompleteSelection)
        );
        room.pick_horse(100, Suit::H).await.unwrap();
        assert_eq!(
            room.confirm_join(100).await.err(),
            Some(RoomError::IncompleteSelection)
        );
        assert_eq!(
            room.place_stake(100, 0).await.err(),
            Some(RoomError::InvalidStake)
        );
        assert_eq!(
            room.place_stake(100, 11).await.err(),
            Some(RoomError::InvalidStake)
        );
        room.place_stake(100, 3).await.unwrap();
        let view = room.confirm_join(100).await.unwrap();
        assert_eq!(
            view.entrants,
            vec![Entrant {
                player: 100,
                horse: Suit::H,
                stake: 3,
            }]
        );
        assert_eq!(
            room.begin_join(100).await.err(),
            Some(RoomError::AlreadyJoined)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stake_must_come_from_an_open_slip() {
        let store = Arc::new(MemoryStore::new());
        let room = room(Rules::default(), &store, 0);
        assert_eq!(
            room.place_stake(200, 3).await.err(),
            Some(RoomError::NotJoined)
        );
        assert_eq!(
            room.pick_horse(200, Suit::S).await.err(),
            Some(RoomError::NotJoined)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_the_lobby_withdraws_slip_or_bet() {
        let store = Arc::new(MemoryStore::new());
        let room = room(Rules::default(), &store, 0);
        // A pending slip is torn up.
        room.begin_join(200).await.unwrap();
        room.pick_horse(200, Suit::H).await.unwrap();
        room.leave(200).await.unwrap();
        assert_eq!(
            room.pick_horse(200, Suit::S).await.err(),
            Some(RoomError::NotJoined)
        );
        // A confirmed bet is withdrawn too.
        enter(&room, 300, Suit::D, 2).await;
        let view = room.leave(300).await.unwrap();
        assert!(view.entrants.is_empty());
        // Either way the seat is free to rejoin.
        room.begin_join(300).await.unwrap();
        // Leaving without a slip just redraws the lobby.
        let view = room.leave(999).await.unwrap();
        assert!(matches!(view.next, NextStep::AwaitEntrants { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn start_requires_host_and_entrants() {
        let store = Arc::new(MemoryStore::new());
        let room = room(Rules::default(), &store, 0);
        assert_eq!(
            room.start(100).await.err(),
            Some(RoomError::InsufficientPlayers)
        );
        enter(&room, 200, Suit::D, 2).await;
        assert_eq!(room.start(200).await.err(), Some(RoomError::NotHost));
        let view = room.start(100).await.unwrap();
        assert_eq!(view.next, NextStep::Racing);
    }

    #[tokio::test(start_paused = true)]
    async fn race_runs_settles_once_and_records() {
        let store = Arc::new(MemoryStore::new());
        let rules = Rules {
            finish: 1,
            checkpoints: 0,
            ..Rules::default()
        };
        let room = room(rules, &store, 3);
        // One backer per horse: exactly one of them collects.
        for (i, suit) in Suit::all().into_iter().enumerate() {
            enter(&room, 100 + i as PlayerId, suit, 2).await;
        }
        room.start(100).await.unwrap();
        let ticker = tokio::spawn(Arc::clone(&room).run());
        tokio::time::sleep(Timing::default().tick + Duration::from_millis(10)).await;
        let view = room.view().await;
        let NextStep::RaceDone { winner } = view.next else {
            panic!("race should finish on the first tick, got {:?}", view.next);
        };
        assert_eq!(view.payouts.len(), 1);
        assert_eq!(view.payouts[0].sips, 4);
        let backer = view
            .entrants
            .iter()
            .find(|e| e.horse == winner)
            .map(|e| e.player);
        assert_eq!(Some(view.payouts[0].player), backer);
        ticker.await.unwrap();
        // Winnings hit the store exactly once.
        let top = store.top_race(Some(1), 10).await.unwrap();
        assert_eq!(top, vec![(view.payouts[0].player, 4)]);
        // Another lap of the clock changes nothing.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(room.view().await.payouts.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn final_view_keeps_every_horses_position() {
        let store = Arc::new(MemoryStore::new());
        let rules = Rules {
            finish: 2,
            checkpoints: 0,
            ..Rules::default()
        };
        let room = room(rules, &store, 13);
        enter(&room, 200, Suit::C, 2).await;
        let mut feed = room.subscribe();
        room.start(100).await.unwrap();
        tokio::spawn(Arc::clone(&room).run());
        // Follow the feed tick by tick until the race settles.
        let mut running: Option<RaceView> = None;
        for _ in 0..60 {
            tokio::time::sleep(Timing::default().tick + Duration::from_millis(10)).await;
            let view = feed.borrow_and_update().clone();
            match view.next {
                NextStep::Racing => running = Some(view),
                NextStep::RaceDone { winner } => {
                    // The losers hold the positions they actually reached;
                    // only the winner moved on the final card.
                    let before = running.expect("at least one tick precedes the finish");
                    for (&(suit, done), &(_, was)) in view.progress.iter().zip(&before.progress) {
                        let expected = if suit == winner { was + 1 } else { was };
                        assert_eq!(done, expected, "{} moved after the race", suit.name());
                    }
                    assert_eq!(view.progress.len(), 4);
                    return;
                }
                other => panic!("unexpected race step: {:?}", other),
            }
        }
        panic!("race never settled");
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_stops_the_ticker() {
        let store = Arc::new(MemoryStore::new());
        let rules = Rules {
            finish: 50,
            checkpoints: 0,
            ..Rules::default()
        };
        let room = room(rules, &store, 5);
        enter(&room, 200, Suit::C, 2).await;
        room.start(100).await.unwrap();
        let ticker = tokio::spawn(Arc::clone(&room).run());
        tokio::time::sleep(Duration::from_secs(5)).await;
        room.close().await;
        // The ticker observes the closed state on its next wake and exits.
        tokio::time::sleep(Timing::default().tick + Duration::from_millis(10)).await;
        ticker.await.unwrap();
        assert_eq!(room.view().await.next, NextStep::Aborted);
        assert!(store.top_race(Some(1), 10).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn watch_feed_tracks_ticks() {
        let store = Arc::new(MemoryStore::new());
        let rules = Rules {
            finish: 1,
            checkpoints: 0,
            ..Rules::default()
        };
        let room = room(rules, &store, 11);
        enter(&room, 200, Suit::C, 2).await;
        let mut feed = room.subscribe();
        room.start(100).await.unwrap();
        tokio::spawn(Arc::clone(&room).run());
        feed.changed().await.unwrap();
        tokio::time::sleep(Timing::default().tick + Duration::from_millis(10)).await;
        let view = feed.borrow_and_update().clone();
        assert!(matches!(view.next, NextStep::RaceDone { .. }));
    }
}
