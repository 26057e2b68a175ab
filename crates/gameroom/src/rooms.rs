use super::config::Rules;
use super::config::Timing;
use super::error::RoomError;
use super::race::RaceRoom;
use super::registry::Registry;
use super::room::CardRoom;
use super::view::LadderView;
use super::view::NextStep;
use super::view::RaceView;
use super::view::TableView;
use prosit_cards::Suit;
use prosit_core::GuildId;
use prosit_core::PlayerId;
use prosit_core::Sips;
use prosit_gameplay::Guess;
use prosit_gameplay::Order;
use prosit_records::Recorder;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::sync::Arc;
use tokio::sync::watch;

/// The two session kinds a guild can run, one live session of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameType {
    Table,
    Race,
}

/// Entry point for the presentation layer: owns one registry per game
/// type and routes every lifecycle call to the guild's room. Terminal
/// views (ladder done, race settled, session aborted) drop the room from
/// its registry so the guild can start fresh.
pub struct Rooms {
    rules: Rules,
    timing: Timing,
    recorder: Arc<dyn Recorder>,
    tables: Arc<Registry<CardRoom>>,
    races: Arc<Registry<RaceRoom>>,
}

impl Rooms {
    pub fn new(recorder: Arc<dyn Recorder>) -> Self {
        Self::with_config(Rules::default(), Timing::default(), recorder)
    }

    pub fn with_config(rules: Rules, timing: Timing, recorder: Arc<dyn Recorder>) -> Self {
        Self {
            rules,
            timing,
            recorder,
            tables: Arc::new(Registry::new()),
            races: Arc::new(Registry::new()),
        }
    }

    /// Drops the room when its session just ended.
    async fn reap(&self, guild: GuildId, next: &NextStep) {
        if matches!(
            next,
            NextStep::LadderDone { .. } | NextStep::Aborted
        ) {
            self.tables.remove(guild).await;
        }
    }
}

/// Round-game lifecycle.
impl Rooms {
    pub async fn create_table(&self, guild: GuildId, host: PlayerId) -> Result<TableView, RoomError> {
        let room = CardRoom::new(
            guild,
            host,
            self.rules,
            self.timing,
            Arc::clone(&self.recorder),
            SmallRng::from_os_rng(),
        );
        let room = self.tables.create(guild, room).await?;
        Ok(room.view().await)
    }

    pub async fn join(&self, guild: GuildId, player: PlayerId) -> Result<TableView, RoomError> {
        self.tables.get(guild).await?.join(player).await
    }

    pub async fn leave(&self, guild: GuildId, player: PlayerId) -> Result<TableView, RoomError> {
        let view = self.tables.get(guild).await?.leave(player).await?;
        self.reap(guild, &view.next).await;
        Ok(view)
    }

    pub async fn start_table(&self, guild: GuildId, player: PlayerId) -> Result<TableView, RoomError> {
        self.tables.get(guild).await?.start(player).await
    }

    pub async fn guess(
        &self,
        guild: GuildId,
        player: PlayerId,
        guess: Guess,
    ) -> Result<TableView, RoomError> {
        let room = self.tables.get(guild).await?;
        let view = room.guess(player, guess).await?;
        self.reap(guild, &view.next).await;
        Ok(view)
    }

    pub async fn advance(&self, guild: GuildId, player: PlayerId) -> Result<TableView, RoomError> {
        let view = self.tables.get(guild).await?.advance(player).await?;
        self.reap(guild, &view.next).await;
        Ok(view)
    }

    pub async fn ladder_guess(
        &self,
        guild: GuildId,
        player: PlayerId,
        order: Order,
    ) -> Result<LadderView, RoomError> {
        let view = self
            .tables
            .get(guild)
            .await?
            .ladder_guess(player, order)
            .await?;
        self.reap(guild, &view.next).await;
        Ok(view)
    }

    pub async fn ladder_retry(&self, guild: GuildId, player: PlayerId) -> Result<LadderView, RoomError> {
        self.tables.get(guild).await?.ladder_retry(player).await
    }

    pub async fn table_view(&self, guild: GuildId) -> Result<TableView, RoomError> {
        Ok(self.tables.get(guild).await?.view().await)
    }
}

/// Race lifecycle.
impl Rooms {
    pub async fn create_race(&self, guild: GuildId, host: PlayerId) -> Result<RaceView, RoomError> {
        let room = RaceRoom::new(
            guild,
            host,
            self.rules,
            self.timing,
            Arc::clone(&self.recorder),
            SmallRng::from_os_rng(),
        );
        let room = self.races.create(guild, room).await?;
        Ok(room.view().await)
    }

    pub async fn begin_join(&self, guild: GuildId, player: PlayerId) -> Result<RaceView, RoomError> {
        self.races.get(guild).await?.begin_join(player).await
    }

    pub async fn pick_horse(
        &self,
        guild: GuildId,
        player: PlayerId,
        horse: Suit,
    ) -> Result<RaceView, RoomError> {
        self.races.get(guild).await?.pick_horse(player, horse).await
    }

    pub async fn place_stake(
        &self,
        guild: GuildId,
        player: PlayerId,
        stake: Sips,
    ) -> Result<RaceView, RoomError> {
        self.races.get(guild).await?.place_stake(player, stake).await
    }

    pub async fn confirm_join(&self, guild: GuildId, player: PlayerId) -> Result<RaceView, RoomError> {
        self.races.get(guild).await?.confirm_join(player).await
    }

    pub async fn leave_race(&self, guild: GuildId, player: PlayerId) -> Result<RaceView, RoomError> {
        self.races.get(guild).await?.leave(player).await
    }

    /// Starts the race and spawns its ticker; when the ticker finishes
    /// (settled, aborted, or torn down) the room leaves the registry.
    pub async fn start_race(&self, guild: GuildId, player: PlayerId) -> Result<RaceView, RoomError> {
        let room = self.races.get(guild).await?;
        let view = room.start(player).await?;
        let races = Arc::clone(&self.races);
        tokio::spawn(async move {
            room.run().await;
            races.remove(guild).await;
        });
        Ok(view)
    }

    pub async fn race_feed(&self, guild: GuildId) -> Result<watch::Receiver<RaceView>, RoomError> {
        Ok(self.races.get(guild).await?.subscribe())
    }

    pub async fn race_view(&self, guild: GuildId) -> Result<RaceView, RoomError> {
        Ok(self.races.get(guild).await?.view().await)
    }
}

/// Teardown.
impl Rooms {
    /// Explicit reset of one session kind.
    pub async fn destroy(&self, guild: GuildId, game: GameType) -> Result<(), RoomError> {
        match game {
            GameType::Table => match self.tables.remove(guild).await {
                Some(room) => {
                    room.close().await;
                    Ok(())
                }
                None => Err(RoomError::SessionNotFound),
            },
            GameType::Race => match self.races.remove(guild).await {
                Some(room) => {
                    room.close().await;
                    Ok(())
                }
                None => Err(RoomError::SessionNotFound),
            },
        }
    }

    /// Drops every session a guild has, e.g. when the guild goes away.
    pub async fn reset(&self, guild: GuildId) {
        if let Some(room) = self.tables.remove(guild).await {
            room.close().await;
        }
        if let Some(room) = self.races.remove(guild).await {
            room.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prosit_cards::Color;
    use prosit_records::MemoryStore;

    fn rooms(store: &Arc<MemoryStore>) -> Rooms {
        Rooms::new(Arc::clone(store) as Arc<dyn Recorder>)
    }

    #[tokio::test(start_paused = true)]
    async fn one_table_per_guild_but_games_coexist() {
        let store = Arc::new(MemoryStore::new());
        let rooms = rooms(&store);
        rooms.create_table(1, 100).await.unwrap();
        assert_eq!(
            rooms.create_table(1, 200).await.err(),
            Some(RoomError::SessionAlreadyActive)
        );
        // A race in the same guild is a separate session.
        rooms.create_race(1, 100).await.unwrap();
        // Other guilds are unaffected.
        rooms.create_table(2, 100).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn destroyed_session_rejects_late_calls() {
        let store = Arc::new(MemoryStore::new());
        let rooms = rooms(&store);
        rooms.create_table(1, 100).await.unwrap();
        rooms.join(1, 200).await.unwrap();
        rooms.start_table(1, 100).await.unwrap();
        rooms.destroy(1, GameType::Table).await.unwrap();
        assert_eq!(
            rooms.guess(1, 100, Guess::Color(Color::Red)).await.err(),
            Some(RoomError::SessionNotFound)
        );
        assert_eq!(
            rooms.destroy(1, GameType::Table).await.err(),
            Some(RoomError::SessionNotFound)
        );
        // The guild can open a new table right away.
        rooms.create_table(1, 300).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn everyone_leaving_the_lobby_frees_the_guild() {
        let store = Arc::new(MemoryStore::new());
        let rooms = rooms(&store);
        rooms.create_table(1, 100).await.unwrap();
        let view = rooms.leave(1, 100).await.unwrap();
        assert!(matches!(view.next, NextStep::Aborted));
        rooms.create_table(1, 200).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn race_teardown_reaps_the_registry_slot() {
        let store = Arc::new(MemoryStore::new());
        let rooms = rooms(&store);
        rooms.create_race(1, 100).await.unwrap();
        rooms.begin_join(1, 100).await.unwrap();
        rooms.pick_horse(1, 100, Suit::H).await.unwrap();
        rooms.place_stake(1, 100, 2).await.unwrap();
        rooms.confirm_join(1, 100).await.unwrap();
        rooms.destroy(1, GameType::Race).await.unwrap();
        assert_eq!(
            rooms.begin_join(1, 200).await.err(),
            Some(RoomError::SessionNotFound)
        );
    }
}
