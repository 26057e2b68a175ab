use super::record::LadderRecord;
use prosit_core::GuildId;
use prosit_core::PlayerId;
use prosit_core::Points;
use prosit_core::Sips;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Persistence boundary the game rooms write results through.
///
/// Called at exactly three points: game finish, ladder completion, and race
/// settle. Implementations own durability; callers log failures and carry
/// on, so an error here never corrupts a running session.
#[async_trait::async_trait]
pub trait Recorder: Send + Sync {
    /// Adds a finished game's points to the player's running total.
    async fn record_game(
        &self,
        guild: GuildId,
        player: PlayerId,
        points: Points,
    ) -> Result<(), StoreError>;

    /// Folds a completed ladder run into the player's best record, taking
    /// the minimum of each field independently.
    async fn record_ladder(
        &self,
        guild: GuildId,
        player: PlayerId,
        attempts: u32,
        sips: Sips,
    ) -> Result<(), StoreError>;

    /// Adds race winnings (sips handed out) to the player's running total.
    async fn record_race(
        &self,
        guild: GuildId,
        player: PlayerId,
        sips: Sips,
    ) -> Result<(), StoreError>;

    /// Top players by accumulated game points, highest first. `None` scope
    /// aggregates across all guilds.
    async fn top_points(
        &self,
        guild: Option<GuildId>,
        limit: usize,
    ) -> Result<Vec<(PlayerId, Points)>, StoreError>;

    /// Top ladder records, most sips first, ties broken by fewer attempts.
    async fn top_ladder(
        &self,
        guild: Option<GuildId>,
        limit: usize,
    ) -> Result<Vec<(PlayerId, LadderRecord)>, StoreError>;

    /// Top players by accumulated race winnings, highest first.
    async fn top_race(
        &self,
        guild: Option<GuildId>,
        limit: usize,
    ) -> Result<Vec<(PlayerId, Sips)>, StoreError>;
}

#[derive(Debug, Default)]
struct Tables {
    points: HashMap<(GuildId, PlayerId), Points>,
    ladder: HashMap<(GuildId, PlayerId), LadderRecord>,
    race: HashMap<(GuildId, PlayerId), Sips>,
}

/// In-memory [`Recorder`], the reference implementation and the test
/// double. State lives for the process lifetime only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collapses per-guild rows to the requested scope. Global scope sums
    /// additive totals per player.
    fn scoped<V: Copy>(
        rows: &HashMap<(GuildId, PlayerId), V>,
        guild: Option<GuildId>,
        fold: impl Fn(&mut V, V),
    ) -> HashMap<PlayerId, V> {
        let mut scoped = HashMap::new();
        for (&(g, player), &value) in rows.iter() {
            if guild.is_none_or(|scope| scope == g) {
                scoped
                    .entry(player)
                    .and_modify(|acc| fold(acc, value))
                    .or_insert(value);
            }
        }
        scoped
    }
}

#[async_trait::async_trait]
impl Recorder for MemoryStore {
    async fn record_game(
        &self,
        guild: GuildId,
        player: PlayerId,
        points: Points,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        *tables.points.entry((guild, player)).or_insert(0) += points;
        Ok(())
    }

    async fn record_ladder(
        &self,
        guild: GuildId,
        player: PlayerId,
        attempts: u32,
        sips: Sips,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .ladder
            .entry((guild, player))
            .and_modify(|record| record.merge(attempts, sips))
            .or_insert(LadderRecord { attempts, sips });
        Ok(())
    }

    async fn record_race(
        &self,
        guild: GuildId,
        player: PlayerId,
        sips: Sips,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        *tables.race.entry((guild, player)).or_insert(0) += sips;
        Ok(())
    }

    async fn top_points(
        &self,
        guild: Option<GuildId>,
        limit: usize,
    ) -> Result<Vec<(PlayerId, Points)>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows = Self::scoped(&tables.points, guild, |acc, v| *acc += v)
            .into_iter()
            .collect::<Vec<_>>();
        rows.sort_by_key(|&(player, points)| (std::cmp::Reverse(points), player));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn top_ladder(
        &self,
        guild: Option<GuildId>,
        limit: usize,
    ) -> Result<Vec<(PlayerId, LadderRecord)>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows = Self::scoped(&tables.ladder, guild, |acc, v| {
            acc.merge(v.attempts, v.sips)
        })
        .into_iter()
        .collect::<Vec<_>>();
        rows.sort_by_key(|&(player, record)| {
            (std::cmp::Reverse(record.sips), record.attempts, player)
        });
        rows.truncate(limit);
        Ok(rows)
    }

    async fn top_race(
        &self,
        guild: Option<GuildId>,
        limit: usize,
    ) -> Result<Vec<(PlayerId, Sips)>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows = Self::scoped(&tables.race, guild, |acc, v| *acc += v)
            .into_iter()
            .collect::<Vec<_>>();
        rows.sort_by_key(|&(player, sips)| (std::cmp::Reverse(sips), player));
        rows.truncate(limit);
        Ok(rows)
    }
}
