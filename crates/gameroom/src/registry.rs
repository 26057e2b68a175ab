use super::error::RoomError;
use prosit_core::GuildId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One live session per guild, per game type.
///
/// Insertion and removal are atomic with respect to lookup: a call racing
/// with teardown either finds the room or gets `SessionNotFound`, never a
/// half-destroyed session.
#[derive(Debug, Default)]
pub struct Registry<R> {
    rooms: Mutex<HashMap<GuildId, Arc<R>>>,
}

impl<R> Registry<R> {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a fresh room, refusing if the guild already has one.
    pub async fn create(&self, guild: GuildId, room: R) -> Result<Arc<R>, RoomError> {
        let mut rooms = self.rooms.lock().await;
        match rooms.contains_key(&guild) {
            true => Err(RoomError::SessionAlreadyActive),
            false => {
                let room = Arc::new(room);
                rooms.insert(guild, Arc::clone(&room));
                Ok(room)
            }
        }
    }

    pub async fn get(&self, guild: GuildId) -> Result<Arc<R>, RoomError> {
        self.rooms
            .lock()
            .await
            .get(&guild)
            .cloned()
            .ok_or(RoomError::SessionNotFound)
    }

    pub async fn remove(&self, guild: GuildId) -> Option<Arc<R>> {
        self.rooms.lock().await.remove(&guild)
    }
}
