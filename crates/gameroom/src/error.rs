use prosit_gameplay::GameError;
use prosit_gameplay::LadderError;
use prosit_gameplay::RaceError;

/// Errors surfaced to the presentation layer for any lifecycle call.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomError {
    #[error("a session of this game is already running in this guild")]
    SessionAlreadyActive,
    #[error("no session of this game is running in this guild")]
    SessionNotFound,
    #[error("only the session host may do that")]
    NotHost,
    #[error("it is not your turn")]
    NotCurrentPlayer,
    #[error("not enough players to start")]
    InsufficientPlayers,
    #[error("pick a horse and a stake before confirming")]
    IncompleteSelection,
    #[error("you already joined this session")]
    AlreadyJoined,
    #[error("you are not part of this session")]
    NotJoined,
    #[error("stake is outside the allowed range")]
    InvalidStake,
    #[error("that action is not valid in the session's current phase")]
    OutOfPhase,
    #[error("that guess does not belong to this round's rule")]
    InvalidGuess,
    #[error("acknowledge the failed climb first")]
    PendingRetry,
}

impl From<GameError> for RoomError {
    fn from(e: GameError) -> Self {
        match e {
            GameError::NotCurrentPlayer => RoomError::NotCurrentPlayer,
            GameError::WrongPhase => RoomError::OutOfPhase,
            GameError::DeckExhausted => RoomError::OutOfPhase,
            GameError::Rule(_) => RoomError::InvalidGuess,
        }
    }
}

impl From<LadderError> for RoomError {
    fn from(e: LadderError) -> Self {
        match e {
            LadderError::Complete => RoomError::OutOfPhase,
            LadderError::PendingRetry => RoomError::PendingRetry,
            LadderError::NoFailure => RoomError::OutOfPhase,
        }
    }
}

impl From<RaceError> for RoomError {
    fn from(_: RaceError) -> Self {
        RoomError::OutOfPhase
    }
}
