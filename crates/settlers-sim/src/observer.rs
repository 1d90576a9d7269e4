//! Logs every game event through tracing.

use settlers_core::{CollaboratorError, GameEvent, GameObserver, ObservableGameState};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct TracingObserver;

impl GameObserver for TracingObserver {
    fn on_event(
        &self,
        event: &GameEvent,
        state: &ObservableGameState,
    ) -> Result<(), CollaboratorError> {
        match event {
            GameEvent::PhaseChanged(phase) => info!(?phase, "phase changed"),
            GameEvent::InitialPlacement { color, action } => {
                debug!(?color, settlement = ?action.settlement, road = ?action.road, "placed")
            }
            GameEvent::TurnAction { color, action } => {
                debug!(?color, ?action, roll = ?state.last_roll, "turn action")
            }
            GameEvent::RobberMoved { color, action } => {
                debug!(?color, hex = ?action.hex, victim = ?action.steal_from, "robber moved")
            }
            GameEvent::CardsDiscarded { color, action } => {
                debug!(?color, cards = action.0.total(), "discarded")
            }
            GameEvent::PlayerEliminated { color, reason } => {
                warn!(?color, %reason, "player eliminated")
            }
            GameEvent::GameFinished(results) => info!(
                winner = ?results.winner,
                scores = ?results.scores,
                rolls = state.roll_history.len(),
                "game finished"
            ),
        }
        Ok(())
    }
}
