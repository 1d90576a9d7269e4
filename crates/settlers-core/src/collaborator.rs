//! The player boundary.
//!
//! A [`Player`] supplies decisions; the engine never trusts it. Every call
//! goes through [`SafePlayer`], which turns errors and panics into a fixed
//! fallback decision so a broken player ends up submitting an ordinary
//! (usually illegal) move and gets eliminated by the normal rules.

use crate::actions::{
    DiscardAction, InitialTurnAction, MoveRobberAction, PlayerNotification, TurnAction,
};
use crate::game::TurnInfo;
use crate::player::{PlayerColor, ResourceHand};
use crate::remote::CodecError;
use async_trait::async_trait;
use futures_util::FutureExt;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Why a collaborator call produced no usable answer
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("connection closed")]
    Closed,
    #[error("transport failed: {0}")]
    Transport(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("{0}")]
    Failed(String),
}

/// Something that plays one color
#[async_trait]
pub trait Player: Send + Sync {
    async fn initial_turn_action(
        &self,
        info: &TurnInfo,
    ) -> Result<InitialTurnAction, CollaboratorError>;

    async fn turn_action(&self, info: &TurnInfo) -> Result<TurnAction, CollaboratorError>;

    /// Asked after a 7 when the hand is over the discard threshold
    async fn discard_half(&self, info: &TurnInfo) -> Result<DiscardAction, CollaboratorError>;

    /// Asked after rolling a 7
    async fn move_robber(&self, info: &TurnInfo) -> Result<MoveRobberAction, CollaboratorError>;

    /// `from` offers `they_give` and wants `they_receive` in return
    async fn will_accept_trade(
        &self,
        info: &TurnInfo,
        from: PlayerColor,
        they_give: &ResourceHand,
        they_receive: &ResourceHand,
    ) -> Result<bool, CollaboratorError>;

    fn notify(&self, _notification: &PlayerNotification) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Decisions used in place of a failed call
pub mod fallback {
    use crate::actions::{DiscardAction, InitialTurnAction, MoveRobberAction, TurnAction};
    use crate::hex::{Edge, EdgeDirection, HexCoord, Intersection, VertexDirection};

    pub fn initial_turn_action() -> InitialTurnAction {
        let origin = HexCoord::new(0, 0);
        InitialTurnAction {
            settlement: Intersection::new(origin, VertexDirection::North),
            road: Edge::new(origin, EdgeDirection::NorthEast),
        }
    }

    pub fn turn_action() -> TurnAction {
        TurnAction::EndTurn
    }

    pub fn discard() -> DiscardAction {
        DiscardAction::default()
    }

    pub fn move_robber() -> MoveRobberAction {
        MoveRobberAction {
            hex: HexCoord::new(0, 0),
            steal_from: None,
        }
    }

    pub fn trade_answer() -> bool {
        false
    }
}

/// Outcome of a guarded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response<T> {
    Answered(T),
    Fallback { value: T, reason: String },
}

impl<T> Response<T> {
    pub fn into_value(self) -> T {
        match self {
            Response::Answered(value) | Response::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Response::Fallback { .. })
    }
}

/// A player seen through the fault-absorbing wrapper
#[derive(Clone)]
pub struct SafePlayer {
    color: PlayerColor,
    inner: Arc<dyn Player>,
}

impl fmt::Debug for SafePlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafePlayer")
            .field("color", &self.color)
            .field("inner", &"<Player>")
            .finish()
    }
}

impl SafePlayer {
    pub fn new(color: PlayerColor, inner: Arc<dyn Player>) -> Self {
        Self { color, inner }
    }

    pub fn color(&self) -> PlayerColor {
        self.color
    }

    pub async fn initial_turn_action(&self, info: &TurnInfo) -> Response<InitialTurnAction> {
        self.guard(
            "initial_turn_action",
            self.inner.initial_turn_action(info),
            fallback::initial_turn_action,
        )
        .await
    }

    pub async fn turn_action(&self, info: &TurnInfo) -> Response<TurnAction> {
        self.guard(
            "turn_action",
            self.inner.turn_action(info),
            fallback::turn_action,
        )
        .await
    }

    pub async fn discard_half(&self, info: &TurnInfo) -> Response<DiscardAction> {
        self.guard(
            "discard_half",
            self.inner.discard_half(info),
            fallback::discard,
        )
        .await
    }

    pub async fn move_robber(&self, info: &TurnInfo) -> Response<MoveRobberAction> {
        self.guard(
            "move_robber",
            self.inner.move_robber(info),
            fallback::move_robber,
        )
        .await
    }

    pub async fn will_accept_trade(
        &self,
        info: &TurnInfo,
        from: PlayerColor,
        they_give: &ResourceHand,
        they_receive: &ResourceHand,
    ) -> Response<bool> {
        self.guard(
            "will_accept_trade",
            self.inner
                .will_accept_trade(info, from, they_give, they_receive),
            fallback::trade_answer,
        )
        .await
    }

    /// Failures are logged and otherwise ignored
    pub fn notify(&self, notification: &PlayerNotification) {
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            self.inner.notify(notification)
        }));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                warn!(color = ?self.color, %error, "dropping failed notification");
            }
            Err(_) => {
                warn!(color = ?self.color, "player panicked while being notified");
            }
        }
    }

    async fn guard<T>(
        &self,
        request: &'static str,
        call: impl Future<Output = Result<T, CollaboratorError>>,
        fallback: impl FnOnce() -> T,
    ) -> Response<T> {
        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(value)) => Response::Answered(value),
            Ok(Err(error)) => {
                warn!(color = ?self.color, request, %error, "player call failed, using fallback");
                Response::Fallback {
                    value: fallback(),
                    reason: error.to_string(),
                }
            }
            Err(_) => {
                warn!(color = ?self.color, request, "player panicked, using fallback");
                Response::Fallback {
                    value: fallback(),
                    reason: "player panicked".to_string(),
                }
            }
        }
    }
}
