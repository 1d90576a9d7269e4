//! Players on the other end of a connection.
//!
//! The engine does not own a network stack. A [`Transport`] moves strings, a
//! [`PlayerCodec`] turns requests and answers into strings, and
//! [`RemotePlayer`] glues the two into a [`Player`]: requests are written and
//! the next message read back is the answer; notifications are write-only.

use crate::actions::{
    DiscardAction, InitialTurnAction, MoveRobberAction, PlayerNotification, TurnAction,
};
use crate::collaborator::{CollaboratorError, Player};
use crate::game::TurnInfo;
use crate::player::{PlayerColor, ResourceHand};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A bidirectional message channel to one remote player
#[async_trait]
pub trait Transport: Send + Sync {
    fn write(&self, message: String) -> Result<(), CollaboratorError>;

    async fn read(&self) -> Result<String, CollaboratorError>;
}

/// Everything sent to a remote player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body")]
pub enum PlayerRequest {
    InitialTurnAction(TurnInfo),
    TurnAction(TurnInfo),
    DiscardHalf(TurnInfo),
    MoveRobber(TurnInfo),
    WillAcceptTrade {
        info: TurnInfo,
        from: PlayerColor,
        they_give: ResourceHand,
        they_receive: ResourceHand,
    },
    Notify(PlayerNotification),
}

/// Wire format for one connection, chosen per call site
pub trait PlayerCodec: Send + Sync {
    fn encode_request(&self, request: &PlayerRequest) -> Result<String, CodecError>;

    fn decode_initial_turn_action(&self, raw: &str) -> Result<InitialTurnAction, CodecError>;

    fn decode_turn_action(&self, raw: &str) -> Result<TurnAction, CodecError>;

    fn decode_discard(&self, raw: &str) -> Result<DiscardAction, CodecError>;

    fn decode_move_robber(&self, raw: &str) -> Result<MoveRobberAction, CodecError>;

    fn decode_trade_answer(&self, raw: &str) -> Result<bool, CodecError>;
}

/// Plain serde_json encoding of every message
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl PlayerCodec for JsonCodec {
    fn encode_request(&self, request: &PlayerRequest) -> Result<String, CodecError> {
        Ok(serde_json::to_string(request)?)
    }

    fn decode_initial_turn_action(&self, raw: &str) -> Result<InitialTurnAction, CodecError> {
        Ok(serde_json::from_str(raw)?)
    }

    fn decode_turn_action(&self, raw: &str) -> Result<TurnAction, CodecError> {
        Ok(serde_json::from_str(raw)?)
    }

    fn decode_discard(&self, raw: &str) -> Result<DiscardAction, CodecError> {
        Ok(serde_json::from_str(raw)?)
    }

    fn decode_move_robber(&self, raw: &str) -> Result<MoveRobberAction, CodecError> {
        Ok(serde_json::from_str(raw)?)
    }

    fn decode_trade_answer(&self, raw: &str) -> Result<bool, CodecError> {
        Ok(serde_json::from_str(raw)?)
    }
}

pub struct RemotePlayer<T, C> {
    transport: T,
    codec: C,
}

impl<T: Transport, C: PlayerCodec> RemotePlayer<T, C> {
    pub fn new(transport: T, codec: C) -> Self {
        Self { transport, codec }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn round_trip(&self, request: PlayerRequest) -> Result<String, CollaboratorError> {
        let message = self.codec.encode_request(&request)?;
        self.transport.write(message)?;
        self.transport.read().await
    }
}

#[async_trait]
impl<T: Transport, C: PlayerCodec> Player for RemotePlayer<T, C> {
    async fn initial_turn_action(
        &self,
        info: &TurnInfo,
    ) -> Result<InitialTurnAction, CollaboratorError> {
        let raw = self
            .round_trip(PlayerRequest::InitialTurnAction(info.clone()))
            .await?;
        Ok(self.codec.decode_initial_turn_action(&raw)?)
    }

    async fn turn_action(&self, info: &TurnInfo) -> Result<TurnAction, CollaboratorError> {
        let raw = self
            .round_trip(PlayerRequest::TurnAction(info.clone()))
            .await?;
        Ok(self.codec.decode_turn_action(&raw)?)
    }

    async fn discard_half(&self, info: &TurnInfo) -> Result<DiscardAction, CollaboratorError> {
        let raw = self
            .round_trip(PlayerRequest::DiscardHalf(info.clone()))
            .await?;
        Ok(self.codec.decode_discard(&raw)?)
    }

    async fn move_robber(&self, info: &TurnInfo) -> Result<MoveRobberAction, CollaboratorError> {
        let raw = self
            .round_trip(PlayerRequest::MoveRobber(info.clone()))
            .await?;
        Ok(self.codec.decode_move_robber(&raw)?)
    }

    async fn will_accept_trade(
        &self,
        info: &TurnInfo,
        from: PlayerColor,
        they_give: &ResourceHand,
        they_receive: &ResourceHand,
    ) -> Result<bool, CollaboratorError> {
        let request = PlayerRequest::WillAcceptTrade {
            info: info.clone(),
            from,
            they_give: *they_give,
            they_receive: *they_receive,
        };
        let raw = self.round_trip(request).await?;
        Ok(self.codec.decode_trade_answer(&raw)?)
    }

    fn notify(&self, notification: &PlayerNotification) -> Result<(), CollaboratorError> {
        let message = self
            .codec
            .encode_request(&PlayerRequest::Notify(notification.clone()))?;
        self.transport.write(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{fallback, SafePlayer};
    use crate::config::GameConfig;
    use crate::game::{GameState, MatchSetup};
    use crate::hex::HexCoord;
    use crate::setup::Resource;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays canned answers and keeps everything written to it
    #[derive(Default)]
    struct Loopback {
        written: Mutex<Vec<String>>,
        replies: Mutex<VecDeque<String>>,
    }

    impl Loopback {
        fn replying(replies: &[&str]) -> Self {
            Self {
                written: Mutex::new(Vec::new()),
                replies: Mutex::new(replies.iter().map(|reply| reply.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl Transport for Loopback {
        fn write(&self, message: String) -> Result<(), CollaboratorError> {
            self.written.lock().unwrap().push(message);
            Ok(())
        }

        async fn read(&self) -> Result<String, CollaboratorError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(CollaboratorError::Closed)
        }
    }

    fn info() -> TurnInfo {
        GameState::new(
            MatchSetup::standard(11),
            &[PlayerColor::Red, PlayerColor::White, PlayerColor::Blue],
            Arc::new(GameConfig::default()),
        )
        .unwrap()
        .turn_info(PlayerColor::White)
        .unwrap()
    }

    #[tokio::test]
    async fn test_request_then_answer() {
        let player = RemotePlayer::new(
            Loopback::replying(&[r#"{"PlayMonopoly":"Ore"}"#, "true"]),
            JsonCodec,
        );
        let info = info();

        let action = player.turn_action(&info).await.unwrap();
        assert_eq!(action, TurnAction::PlayMonopoly(Resource::Ore));

        let give = ResourceHand::single(Resource::Wool, 1);
        let accepted = player
            .will_accept_trade(&info, PlayerColor::Red, &give, &ResourceHand::new())
            .await
            .unwrap();
        assert!(accepted);

        let written = player.transport().written.lock().unwrap().clone();
        assert_eq!(written.len(), 2);
        let first: PlayerRequest = serde_json::from_str(&written[0]).unwrap();
        assert_eq!(first, PlayerRequest::TurnAction(info.clone()));
        let second: serde_json::Value = serde_json::from_str(&written[1]).unwrap();
        assert_eq!(second["type"], "WillAcceptTrade");
        assert_eq!(second["body"]["from"], "Red");
    }

    #[tokio::test]
    async fn test_notifications_are_write_only() {
        let player = RemotePlayer::new(Loopback::default(), JsonCodec);
        player
            .notify(&PlayerNotification::DiceRolled {
                roller: PlayerColor::Red,
                roll: 8,
                payout: ResourceHand::new(),
            })
            .unwrap();
        let written = player.transport().written.lock().unwrap().clone();
        assert_eq!(written.len(), 1);
        assert!(player.transport().replies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_decode_failure_and_hangup() {
        let player = RemotePlayer::new(Loopback::replying(&["not json"]), JsonCodec);
        let info = info();
        assert!(matches!(
            player.move_robber(&info).await,
            Err(CollaboratorError::Codec(_))
        ));
        assert!(matches!(
            player.discard_half(&info).await,
            Err(CollaboratorError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_safe_remote_player_falls_back() {
        let remote = RemotePlayer::new(
            Loopback::replying(&[r#"{"hex":{"q":1,"r":0},"steal_from":null}"#]),
            JsonCodec,
        );
        let safe = SafePlayer::new(PlayerColor::White, Arc::new(remote));
        let info = info();

        let answered = safe.move_robber(&info).await;
        assert_eq!(
            answered.into_value(),
            MoveRobberAction {
                hex: HexCoord::new(1, 0),
                steal_from: None
            }
        );
        let hung_up = safe.initial_turn_action(&info).await;
        assert!(hung_up.is_fallback());
        assert_eq!(hung_up.into_value(), fallback::initial_turn_action());
    }
}
