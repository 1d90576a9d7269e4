//! Rule constants and the configurable policy points of a match.

use crate::setup::Resource;
use serde::{Deserialize, Serialize};

/// What a gold tile pays when its number is rolled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoldPolicy {
    /// Pay this resource, as if the tile produced it
    Pay(Resource),
    /// Gold produces nothing
    Skip,
}

/// What happens when the supply cannot cover every color's payout of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortagePolicy {
    /// Nobody receives that type this roll
    WithholdType,
    /// If a single color is owed that type it takes whatever is left;
    /// with several claimants the type is withheld
    SingleRecipient,
}

/// Tunable parameters of a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub victory_points_to_win: u32,
    /// The match ends when fewer colors than this remain
    pub min_players: usize,
    /// Hands larger than this must discard half on a 7
    pub discard_threshold: u32,
    pub min_longest_road: u32,
    pub min_largest_army: u32,
    pub development_card_play_limit: u32,
    pub year_of_plenty_cards: u32,
    pub roads_per_player: u32,
    pub settlements_per_player: u32,
    pub cities_per_player: u32,
    pub gold_policy: GoldPolicy,
    pub shortage_policy: ShortagePolicy,
    /// The tile under the robber produces nothing when its number is rolled
    pub robber_blocks_production: bool,
    /// End the match without a winner after this many main-loop actions
    pub max_turn_actions: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            victory_points_to_win: 10,
            min_players: 3,
            discard_threshold: 7,
            min_longest_road: 5,
            min_largest_army: 3,
            development_card_play_limit: 1,
            year_of_plenty_cards: 2,
            roads_per_player: 15,
            settlements_per_player: 5,
            cities_per_player: 4,
            gold_policy: GoldPolicy::Pay(Resource::Lumber),
            shortage_policy: ShortagePolicy::WithholdType,
            robber_blocks_production: false,
            max_turn_actions: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: GameConfig = serde_json::from_str(
            r#"{"victory_points_to_win": 8, "shortage_policy": "SingleRecipient"}"#,
        )
        .unwrap();
        assert_eq!(config.victory_points_to_win, 8);
        assert_eq!(config.shortage_policy, ShortagePolicy::SingleRecipient);
        assert_eq!(config.discard_threshold, 7);
        assert_eq!(config.gold_policy, GoldPolicy::Pay(Resource::Lumber));
        assert!(!config.robber_blocks_production);
    }

    #[test]
    fn test_robber_blocking_can_be_enabled() {
        let config: GameConfig =
            serde_json::from_str(r#"{"robber_blocks_production": true}"#).unwrap();
        assert!(config.robber_blocks_production);
        assert_eq!(config.min_longest_road, 5);
    }
}
