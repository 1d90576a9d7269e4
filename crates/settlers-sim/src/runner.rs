//! Plays matches between random bots.

use crate::bot::RandomBot;
use crate::config::SimConfig;
use crate::observer::TracingObserver;
use settlers_core::{Admin, GameResults, MatchSetup, Player, PlayerColor};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Play one match on a board generated from `seed`
pub async fn play_match(config: &SimConfig, seed: u64) -> anyhow::Result<GameResults> {
    let game = Arc::new(config.game.clone());
    let players: Vec<Arc<dyn Player>> = (0..config.players as u64)
        .map(|seat| {
            let bot = RandomBot::with_seed(Arc::clone(&game), seed.wrapping_add(seat + 1));
            Arc::new(bot) as Arc<dyn Player>
        })
        .collect();

    let admin = Admin::new(MatchSetup::standard(seed), config.game.clone(), players)?;
    admin.observers().subscribe(Arc::new(TracingObserver));

    let match_id = Uuid::new_v4();
    let results = admin
        .run()
        .instrument(info_span!("match", %match_id, seed))
        .await?;
    Ok(results)
}

/// Totals over a batch of matches
#[derive(Debug, Default)]
pub struct Tally {
    pub played: u32,
    pub undecided: u32,
    pub wins: BTreeMap<PlayerColor, u32>,
    pub eliminations: BTreeMap<PlayerColor, u32>,
}

impl Tally {
    pub fn record(&mut self, results: &GameResults) {
        self.played += 1;
        match results.winner {
            Some(color) => *self.wins.entry(color).or_default() += 1,
            None => self.undecided += 1,
        }
        for color in &results.cheaters {
            *self.eliminations.entry(*color).or_default() += 1;
        }
    }
}

pub async fn run(config: &SimConfig) -> anyhow::Result<Tally> {
    let mut tally = Tally::default();
    for index in 0..config.matches {
        let seed = config.seed.wrapping_add(u64::from(index));
        let results = play_match(config, seed).await?;
        tally.record(&results);
    }
    info!(
        played = tally.played,
        undecided = tally.undecided,
        wins = ?tally.wins,
        eliminations = ?tally.eliminations,
        "simulation finished"
    );
    Ok(tally)
}
