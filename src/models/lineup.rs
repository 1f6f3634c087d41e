// Roster (lineup) model
//
// A lineup is an ordered list of players tagged as user-owned or
// field-owned. Validation covers the salary cap and position
// requirements; user lineups are assumed pre-validated by the caller and
// only field lineups are checked during construction.

use crate::models::contest::Contest;
use crate::models::player::Player;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Who owns a lineup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineupKind {
    /// Supplied by the caller for evaluation
    User,
    /// Synthesized as part of the opponent field
    Field,
}

/// A contest roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lineup {
    pub players: Vec<Player>,
    pub kind: LineupKind,
}

impl Lineup {
    pub fn new(players: Vec<Player>, kind: LineupKind) -> Self {
        Lineup { players, kind }
    }

    /// Combined salary of all players
    pub fn total_salary(&self) -> u32 {
        self.players.iter().map(|p| p.salary).sum()
    }

    /// Count of players per position
    pub fn position_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for player in &self.players {
            *counts.entry(player.position.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Whether the lineup fits the contest's cap and position requirements
    pub fn satisfies(&self, contest: &Contest) -> bool {
        if self.total_salary() > contest.salary_cap {
            return false;
        }
        self.position_counts() == contest.roster_requirements
    }
}
