// Domain models: players and their score distributions, contests with
// payout schedules, and rosters

pub mod contest;
pub mod lineup;
pub mod player;
