//! Schedule and roster collaborator

use crate::ids::Position;
use chrono::{DateTime, Utc};
use scoring_engine::{GameId, PlayerId, Season, Week};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A scheduled NFL game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub season: Season,
    pub week: Week,
    pub kickoff: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
}

impl Game {
    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }
}

/// Roster entry for a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
    pub eligible_positions: BTreeSet<Position>,
}

impl PlayerInfo {
    pub fn is_eligible(&self, position: Position) -> bool {
        self.eligible_positions.contains(&position)
    }
}

/// Explicit week-level pick deadline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekDeadline {
    pub season: Season,
    pub week: Week,
    pub deadline: DateTime<Utc>,
}

/// Player eligibility, team affiliation and per-week game assignment
pub trait ScheduleProvider: Send + Sync {
    fn player(&self, player_id: &PlayerId) -> Option<PlayerInfo>;

    /// The game `team` plays in the given week, `None` on a bye
    fn game_for_team(&self, season: Season, week: Week, team: &str) -> Option<Game>;

    fn week_deadline(&self, season: Season, week: Week) -> Option<DateTime<Utc>>;

    /// Game a player appears in for the given week
    fn game_for_player(&self, season: Season, week: Week, player_id: &PlayerId) -> Option<Game> {
        let player = self.player(player_id)?;
        self.game_for_team(season, week, &player.team)
    }
}

/// Schedule held in memory, loadable from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemorySchedule {
    players: HashMap<PlayerId, PlayerInfo>,
    games: HashMap<GameId, Game>,
    deadlines: Vec<WeekDeadline>,
}

impl InMemorySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_player(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        team: impl Into<String>,
        positions: &[Position],
    ) -> &mut Self {
        let id = PlayerId::new(id);
        self.players.insert(
            id.clone(),
            PlayerInfo {
                id,
                name: name.into(),
                team: team.into(),
                eligible_positions: positions.iter().copied().collect(),
            },
        );
        self
    }

    pub fn add_game(&mut self, game: Game) -> &mut Self {
        self.games.insert(game.id.clone(), game);
        self
    }

    pub fn set_deadline(&mut self, season: Season, week: Week, deadline: DateTime<Utc>) -> &mut Self {
        self.deadlines.retain(|d| !(d.season == season && d.week == week));
        self.deadlines.push(WeekDeadline { season, week, deadline });
        self
    }

    pub fn game(&self, game_id: &GameId) -> Option<&Game> {
        self.games.get(game_id)
    }

    /// Games of one week ordered by kickoff
    pub fn games_in_week(&self, season: Season, week: Week) -> Vec<&Game> {
        let mut games: Vec<&Game> =
            self.games.values().filter(|g| g.season == season && g.week == week).collect();
        games.sort_by(|a, b| a.kickoff.cmp(&b.kickoff).then_with(|| a.id.cmp(&b.id)));
        games
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl ScheduleProvider for InMemorySchedule {
    fn player(&self, player_id: &PlayerId) -> Option<PlayerInfo> {
        self.players.get(player_id).cloned()
    }

    fn game_for_team(&self, season: Season, week: Week, team: &str) -> Option<Game> {
        self.games_in_week(season, week).into_iter().find(|g| g.involves(team)).cloned()
    }

    fn week_deadline(&self, season: Season, week: Week) -> Option<DateTime<Utc>> {
        self.deadlines.iter().find(|d| d.season == season && d.week == week).map(|d| d.deadline)
    }
}
