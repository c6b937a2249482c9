use scoring_engine::{Season, Week};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// League identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeagueId(pub String);

/// League member identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub String);

impl LeagueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for LeagueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pick slot position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "QB")]
    Quarterback,
    #[serde(rename = "RB")]
    RunningBack,
    #[serde(rename = "WR")]
    WideReceiver,
}

impl Position {
    pub const ALL: [Position; 3] =
        [Position::Quarterback, Position::RunningBack, Position::WideReceiver];

    pub fn abbreviation(self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "QB" => Ok(Position::Quarterback),
            "RB" => Ok(Position::RunningBack),
            "WR" => Ok(Position::WideReceiver),
            other => Err(format!("Unknown position: {other}")),
        }
    }
}

/// (league, season, week): the unit of lock and backfill exclusivity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeekKey {
    pub league: LeagueId,
    pub season: Season,
    pub week: Week,
}

impl WeekKey {
    pub fn new(league: LeagueId, season: Season, week: Week) -> Self {
        Self { league, season, week }
    }

    pub fn member(&self, member: MemberId) -> MemberWeekKey {
        MemberWeekKey {
            league: self.league.clone(),
            season: self.season,
            week: self.week,
            member,
        }
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/w{}", self.league, self.season, self.week)
    }
}

/// (league, season, week, member): addresses one member's pick set
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberWeekKey {
    pub league: LeagueId,
    pub season: Season,
    pub week: Week,
    pub member: MemberId,
}

impl MemberWeekKey {
    pub fn new(league: LeagueId, season: Season, week: Week, member: MemberId) -> Self {
        Self { league, season, week, member }
    }

    pub fn week_key(&self) -> WeekKey {
        WeekKey::new(self.league.clone(), self.season, self.week)
    }
}

impl fmt::Display for MemberWeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/w{}/{}", self.league, self.season, self.week, self.member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_parsing() {
        assert_eq!("qb".parse::<Position>().unwrap(), Position::Quarterback);
        assert_eq!(" WR ".parse::<Position>().unwrap(), Position::WideReceiver);
        assert!("TE".parse::<Position>().is_err());
    }

    #[test]
    fn test_position_serde_uses_abbreviations() {
        assert_eq!(serde_json::to_string(&Position::RunningBack).unwrap(), "\"RB\"");
        let p: Position = serde_json::from_str("\"QB\"").unwrap();
        assert_eq!(p, Position::Quarterback);
    }

    #[test]
    fn test_key_display() {
        let week = WeekKey::new(LeagueId::new("office"), 2025, 4);
        let member = week.member(MemberId::new("dana"));
        assert_eq!(week.to_string(), "office/2025/w4");
        assert_eq!(member.to_string(), "office/2025/w4/dana");
        assert_eq!(member.week_key(), week);
    }
}
