use serde::{Deserialize, Serialize};

/// Sport with a managed daily-bets table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sport {
    Nba,
    Nfl,
    Mlb,
    Wnba,
}

impl Sport {
    /// Every supported sport, in table-creation order
    pub const ALL: [Sport; 4] = [Sport::Nba, Sport::Nfl, Sport::Mlb, Sport::Wnba];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Nba => "NBA",
            Sport::Nfl => "NFL",
            Sport::Mlb => "MLB",
            Sport::Wnba => "WNBA",
        }
    }

    /// Postgres table holding this sport's daily bets
    pub fn table(&self) -> &'static str {
        match self {
            Sport::Nba => "v2_nba_daily_bets",
            Sport::Nfl => "v2_nfl_daily_bets",
            Sport::Mlb => "v2_mlb_daily_bets",
            Sport::Wnba => "v2_wnba_daily_bets",
        }
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Sport {
    type Error = String;

    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        match s.to_uppercase().as_str() {
            "NBA" => Ok(Sport::Nba),
            "NFL" => Ok(Sport::Nfl),
            "MLB" => Ok(Sport::Mlb),
            "WNBA" => Ok(Sport::Wnba),
            _ => Err(format!("Unknown sport: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names() {
        assert_eq!(Sport::Nba.table(), "v2_nba_daily_bets");
        assert_eq!(Sport::Nfl.table(), "v2_nfl_daily_bets");
        assert_eq!(Sport::Mlb.table(), "v2_mlb_daily_bets");
        assert_eq!(Sport::Wnba.table(), "v2_wnba_daily_bets");
    }

    #[test]
    fn test_parse_roundtrip() {
        for sport in Sport::ALL {
            assert_eq!(Sport::try_from(sport.as_str()), Ok(sport));
        }
        assert_eq!(Sport::try_from("wnba"), Ok(Sport::Wnba));
        assert!(Sport::try_from("NHL").is_err());
    }

    #[test]
    fn test_every_sport_has_a_distinct_table() {
        let mut tables: Vec<&str> = Sport::ALL.iter().map(|s| s.table()).collect();
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), Sport::ALL.len());
    }
}
