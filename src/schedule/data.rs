use chrono::{DateTime, TimeZone, Utc};

use super::models::{MatchModel, Team};

// (id, name, city, conference, division, stadium)
const TEAMS: [(&str, &str, &str, &str, &str, &str); 32] = [
    ("BUF", "Buffalo Bills", "Buffalo", "AFC", "AFC East", "Highmark Stadium"),
    ("MIA", "Miami Dolphins", "Miami", "AFC", "AFC East", "Hard Rock Stadium"),
    ("NE", "New England Patriots", "Foxborough", "AFC", "AFC East", "Gillette Stadium"),
    ("NYJ", "New York Jets", "East Rutherford", "AFC", "AFC East", "MetLife Stadium"),
    ("BAL", "Baltimore Ravens", "Baltimore", "AFC", "AFC North", "M&T Bank Stadium"),
    ("CIN", "Cincinnati Bengals", "Cincinnati", "AFC", "AFC North", "Paycor Stadium"),
    ("CLE", "Cleveland Browns", "Cleveland", "AFC", "AFC North", "Cleveland Browns Stadium"),
    ("PIT", "Pittsburgh Steelers", "Pittsburgh", "AFC", "AFC North", "Acrisure Stadium"),
    ("HOU", "Houston Texans", "Houston", "AFC", "AFC South", "NRG Stadium"),
    ("IND", "Indianapolis Colts", "Indianapolis", "AFC", "AFC South", "Lucas Oil Stadium"),
    ("JAX", "Jacksonville Jaguars", "Jacksonville", "AFC", "AFC South", "EverBank Stadium"),
    ("TEN", "Tennessee Titans", "Nashville", "AFC", "AFC South", "Nissan Stadium"),
    ("DEN", "Denver Broncos", "Denver", "AFC", "AFC West", "Empower Field at Mile High"),
    ("KC", "Kansas City Chiefs", "Kansas City", "AFC", "AFC West", "Arrowhead Stadium"),
    ("LV", "Las Vegas Raiders", "Las Vegas", "AFC", "AFC West", "Allegiant Stadium"),
    ("LAC", "Los Angeles Chargers", "Los Angeles", "AFC", "AFC West", "SoFi Stadium"),
    ("DAL", "Dallas Cowboys", "Dallas", "NFC", "NFC East", "AT&T Stadium"),
    ("NYG", "New York Giants", "East Rutherford", "NFC", "NFC East", "MetLife Stadium"),
    ("PHI", "Philadelphia Eagles", "Philadelphia", "NFC", "NFC East", "Lincoln Financial Field"),
    ("WAS", "Washington Commanders", "Landover", "NFC", "NFC East", "Northwest Stadium"),
    ("CHI", "Chicago Bears", "Chicago", "NFC", "NFC North", "Soldier Field"),
    ("DET", "Detroit Lions", "Detroit", "NFC", "NFC North", "Ford Field"),
    ("GB", "Green Bay Packers", "Green Bay", "NFC", "NFC North", "Lambeau Field"),
    ("MIN", "Minnesota Vikings", "Minneapolis", "NFC", "NFC North", "U.S. Bank Stadium"),
    ("ATL", "Atlanta Falcons", "Atlanta", "NFC", "NFC South", "Mercedes-Benz Stadium"),
    ("CAR", "Carolina Panthers", "Charlotte", "NFC", "NFC South", "Bank of America Stadium"),
    ("NO", "New Orleans Saints", "New Orleans", "NFC", "NFC South", "Caesars Superdome"),
    ("TB", "Tampa Bay Buccaneers", "Tampa", "NFC", "NFC South", "Raymond James Stadium"),
    ("ARI", "Arizona Cardinals", "Glendale", "NFC", "NFC West", "State Farm Stadium"),
    ("LAR", "Los Angeles Rams", "Inglewood", "NFC", "NFC West", "SoFi Stadium"),
    ("SF", "San Francisco 49ers", "Santa Clara", "NFC", "NFC West", "Levi's Stadium"),
    ("SEA", "Seattle Seahawks", "Seattle", "NFC", "NFC West", "Lumen Field"),
];

pub fn seed_teams() -> Vec<Team> {
    TEAMS
        .iter()
        .map(|(id, name, city, conference, division, stadium)| Team {
            id: id.to_string(),
            name: name.to_string(),
            city: city.to_string(),
            conference: conference.to_string(),
            division: division.to_string(),
            stadium: stadium.to_string(),
        })
        .collect()
}

fn kickoff(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .earliest()
        .unwrap_or_else(Utc::now)
}

/// Opening-week fixtures used by the demo deployment
pub fn seed_matches() -> Vec<MatchModel> {
    vec![
        MatchModel::new(
            "1",
            1,
            2024,
            "KC",
            "SF",
            kickoff(2024, 9, 5, 20, 20),
        ),
        MatchModel::new(
            "2",
            1,
            2024,
            "BUF",
            "DAL",
            kickoff(2024, 9, 8, 17, 0),
        ),
    ]
}
