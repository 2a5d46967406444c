//! Shared builders for integration tests.

use chrono::{DateTime, TimeZone, Utc};

use edgebook::Event;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 25, 16, 0, 0).unwrap()
}

/// Chiefs at home against the Bills, three books. BookB lists the teams in
/// reverse order, so its "home" quotes belong to Buffalo.
pub const NFL_EVENT_JSON: &str = r#"{
    "home_id": "Kansas City Chiefs",
    "away_id": "Buffalo Bills",
    "sport": "NFL",
    "scheduled_at": "2026-10-25T20:25:00Z",
    "bookmaker_snapshots": [
        {
            "book_id": "BookA",
            "observed_at": "2026-10-25T15:50:00Z",
            "markets": {
                "moneyline": [
                    {"side": "home", "price": -150},
                    {"side": "away", "price": 130}
                ],
                "spread": [
                    {"side": "home", "line": -3.0, "price": -110},
                    {"side": "away", "line": 3.0, "price": -110}
                ],
                "total": [
                    {"side": "over", "line": 47.5, "price": -110},
                    {"side": "under", "line": 47.5, "price": -110}
                ]
            }
        },
        {
            "book_id": "BookB",
            "observed_at": "2026-10-25T15:55:00Z",
            "listed_as": {"home": "Buffalo Bills", "away": "Kansas City Chiefs"},
            "markets": {
                "moneyline": [
                    {"side": "home", "price": 135},
                    {"side": "away", "price": -155}
                ],
                "spread": [
                    {"side": "home", "line": 3.0, "price": -105},
                    {"side": "away", "line": -3.0, "price": -115}
                ]
            }
        },
        {
            "book_id": "BookC",
            "observed_at": "2026-10-25T14:00:00Z",
            "markets": {
                "moneyline": [
                    {"side": "home", "price": -145},
                    {"side": "away", "price": 120}
                ],
                "total": [
                    {"side": "over", "line": 47.5, "price": -105},
                    {"side": "under", "line": 47.5, "price": -115}
                ]
            }
        }
    ]
}"#;

pub fn make_nfl_event() -> Event {
    serde_json::from_str(NFL_EVENT_JSON).unwrap()
}
