//! Serverless endpoints: score submission and leaderboard query
//!
//! Handlers never fail: every outcome, including backend trouble, becomes
//! an `ApiResponse` with a JSON body.

use chrono::{DateTime, Utc};

use super::error::ApiError;
use super::store::ScoreStore;
use super::types::{
    ApiRequest, ApiResponse, LeaderboardResponse, Method, ScoreSubmission, SubmitResponse,
};
use super::validate::{is_valid_player_id, is_valid_score};

pub const DEFAULT_TOP: usize = 10;
pub const MAX_TOP: usize = 50;

/// `POST` `{playerId, score}`: keep the higher of the stored and submitted best
pub fn handle_score<S: ScoreStore + ?Sized>(
    store: &mut S,
    request: &ApiRequest,
    now: DateTime<Utc>,
) -> ApiResponse {
    match submit_score(store, request, now) {
        Ok(body) => ApiResponse::json(200, &body),
        Err(e) => e.into_response(),
    }
}

/// `GET ?top=N`: best scores, highest first, earliest update wins ties
pub fn handle_leaderboard<S: ScoreStore + ?Sized>(store: &S, request: &ApiRequest) -> ApiResponse {
    match query_leaderboard(store, request) {
        Ok(body) => ApiResponse::json(200, &body),
        Err(e) => e.into_response(),
    }
}

fn submit_score<S: ScoreStore + ?Sized>(
    store: &mut S,
    request: &ApiRequest,
    now: DateTime<Utc>,
) -> Result<SubmitResponse, ApiError> {
    if request.method != Method::Post {
        return Err(ApiError::MethodNotAllowed { allow: "POST" });
    }

    let body = request.body.as_deref().unwrap_or("").trim();
    let submission: ScoreSubmission = if body.is_empty() {
        ScoreSubmission::default()
    } else {
        serde_json::from_str(body).map_err(|_| ApiError::InvalidBody)?
    };

    let player_id = submission
        .player_id
        .as_ref()
        .and_then(|v| v.as_str())
        .filter(|id| is_valid_player_id(id))
        .ok_or(ApiError::InvalidPlayerId)?;
    let score = submission
        .score
        .as_ref()
        .and_then(|v| v.as_f64())
        .filter(|s| is_valid_score(*s))
        .ok_or(ApiError::InvalidScore)?;

    let existing = store.best_score(player_id)?;
    let best_score = existing.unwrap_or(0).max(score.floor() as u64);
    store.upsert_best(player_id, best_score, now)?;

    log::info!(
        "Score submitted: {} -> best {} (was {:?})",
        player_id,
        best_score,
        existing
    );
    Ok(SubmitResponse {
        ok: true,
        player_id: player_id.to_string(),
        best_score,
    })
}

fn query_leaderboard<S: ScoreStore + ?Sized>(
    store: &S,
    request: &ApiRequest,
) -> Result<LeaderboardResponse, ApiError> {
    if request.method != Method::Get {
        return Err(ApiError::MethodNotAllowed { allow: "GET" });
    }
    let top = parse_top(request.query_param("top"));
    let items = store.top(top)?;
    Ok(LeaderboardResponse {
        ok: true,
        top,
        items,
    })
}

/// Clamp `top` to `1..=50`. Missing, zero and non-numeric values use the default.
pub fn parse_top(raw: Option<&str>) -> usize {
    let n = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    if n.is_nan() || n == 0.0 {
        return DEFAULT_TOP;
    }
    n.clamp(1.0, MAX_TOP as f64).floor() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::StoreError;
    use crate::api::store::MemoryStore;
    use crate::api::types::{ErrorBody, LeaderboardEntry};
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn submit(store: &mut MemoryStore, body: &str, now: i64) -> ApiResponse {
        handle_score(store, &ApiRequest::post(body), at(now))
    }

    fn error_of(response: &ApiResponse) -> String {
        serde_json::from_str::<ErrorBody>(&response.body).unwrap().error
    }

    /// Backend that always fails
    struct BrokenStore;

    impl ScoreStore for BrokenStore {
        fn best_score(&self, _: &str) -> Result<Option<u64>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        fn upsert_best(&mut self, _: &str, _: u64, _: DateTime<Utc>) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        fn top(&self, _: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    #[test]
    fn test_submit_then_query() {
        let mut store = MemoryStore::new();
        let response = submit(&mut store, r#"{"playerId":"ab","score":150.7}"#, 1);
        assert_eq!(response.status, 200);
        let body: SubmitResponse = serde_json::from_str(&response.body).unwrap();
        assert_eq!(
            body,
            SubmitResponse {
                ok: true,
                player_id: "ab".into(),
                best_score: 150
            }
        );

        let response = handle_leaderboard(&store, &ApiRequest::get("top=1"));
        assert_eq!(response.status, 200);
        let board: LeaderboardResponse = serde_json::from_str(&response.body).unwrap();
        assert_eq!(board.top, 1);
        assert_eq!(board.items.len(), 1);
        assert_eq!(board.items[0].player_id, "ab");
        assert_eq!(board.items[0].best_score, 150);
    }

    #[test]
    fn test_lower_score_keeps_best() {
        let mut store = MemoryStore::new();
        submit(&mut store, r#"{"playerId":"ab","score":300}"#, 1);
        let response = submit(&mut store, r#"{"playerId":"ab","score":120}"#, 2);
        let body: SubmitResponse = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body.best_score, 300);
        assert_eq!(store.best_score("ab").unwrap(), Some(300));
    }

    #[test]
    fn test_validation_errors() {
        let mut store = MemoryStore::new();
        let cases = [
            (r#"{"playerId":"a","score":10}"#, "Invalid playerId (2~20 chars)"),
            (r#"{"playerId":"a<b","score":10}"#, "Invalid playerId (2~20 chars)"),
            (r#"{"playerId":42,"score":10}"#, "Invalid playerId (2~20 chars)"),
            (r#"{"score":10}"#, "Invalid playerId (2~20 chars)"),
            (r#"{"playerId":"ab","score":"10"}"#, "Invalid score"),
            (r#"{"playerId":"ab","score":-1}"#, "Invalid score"),
            (r#"{"playerId":"ab","score":1000001}"#, "Invalid score"),
            (r#"{"playerId":"ab"}"#, "Invalid score"),
            ("{oops", "Invalid JSON body"),
        ];
        for (body, message) in cases {
            let response = submit(&mut store, body, 1);
            assert_eq!(response.status, 400, "body {}", body);
            assert_eq!(error_of(&response), message, "body {}", body);
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_wrong_methods() {
        let mut store = MemoryStore::new();
        let response = handle_score(&mut store, &ApiRequest::get(""), at(0));
        assert_eq!(response.status, 405);
        assert_eq!(response.header("Allow"), Some("POST"));

        let response = handle_leaderboard(&store, &ApiRequest::post("{}"));
        assert_eq!(response.status, 405);
        assert_eq!(response.header("Allow"), Some("GET"));

        let response = handle_leaderboard(&store, &ApiRequest::new("DELETE", "", None));
        assert_eq!(response.status, 405);
    }

    #[test]
    fn test_backend_failure_is_generic_500() {
        let mut store = BrokenStore;
        let response = handle_score(
            &mut store,
            &ApiRequest::post(r#"{"playerId":"ab","score":1}"#),
            at(0),
        );
        assert_eq!(response.status, 500);
        assert_eq!(error_of(&response), "Server Error");

        let response = handle_leaderboard(&store, &ApiRequest::get(""));
        assert_eq!(response.status, 500);
        assert!(!response.body.contains("refused"));
    }

    #[test]
    fn test_parse_top() {
        assert_eq!(parse_top(None), 10);
        assert_eq!(parse_top(Some("")), 10);
        assert_eq!(parse_top(Some("abc")), 10);
        assert_eq!(parse_top(Some("0")), 10);
        assert_eq!(parse_top(Some("-3")), 1);
        assert_eq!(parse_top(Some("7")), 7);
        assert_eq!(parse_top(Some("7.9")), 7);
        assert_eq!(parse_top(Some("500")), 50);
    }

    proptest! {
        #[test]
        fn best_never_decreases(scores in proptest::collection::vec(0.0f64..1_000_000.0, 1..20)) {
            let mut store = MemoryStore::new();
            let mut expected = 0u64;
            for (i, score) in scores.iter().enumerate() {
                let body = format!(r#"{{"playerId":"pig","score":{}}}"#, score);
                let response = submit(&mut store, &body, i as i64);
                prop_assert_eq!(response.status, 200);
                expected = expected.max(score.floor() as u64);
                prop_assert_eq!(store.best_score("pig").unwrap(), Some(expected));
            }
        }

        #[test]
        fn leaderboard_capped_and_ordered(
            rows in proptest::collection::vec((0u64..50, 0i64..100), 0..80),
            top in -10i64..100,
        ) {
            let mut store = MemoryStore::new();
            for (i, (score, time)) in rows.iter().enumerate() {
                store.upsert_best(&format!("p{}", i), *score, at(*time)).unwrap();
            }
            let response = handle_leaderboard(&store, &ApiRequest::get(&format!("top={}", top)));
            let board: LeaderboardResponse = serde_json::from_str(&response.body).unwrap();
            let cap = if top == 0 { DEFAULT_TOP } else { top.clamp(1, 50) as usize };
            prop_assert_eq!(board.top, cap);
            prop_assert!(board.items.len() <= cap);
            prop_assert_eq!(board.items.len(), rows.len().min(cap));
            for pair in board.items.windows(2) {
                prop_assert!(
                    pair[0].best_score > pair[1].best_score
                        || (pair[0].best_score == pair[1].best_score
                            && pair[0].updated_at <= pair[1].updated_at)
                );
            }
        }
    }
}
