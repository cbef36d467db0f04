//! Leaderboard client
//!
//! Network results never touch the `World`. Each request runs as its own
//! task and reports back through a channel of `PresentationUpdate`s that the
//! frame loop drains into the HUD.

use std::sync::mpsc::{Receiver, Sender};

use thiserror::Error;

use crate::api::{ErrorBody, LeaderboardEntry, LeaderboardResponse, SubmitResponse};

pub const SCORE_ENDPOINT: &str = "/api/score";
pub const LEADERBOARD_ENDPOINT: &str = "/api/leaderboard";
/// Rows requested for the on-page board
pub const BOARD_TOP: usize = 50;

pub const MSG_LOADING: &str = "Loading leaderboard...";
pub const MSG_EMPTY: &str = "No records yet. Be the first!";
pub const MSG_UPDATED: &str = "Leaderboard updated";
pub const MSG_LOAD_FAILED: &str = "Couldn't load the leaderboard. Check the server setup.";
pub const MSG_SAVE_FAILED: &str = "Couldn't save your score. Check the server setup.";
pub const MSG_NEED_ID: &str = "Save a player id to record your score on the leaderboard.";
pub const MSG_INVALID_ID: &str = "Player id must be 2-20 letters, digits, spaces, _ or -.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Bad response: {0}")]
    Parse(String),
}

/// Presentation-only state changes produced by network tasks
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationUpdate {
    /// Status line under the board
    BoardMessage(String),
    /// Replace the board rows
    Leaderboard(Vec<LeaderboardEntry>),
    /// Server confirmed a submission
    ScoreSaved { player_id: String, best_score: u64 },
}

/// JSON body for a score submission
pub fn submit_body(player_id: &str, score: u64) -> String {
    serde_json::json!({ "playerId": player_id, "score": score }).to_string()
}

pub fn leaderboard_url(top: usize) -> String {
    format!("{}?top={}", LEADERBOARD_ENDPOINT, top)
}

/// Non-2xx or `ok:false` becomes `ClientError::Http` carrying the server's message
fn check_status(status: u16, body: &str) -> Result<(), ClientError> {
    let error = serde_json::from_str::<ErrorBody>(body).ok();
    let ok = (200..300).contains(&status) && error.as_ref().is_none_or(|e| e.ok);
    if ok {
        return Ok(());
    }
    Err(ClientError::Http {
        status,
        message: error
            .map(|e| e.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Failed".to_string()),
    })
}

pub fn parse_leaderboard(status: u16, body: &str) -> Result<Vec<LeaderboardEntry>, ClientError> {
    check_status(status, body)?;
    let response: LeaderboardResponse =
        serde_json::from_str(body).map_err(|e| ClientError::Parse(e.to_string()))?;
    Ok(response.items)
}

pub fn parse_submit(status: u16, body: &str) -> Result<SubmitResponse, ClientError> {
    check_status(status, body)?;
    let response: SubmitResponse =
        serde_json::from_str(body).map_err(|e| ClientError::Parse(e.to_string()))?;
    if !response.ok {
        return Err(ClientError::Http {
            status,
            message: "score save failed".to_string(),
        });
    }
    Ok(response)
}

/// Board rows as shown on the page
pub fn format_board_line(rank: usize, entry: &LeaderboardEntry) -> String {
    format!("{}. {} - {}", rank, entry.player_id, entry.best_score)
}

/// Map a leaderboard fetch outcome to HUD updates
pub fn leaderboard_updates(
    result: Result<Vec<LeaderboardEntry>, ClientError>,
) -> Vec<PresentationUpdate> {
    match result {
        Ok(items) if items.is_empty() => vec![
            PresentationUpdate::Leaderboard(items),
            PresentationUpdate::BoardMessage(MSG_EMPTY.to_string()),
        ],
        Ok(items) => vec![
            PresentationUpdate::Leaderboard(items),
            PresentationUpdate::BoardMessage(MSG_UPDATED.to_string()),
        ],
        Err(e) => {
            log::warn!("Leaderboard fetch failed: {}", e);
            vec![PresentationUpdate::BoardMessage(MSG_LOAD_FAILED.to_string())]
        }
    }
}

/// Map a submission outcome to HUD updates. A success is followed by a board refresh.
pub fn submit_updates(result: Result<SubmitResponse, ClientError>) -> Vec<PresentationUpdate> {
    match result {
        Ok(saved) => {
            log::info!("Score saved: {} best {}", saved.player_id, saved.best_score);
            vec![PresentationUpdate::ScoreSaved {
                player_id: saved.player_id,
                best_score: saved.best_score,
            }]
        }
        Err(e) => {
            log::warn!("Score submit failed: {}", e);
            vec![PresentationUpdate::BoardMessage(MSG_SAVE_FAILED.to_string())]
        }
    }
}

/// Everything pending on the channel, oldest first
pub fn drain_updates(rx: &Receiver<PresentationUpdate>) -> Vec<PresentationUpdate> {
    rx.try_iter().collect()
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn send_all(tx: &Sender<PresentationUpdate>, updates: Vec<PresentationUpdate>) {
    for update in updates {
        // Receiver gone means the page is shutting down
        if tx.send(update).is_err() {
            return;
        }
    }
}

/// Fire-and-forget browser client (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Clone)]
pub struct LeaderboardClient {
    tx: Sender<PresentationUpdate>,
}

#[cfg(target_arch = "wasm32")]
impl LeaderboardClient {
    pub fn new(tx: Sender<PresentationUpdate>) -> Self {
        Self { tx }
    }

    /// Fetch the board in the background
    pub fn refresh(&self) {
        let tx = self.tx.clone();
        send_all(
            &tx,
            vec![
                PresentationUpdate::Leaderboard(Vec::new()),
                PresentationUpdate::BoardMessage(MSG_LOADING.to_string()),
            ],
        );
        wasm_bindgen_futures::spawn_local(async move {
            let result = web::fetch_text("GET", &leaderboard_url(BOARD_TOP), None)
                .await
                .and_then(|(status, body)| parse_leaderboard(status, &body));
            send_all(&tx, leaderboard_updates(result));
        });
    }

    /// Submit a final score in the background, then refresh the board on success
    pub fn submit(&self, player_id: &str, score: u64) {
        let this = self.clone();
        let body = submit_body(player_id, score);
        wasm_bindgen_futures::spawn_local(async move {
            let result = web::fetch_text("POST", SCORE_ENDPOINT, Some(body))
                .await
                .and_then(|(status, body)| parse_submit(status, &body));
            let saved = result.is_ok();
            send_all(&this.tx, submit_updates(result));
            if saved {
                this.refresh();
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    use super::ClientError;

    fn network(e: JsValue) -> ClientError {
        ClientError::Network(format!("{:?}", e))
    }

    /// Same-origin fetch returning status and body text
    pub async fn fetch_text(
        method: &str,
        url: &str,
        body: Option<String>,
    ) -> Result<(u16, String), ClientError> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::SameOrigin);
        if let Some(body) = &body {
            opts.set_body(&JsValue::from_str(body));
        }
        let request = Request::new_with_str_and_init(url, &opts).map_err(network)?;
        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(network)?;
        }

        let window =
            web_sys::window().ok_or_else(|| ClientError::Network("no window".to_string()))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(network)?
            .dyn_into()
            .map_err(network)?;
        let status = response.status();
        let text = JsFuture::from(response.text().map_err(network)?)
            .await
            .map_err(network)?
            .as_string()
            .ok_or_else(|| ClientError::Parse("body is not text".to_string()))?;
        Ok((status, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_parse_leaderboard_ok() {
        let body = r#"{"ok":true,"top":1,"items":[{"playerId":"ab","bestScore":150,"updatedAt":"2024-05-01T10:00:00Z"}]}"#;
        let items = parse_leaderboard(200, body).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].player_id, "ab");
        assert_eq!(format_board_line(1, &items[0]), "1. ab - 150");
    }

    #[test]
    fn test_server_error_surfaces_message() {
        let err = parse_leaderboard(500, r#"{"ok":false,"error":"Server Error"}"#).unwrap_err();
        assert_eq!(
            err,
            ClientError::Http {
                status: 500,
                message: "Server Error".into()
            }
        );
        let err = parse_submit(400, r#"{"ok":false,"error":"Invalid score"}"#).unwrap_err();
        assert!(err.to_string().contains("Invalid score"));
    }

    #[test]
    fn test_garbage_body_is_parse_error() {
        assert!(matches!(
            parse_leaderboard(200, "<html>"),
            Err(ClientError::Parse(_))
        ));
        assert!(matches!(
            parse_submit(502, "<html>"),
            Err(ClientError::Http { status: 502, .. })
        ));
    }

    #[test]
    fn test_leaderboard_messages() {
        assert_eq!(
            leaderboard_updates(Ok(Vec::new()))[1],
            PresentationUpdate::BoardMessage(MSG_EMPTY.into())
        );
        assert_eq!(
            leaderboard_updates(Err(ClientError::Network("offline".into()))),
            vec![PresentationUpdate::BoardMessage(MSG_LOAD_FAILED.into())]
        );
    }

    #[test]
    fn test_submit_body_shape() {
        let json: serde_json::Value = serde_json::from_str(&submit_body("ab", 150)).unwrap();
        assert_eq!(json["playerId"], "ab");
        assert_eq!(json["score"], 150);
        assert_eq!(leaderboard_url(50), "/api/leaderboard?top=50");
    }

    #[test]
    fn test_channel_drains_in_order() {
        let (tx, rx) = mpsc::channel();
        send_all(
            &tx,
            submit_updates(Err(ClientError::Network("offline".into()))),
        );
        send_all(&tx, leaderboard_updates(Ok(Vec::new())));
        let updates = drain_updates(&rx);
        assert_eq!(updates.len(), 3);
        assert_eq!(
            updates[0],
            PresentationUpdate::BoardMessage(MSG_SAVE_FAILED.into())
        );
        assert!(drain_updates(&rx).is_empty());
    }
}
