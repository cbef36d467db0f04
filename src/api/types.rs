//! Request/response envelopes and JSON wire types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// HTTP verbs the handlers distinguish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other,
}

impl From<&str> for Method {
    fn from(s: &str) -> Self {
        match s {
            "GET" => Method::Get,
            "POST" => Method::Post,
            _ => Method::Other,
        }
    }
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Other => "OTHER",
        }
    }
}

/// Platform-neutral view of an incoming request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Decoded query pairs in arrival order
    pub query: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: &str, query: &str, body: Option<String>) -> Self {
        Self {
            method: Method::from(method),
            query: parse_query(query),
            body,
        }
    }

    pub fn get(query: &str) -> Self {
        Self::new("GET", query, None)
    }

    pub fn post(body: impl Into<String>) -> Self {
        Self::new("POST", "", Some(body.into()))
    }

    /// First value of a query parameter
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Split `a=1&b=2` (leading `?` optional). Keys without `=` get an empty value.
/// Keys and values are form-decoded.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (decode_component(k), decode_component(v)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

/// `+` becomes a space and `%XX` a byte; malformed escapes pass through
/// and invalid UTF-8 is replaced
fn decode_component(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => match (
                bytes.get(i + 1).and_then(hex_value),
                bytes.get(i + 2).and_then(hex_value),
            ) {
                (Some(hi), Some(lo)) => {
                    out.push((hi << 4) | lo);
                    i += 2;
                }
                _ => out.push(b'%'),
            },
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: &u8) -> Option<u8> {
    (*b as char).to_digit(16).map(|d| d as u8)
}

/// Outgoing response, ready to hand to any serverless runtime
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ApiResponse {
    pub fn json<T: Serialize>(status: u16, body: &T) -> Self {
        let body = serde_json::to_string(body)
            .unwrap_or_else(|_| r#"{"ok":false,"error":"Server Error"}"#.to_string());
        Self {
            status,
            headers: vec![("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string())],
            body,
        }
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// One row of the score table, also the leaderboard item shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub player_id: String,
    pub best_score: u64,
    pub updated_at: DateTime<Utc>,
}

/// POST body; fields stay untyped so wrong types map to validation errors
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    #[serde(default)]
    pub player_id: Option<serde_json::Value>,
    #[serde(default)]
    pub score: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub ok: bool,
    pub player_id: String,
    pub best_score: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub ok: bool,
    pub top: usize,
    pub items: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
}
