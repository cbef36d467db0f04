//! High-score API
//!
//! Two serverless functions over a single best-score table. The handlers
//! take a platform-neutral `ApiRequest` and return an `ApiResponse`, so any
//! runtime (or the native CLI) can host them.

pub mod error;
pub mod handlers;
pub mod store;
pub mod types;
pub mod validate;

pub use error::{ApiError, StoreError};
pub use handlers::{DEFAULT_TOP, MAX_TOP, handle_leaderboard, handle_score, parse_top};
#[cfg(not(target_arch = "wasm32"))]
pub use store::JsonFileStore;
pub use store::{MemoryStore, ScoreStore, sort_leaderboard};
pub use types::{
    ApiRequest, ApiResponse, ErrorBody, LeaderboardEntry, LeaderboardResponse, Method,
    ScoreSubmission, SubmitResponse,
};
pub use validate::{is_valid_player_id, is_valid_score};
