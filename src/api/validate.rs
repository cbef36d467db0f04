//! Input validation for score submissions

pub const PLAYER_ID_MIN_CHARS: usize = 2;
pub const PLAYER_ID_MAX_CHARS: usize = 20;
pub const MAX_SCORE: f64 = 1_000_000.0;

/// 2..=20 characters of letters (any script), digits, space, `_` or `-`
pub fn is_valid_player_id(player_id: &str) -> bool {
    let len = player_id.chars().count();
    (PLAYER_ID_MIN_CHARS..=PLAYER_ID_MAX_CHARS).contains(&len)
        && player_id
            .chars()
            .all(|c| c.is_alphanumeric() || c == ' ' || c == '_' || c == '-')
}

/// Finite and within `[0, MAX_SCORE]`
pub fn is_valid_score(score: f64) -> bool {
    score.is_finite() && (0.0..=MAX_SCORE).contains(&score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_player_id_length_bounds() {
        assert!(!is_valid_player_id("a"));
        assert!(is_valid_player_id("ab"));
        assert!(is_valid_player_id(&"x".repeat(20)));
        assert!(!is_valid_player_id(&"x".repeat(21)));
        assert!(!is_valid_player_id(""));
    }

    #[test]
    fn test_player_id_charset() {
        assert!(is_valid_player_id("pig_lord-99"));
        assert!(is_valid_player_id("돼지 왕"));
        assert!(!is_valid_player_id("a<b"));
        assert!(!is_valid_player_id("drop;table"));
        assert!(!is_valid_player_id("tab\there"));
    }

    #[test]
    fn test_multibyte_counts_chars() {
        // 10 Hangul syllables are 30 bytes but 10 chars
        assert!(is_valid_player_id(&"돼".repeat(10)));
        assert!(!is_valid_player_id(&"돼".repeat(21)));
    }

    #[test]
    fn test_score_bounds() {
        assert!(is_valid_score(0.0));
        assert!(is_valid_score(150.7));
        assert!(is_valid_score(1_000_000.0));
        assert!(!is_valid_score(-0.5));
        assert!(!is_valid_score(1_000_000.5));
        assert!(!is_valid_score(f64::NAN));
        assert!(!is_valid_score(f64::INFINITY));
    }

    proptest! {
        #[test]
        fn accepts_any_allowed_id(id in "[a-zA-Z0-9 _-]{2,20}") {
            prop_assert!(is_valid_player_id(&id));
        }

        #[test]
        fn rejects_wrong_lengths(id in "[a-z]{21,40}") {
            prop_assert!(!is_valid_player_id(&id));
        }

        #[test]
        fn rejects_forbidden_chars(
            prefix in "[a-z]{1,9}",
            bad in prop::sample::select(vec!['<', '>', ';', '"', '\'', '/', '\\', '&']),
            suffix in "[a-z]{1,9}",
        ) {
            let id = format!("{}{}{}", prefix, bad, suffix);
            prop_assert!(!is_valid_player_id(&id));
        }
    }
}
