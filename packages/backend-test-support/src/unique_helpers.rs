//! Helpers for generating unique test data
//!
//! ULID-based so tests sharing one store (or one Redis instance) never
//! collide on game codes or player ids.

use ulid::Ulid;

/// Generate a unique string with the given prefix
///
/// ```
/// use bunco_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("player");
/// let id2 = unique_str("player");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("player-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate a unique, upper-case tournament code.
///
/// ```
/// use bunco_test_support::unique_helpers::unique_game_code;
///
/// let code = unique_game_code();
/// assert!(code.starts_with("T"));
/// assert_eq!(code, code.to_uppercase());
/// ```
pub fn unique_game_code() -> String {
    format!("T{}", Ulid::new())
}

/// Generate `n` unique human player ids sharing a prefix.
pub fn unique_player_ids(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|_| unique_str(prefix)).collect()
}
