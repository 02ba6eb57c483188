//! Bounded retry with a best-effort fallback.

/// Outcome of [`best_of`]: the chosen value plus whatever it still violates.
#[derive(Debug, Clone)]
pub struct Bounded<T, V> {
    pub value: T,
    pub violations: Vec<V>,
    pub attempts: u32,
}

impl<T, V> Bounded<T, V> {
    pub fn satisfied(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Run `attempt` until it produces no violations or `max_attempts` is used up.
///
/// Returns the first clean attempt, otherwise the attempt with the fewest
/// violations (earliest wins ties). At least one attempt always runs.
pub fn best_of<T, V>(
    max_attempts: u32,
    mut attempt: impl FnMut(u32) -> (T, Vec<V>),
) -> Bounded<T, V> {
    let max_attempts = max_attempts.max(1);
    let (value, violations) = attempt(1);
    let mut best = Bounded {
        value,
        violations,
        attempts: 1,
    };
    if best.satisfied() {
        return best;
    }

    for n in 2..=max_attempts {
        let (value, violations) = attempt(n);
        if violations.is_empty() {
            return Bounded {
                value,
                violations,
                attempts: n,
            };
        }
        if violations.len() < best.violations.len() {
            best = Bounded {
                value,
                violations,
                attempts: n,
            };
        }
    }

    best.attempts = max_attempts;
    best
}
