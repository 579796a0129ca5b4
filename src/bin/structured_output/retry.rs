use rand::Rng;
use serde::Deserialize;
use std::time::Duration;

/// Upper bound on attempts, the first one included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct StopAfterAttempt(pub usize);

/// Delay between a rejected attempt and the next one, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Wait {
    #[default]
    None,
    Fixed {
        seconds: f64,
    },
    Random {
        min: f64,
        max: f64,
    },
    /// `multiplier * 2^(attempt - 1)`, clamped to `[min, max]`.
    Exponential {
        multiplier: f64,
        min: f64,
        max: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RetryPolicy {
    #[serde(rename = "stop_after_attempt")]
    pub stop: StopAfterAttempt,
    #[serde(default)]
    pub wait: Wait,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::max_retries(3)
    }
}

impl RetryPolicy {
    /// Stop after `attempts` attempts, retrying immediately.
    pub fn max_retries(attempts: usize) -> Self {
        Self::stop_after_attempt(attempts)
    }

    pub fn stop_after_attempt(attempts: usize) -> Self {
        Self {
            stop: StopAfterAttempt(attempts.max(1)),
            wait: Wait::None,
        }
    }

    pub fn with_wait(mut self, wait: Wait) -> Self {
        self.wait = wait;
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.stop.0.max(1)
    }

    /// Delay after the `attempt`-th attempt (1-based) was rejected.
    pub fn delay_after<R: Rng>(&self, attempt: usize, rng: &mut R) -> Duration {
        let seconds = match self.wait {
            Wait::None => 0.0,
            Wait::Fixed { seconds } => seconds,
            Wait::Random { min, max } if max > min => rng.gen_range(min..max),
            Wait::Random { min, .. } => min,
            Wait::Exponential { multiplier, min, max } => {
                let exponent = attempt.saturating_sub(1).min(i32::MAX as usize) as i32;
                let raw = multiplier * 2f64.powi(exponent);
                raw.min(max).max(min.max(0.0))
            }
        };
        Duration::from_secs_f64(seconds.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_max_retries_has_no_wait() {
        let policy = RetryPolicy::max_retries(3);
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay_after(1, &mut rand::thread_rng()), Duration::ZERO);
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        assert_eq!(RetryPolicy::max_retries(0).max_attempts(), 1);
    }

    #[test]
    fn test_fixed_wait() {
        let policy = RetryPolicy::stop_after_attempt(3).with_wait(Wait::Fixed { seconds: 1.0 });
        assert_eq!(policy.delay_after(2, &mut rand::thread_rng()), Duration::from_secs(1));
    }

    #[test]
    fn test_random_wait_in_range() {
        let policy =
            RetryPolicy::stop_after_attempt(3).with_wait(Wait::Random { min: 1.0, max: 3.0 });
        let mut rng = StdRng::seed_from_u64(7);
        for attempt in 1..20 {
            let delay = policy.delay_after(attempt, &mut rng);
            assert!(delay >= Duration::from_secs(1) && delay < Duration::from_secs(3));
        }
    }

    #[test]
    fn test_exponential_wait_is_clamped() {
        let policy = RetryPolicy::stop_after_attempt(6).with_wait(Wait::Exponential {
            multiplier: 1.0,
            min: 2.0,
            max: 10.0,
        });
        let mut rng = rand::thread_rng();
        let delays: Vec<u64> = (1..=5)
            .map(|attempt| policy.delay_after(attempt, &mut rng).as_secs())
            .collect();
        assert_eq!(delays, vec![2, 2, 4, 8, 10]);
    }

    #[test]
    fn test_policy_from_toml() {
        let policy: RetryPolicy = toml::from_str(
            r#"
            stop_after_attempt = 4
            wait = { kind = "exponential", multiplier = 1.0, min = 2.0, max = 10.0 }
            "#,
        )
        .unwrap();
        assert_eq!(policy.max_attempts(), 4);
        assert!(matches!(policy.wait, Wait::Exponential { .. }));

        let bare: RetryPolicy = toml::from_str("stop_after_attempt = 2").unwrap();
        assert_eq!(bare.wait, Wait::None);
    }
}
