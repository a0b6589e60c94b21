//! Request pacing for the game-database API.

use std::time::Duration;

use tokio::time::Instant;

/// Enforces a minimum gap between successive API calls.
///
/// The provider allows four requests per second; a 250 ms floor between
/// calls keeps a strictly sequential caller inside that limit. Time already
/// spent between calls counts toward the gap, so only the remainder is
/// slept.
#[derive(Debug)]
pub struct Pacer {
    min_gap: Duration,
    last_call: Option<Instant>,
}

impl Pacer {
    pub const DEFAULT_GAP: Duration = Duration::from_millis(250);

    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_call: None,
        }
    }

    /// Sleep out whatever remains of the gap since the previous call, then
    /// mark this call. Invoke immediately before each request.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_gap {
                tokio::time::sleep(self.min_gap - elapsed).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_call_does_not_sleep() {
        let mut pacer = Pacer::new(Duration::from_millis(200));
        let start = Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn consecutive_calls_keep_the_gap() {
        let mut pacer = Pacer::new(Duration::from_millis(30));
        pacer.wait().await;
        let start = Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn elapsed_time_counts_toward_the_gap() {
        let mut pacer = Pacer::new(Duration::from_millis(30));
        pacer.wait().await;
        tokio::time::sleep(Duration::from_millis(40)).await;

        // the gap has already passed, so this wait should be immediate
        let start = Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() < Duration::from_millis(20));
    }
}
