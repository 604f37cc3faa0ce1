//! parse → check mode → roll → record. Shared by the websocket and HTTP routes.
use tracing::debug;

use crate::{
    dice::{self, RollMode},
    error::AppResult,
    history::HistoryLog,
    roller::{self, DieSource, RandomDice, RollOutcome},
};

pub async fn roll(history: &HistoryLog, expression: &str, mode: RollMode) -> AppResult<RollOutcome> {
    // ThreadRng is !Send, keep it out of the await below
    let outcome = roll_with(expression, mode, &mut RandomDice(rand::thread_rng()))?;
    history.append(outcome.text.clone()).await;
    Ok(outcome)
}

/// Rejections (parse or mode) happen here, before any die is drawn.
pub fn roll_with(expression: &str, mode: RollMode, source: &mut impl DieSource) -> AppResult<RollOutcome> {
    let req = dice::parse_with_mode(expression, mode)?;
    let outcome = roller::roll(&req, source);
    debug!(expression, ?mode, text = %outcome.text, "rolled");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppErr, roller::tests::Scripted};

    #[tokio::test]
    async fn roll_is_recorded() {
        let h = HistoryLog::new(10);
        let out = roll(&h, "3d6+2", RollMode::Normal).await.unwrap();
        assert_eq!(h.snapshot().await, vec![out.text]);
    }

    #[tokio::test]
    async fn modifier_only_roll_is_recorded() {
        let h = HistoryLog::new(10);
        let out = roll(&h, "-3", RollMode::Normal).await.unwrap();
        assert_eq!(out.total, -3);
        assert_eq!(h.snapshot().await, vec!["-3 = -3"]);
    }

    #[tokio::test]
    async fn mode_error_leaves_history_alone() {
        let h = HistoryLog::new(10);
        let err = roll(&h, "1d6", RollMode::Advantage).await.unwrap_err();
        assert!(matches!(err, AppErr::Mode(_)));
        assert!(h.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn parse_error_leaves_history_alone() {
        let h = HistoryLog::new(10);
        let err = roll(&h, "2d", RollMode::Normal).await.unwrap_err();
        assert!(matches!(err, AppErr::Parse(_)));
        assert!(h.snapshot().await.is_empty());
    }

    #[test]
    fn rejected_before_drawing() {
        // an empty script panics on the first draw
        let mut none = Scripted::new(&[]);
        assert!(roll_with("1d6", RollMode::Disadvantage, &mut none).is_err());
        assert!(roll_with("d0", RollMode::Normal, &mut none).is_err());
    }

    #[test]
    fn scripted_end_to_end() {
        let out = roll_with("1d20-1", RollMode::Normal, &mut Scripted::new(&[20])).unwrap();
        assert_eq!(out.text, "20 + -1 = 19 (Critical Success!)");
    }
}
