//! Long-poll `getUpdates` as an alternative to the webhook, for running the
//! bot from a machine the provider can't reach.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::bot::Bot;
use super::dispatch;
use super::telegram::Update;

pub const POLL_TIMEOUT_SECS: u64 = 30;
pub const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Offset that acknowledges every update in `updates`.
pub fn next_offset(current: Option<i64>, updates: &[Update]) -> Option<i64> {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .max()
        .map_or(current, |next| Some(current.map_or(next, |c| c.max(next))))
}

/// Poll until `stop` flips to true. A blocking request still in flight when
/// the signal arrives is abandoned to the runtime's shutdown timeout.
pub async fn run(bot: Arc<Bot>, mut stop: watch::Receiver<bool>) {
    let api = bot.api();
    let cleared = tokio::task::spawn_blocking({
        let api = Arc::clone(&api);
        move || api.delete_webhook()
    })
    .await;
    match cleared {
        Ok(Ok(())) => debug!("webhook removed before polling"),
        Ok(Err(e)) => warn!("could not remove webhook: {e:#}"),
        Err(e) => warn!("could not remove webhook: {e}"),
    }
    info!("bot polling started");

    let mut offset = None;
    loop {
        if *stop.borrow() {
            break;
        }
        let request = tokio::task::spawn_blocking({
            let api = Arc::clone(&api);
            move || api.get_updates(offset, POLL_TIMEOUT_SECS)
        });

        let result = tokio::select! {
            _ = stop.changed() => break,
            result = request => result,
        };

        match result {
            Ok(Ok(updates)) => {
                offset = next_offset(offset, &updates);
                for update in updates {
                    dispatch(Arc::clone(&bot), update).await;
                }
            }
            Ok(Err(e)) => {
                error!("getUpdates failed: {e:#}");
                if backoff(&mut stop).await {
                    break;
                }
            }
            Err(e) => {
                error!("polling task failed: {e}");
                if backoff(&mut stop).await {
                    break;
                }
            }
        }
    }
    info!("bot polling stopped");
}

/// Sleep out the error backoff. Returns true if asked to stop meanwhile.
async fn backoff(stop: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = stop.changed() => true,
        _ = tokio::time::sleep(ERROR_BACKOFF) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::telegram::{BotApi, InlineKeyboardMarkup};
    use anyhow::Result;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn updates(ids: &[i64]) -> Vec<Update> {
        ids.iter()
            .map(|id| {
                serde_json::from_value(serde_json::json!({
                    "update_id": id,
                    "message": {"chat": {"id": 1}, "text": "/play"}
                }))
                .unwrap()
            })
            .collect()
    }

    /// Hands out scripted batches, then signals the test that it ran dry.
    struct ScriptedApi {
        batches: Mutex<VecDeque<Vec<Update>>>,
        offsets: Mutex<Vec<Option<i64>>>,
        replies: Mutex<usize>,
        deleted: Mutex<bool>,
        drained: watch::Sender<bool>,
    }

    impl BotApi for ScriptedApi {
        fn send_message(&self, _: i64, _: &str, _: Option<&InlineKeyboardMarkup>) -> Result<()> {
            *self.replies.lock().unwrap() += 1;
            Ok(())
        }

        fn set_webhook(&self, _: &str) -> Result<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }

        fn delete_webhook(&self) -> Result<()> {
            *self.deleted.lock().unwrap() = true;
            Ok(())
        }

        fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
            assert_eq!(timeout_secs, POLL_TIMEOUT_SECS);
            self.offsets.lock().unwrap().push(offset);
            match self.batches.lock().unwrap().pop_front() {
                Some(batch) => Ok(batch),
                None => {
                    let _ = self.drained.send(true);
                    std::thread::sleep(Duration::from_millis(50));
                    Ok(Vec::new())
                }
            }
        }
    }

    #[test]
    fn test_next_offset() {
        assert_eq!(next_offset(None, &[]), None);
        assert_eq!(next_offset(Some(4), &[]), Some(4));
        assert_eq!(next_offset(None, &updates(&[7, 9, 8])), Some(10));
        assert_eq!(next_offset(Some(20), &updates(&[3])), Some(20));
    }

    #[tokio::test]
    async fn test_polls_with_advancing_offset_until_stopped() {
        let (drained_tx, mut drained_rx) = watch::channel(false);
        let api = Arc::new(ScriptedApi {
            batches: Mutex::new(VecDeque::from([updates(&[1, 2]), updates(&[3])])),
            offsets: Mutex::new(Vec::new()),
            replies: Mutex::new(0),
            deleted: Mutex::new(false),
            drained: drained_tx,
        });
        let bot = Arc::new(Bot::new(api.clone(), "https://facts.example.com/".to_string()));
        let (stop_tx, stop_rx) = watch::channel(false);
        let poller = tokio::spawn(run(bot, stop_rx));

        drained_rx.changed().await.unwrap();
        stop_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), poller)
            .await
            .unwrap()
            .unwrap();

        assert!(*api.deleted.lock().unwrap());
        assert_eq!(*api.replies.lock().unwrap(), 3);
        let offsets = api.offsets.lock().unwrap();
        assert_eq!(offsets[..3], [None, Some(3), Some(4)]);
    }
}
