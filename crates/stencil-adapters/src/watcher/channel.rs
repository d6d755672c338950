//! Channel-backed watcher for testing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use stencil_core::{
    application::{
        ApplicationError,
        ports::{FileWatcher, WatchStream},
    },
    domain::WatchEvent,
    error::StencilResult,
};

/// Watcher whose events are injected by the test.
///
/// Cheap to clone; clones share subscriptions. [`ChannelWatcher::emit`]
/// delivers an event to every live subscription whose root contains the
/// event path.
#[derive(Debug, Clone, Default)]
pub struct ChannelWatcher {
    inner: Arc<Mutex<ChannelWatcherInner>>,
}

#[derive(Debug, Default)]
struct ChannelWatcherInner {
    senders: HashMap<PathBuf, Vec<mpsc::UnboundedSender<WatchEvent>>>,
    watch_calls: usize,
    failing: bool,
}

impl ChannelWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `watch` call fail.
    pub fn fail_watches(&self, failing: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing = failing;
        }
    }

    /// Deliver `event`. Returns how many subscriptions received it.
    pub fn emit(&self, event: WatchEvent) -> usize {
        let Ok(mut inner) = self.inner.lock() else {
            return 0;
        };
        let mut delivered = 0;
        for (root, senders) in inner.senders.iter_mut() {
            if !event.path().starts_with(root) && !root.starts_with(event.path()) {
                continue;
            }
            senders.retain(|tx| tx.send(event.clone()).is_ok());
            delivered += senders.len();
        }
        delivered
    }

    /// Number of `watch` calls so far, including failed ones.
    pub fn watch_calls(&self) -> usize {
        self.inner.lock().map(|i| i.watch_calls).unwrap_or(0)
    }

    /// Number of subscriptions whose stream is still alive.
    pub fn live_subscriptions(&self) -> usize {
        self.inner
            .lock()
            .map(|i| {
                i.senders
                    .values()
                    .flatten()
                    .filter(|tx| !tx.is_closed())
                    .count()
            })
            .unwrap_or(0)
    }
}

impl FileWatcher for ChannelWatcher {
    fn watch(&self, root: &Path) -> StencilResult<WatchStream> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.watch_calls += 1;
        if inner.failing {
            return Err(ApplicationError::WatchFailed {
                path: root.to_path_buf(),
                reason: "watching disabled".into(),
            }
            .into());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        inner.senders.entry(root.to_path_buf()).or_default().push(tx);
        Ok(WatchStream::new(rx, ()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_events_below_root() {
        let watcher = ChannelWatcher::new();
        let mut stream = watcher.watch(Path::new("/ws")).unwrap();

        assert_eq!(watcher.emit(WatchEvent::Created("/ws/a.hbs".into())), 1);
        assert_eq!(watcher.emit(WatchEvent::Created("/other/a.hbs".into())), 0);
        assert_eq!(
            stream.next().await,
            Some(WatchEvent::Created("/ws/a.hbs".into()))
        );
    }

    #[test]
    fn dropped_stream_is_not_live() {
        let watcher = ChannelWatcher::new();
        let stream = watcher.watch(Path::new("/ws")).unwrap();
        assert_eq!(watcher.live_subscriptions(), 1);
        drop(stream);
        assert_eq!(watcher.live_subscriptions(), 0);
        assert_eq!(watcher.emit(WatchEvent::Deleted("/ws/a.hbs".into())), 0);
    }
}
