//! Filesystem watcher adapters.

mod channel;
mod notify_watcher;

pub use channel::ChannelWatcher;
pub use notify_watcher::NotifyWatcher;
