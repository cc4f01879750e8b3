//! Single-writer thread for cache updates from parallel workers.

use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use serde_json::{Map, Value};

use crate::CacheError;
use crate::manager::CacheManager;

/// Mutation applied by the writer thread.
#[derive(Debug)]
pub enum CacheCommand {
    Update {
        source: PathBuf,
        output: PathBuf,
        content_hash: Option<String>,
        metadata: Option<Map<String, Value>>,
    },
    Remove(PathBuf),
    Clear,
}

/// Owns a [`CacheManager`] on a dedicated thread and applies commands in
/// arrival order.
///
/// Workers share `&CacheWriter` (or a cloned [`Sender`]) and never touch the
/// store directly, so concurrent updates cannot lose each other's entries.
pub struct CacheWriter {
    sender: Sender<CacheCommand>,
    handle: JoinHandle<CacheManager>,
}

impl CacheWriter {
    /// Move `manager` onto a new writer thread.
    #[must_use]
    pub fn spawn(mut manager: CacheManager) -> Self {
        let (sender, receiver) = mpsc::channel::<CacheCommand>();

        let handle = thread::spawn(move || {
            for command in receiver {
                apply(&mut manager, command);
            }
            tracing::debug!(entries = manager.len(), "Cache writer drained");
            manager
        });

        Self { sender, handle }
    }

    /// Queue a command.
    pub fn send(&self, command: CacheCommand) -> Result<(), CacheError> {
        self.sender
            .send(command)
            .map_err(|_| CacheError::WriterStopped)
    }

    /// Queue an update for `source`.
    pub fn update(
        &self,
        source: PathBuf,
        output: PathBuf,
        content_hash: Option<String>,
        metadata: Option<Map<String, Value>>,
    ) -> Result<(), CacheError> {
        self.send(CacheCommand::Update {
            source,
            output,
            content_hash,
            metadata,
        })
    }

    /// Sender handle for workers that outlive a borrow of the writer.
    #[must_use]
    pub fn sender(&self) -> Sender<CacheCommand> {
        self.sender.clone()
    }

    /// Close the queue, wait for every pending command, and return the manager.
    ///
    /// Outstanding [`sender`](Self::sender) clones keep the thread alive, so
    /// drop them first.
    pub fn finish(self) -> Result<CacheManager, CacheError> {
        drop(self.sender);
        self.handle.join().map_err(|_| CacheError::WriterStopped)
    }
}

fn apply(manager: &mut CacheManager, command: CacheCommand) {
    match command {
        CacheCommand::Update {
            source,
            output,
            content_hash,
            metadata,
        } => {
            if let Err(e) = manager.update(&source, &output, content_hash, metadata) {
                tracing::warn!("Cache update failed: {e}");
            }
        }
        CacheCommand::Remove(source) => {
            manager.remove(&source);
        }
        CacheCommand::Clear => manager.clear(),
    }
}
