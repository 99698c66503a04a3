//! Background cleanup worker
//!
//! One dedicated thread per cache. Requests go through a channel of capacity
//! one, so any number of requests made while a cleanup is pending collapse
//! into a single run.

use crate::errors::{CacheError, Result};
use crossbeam::channel::{self, Sender, TrySendError};
use std::path::Path;
use std::sync::Weak;
use std::thread::{self, JoinHandle};

use super::super::types::CacheInner;

pub(crate) struct CleanupWorker {
    sender: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CleanupWorker {
    /// Start the worker; it holds only a weak handle so it never keeps the
    /// cache alive
    pub fn spawn(directory: &Path, inner: Weak<CacheInner>) -> Result<Self> {
        let (sender, receiver) = channel::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("disklru-cleanup".to_string())
            .spawn(move || {
                while receiver.recv().is_ok() {
                    let Some(inner) = inner.upgrade() else {
                        break;
                    };
                    inner.run_cleanup();
                }
                tracing::debug!("Cleanup worker stopped");
            })
            .map_err(|e| CacheError::io(directory, "spawn cleanup worker", e))?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Ask for a cleanup run; a no-op if one is already queued
    pub fn request(&self) {
        let Some(sender) = self.sender.as_ref() else {
            return;
        };

        match sender.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Disconnected(())) => {
                tracing::debug!("Cleanup requested after worker stopped");
            }
        }
    }

    /// Stop accepting requests and wait for a running cleanup to finish
    pub fn shutdown(mut self) {
        drop(self.sender.take());

        if let Some(handle) = self.handle.take() {
            // The last handle to the cache can be dropped by the worker itself.
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                tracing::warn!("Cleanup worker panicked");
            }
        }
    }
}
