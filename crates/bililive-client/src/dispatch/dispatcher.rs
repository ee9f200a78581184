//! Handler chains keyed by command tag.

use std::sync::Arc;

use dashmap::DashMap;

use bililive_core::protocol::cmd;

use crate::dispatch::event::Event;

/// Chain control returned by every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Run the next handler in this chain.
    Continue,
    /// Skip the remaining handlers in this chain.
    Stop,
}

/// Event subscriber. Plain closures `Fn(&Event) -> Flow` implement it too.
pub trait Handler: Send + Sync {
    fn handle(&self, event: &Event) -> Flow;
}

impl<F> Handler for F
where
    F: Fn(&Event) -> Flow + Send + Sync,
{
    fn handle(&self, event: &Event) -> Flow {
        self(event)
    }
}

/// Registry of handler chains keyed by command tag.
///
/// Chains keep insertion order and are never deduplicated: registering the
/// same handler twice runs it twice. The empty tag (`cmd::ALL`) holds the
/// wildcard chain. Registration is expected to finish before the session
/// starts; dispatch only reads.
#[derive(Default)]
pub struct Dispatcher {
    chains: DashMap<String, Vec<Arc<dyn Handler>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            chains: DashMap::new(),
        }
    }

    /// Append `handler` to the chain for `cmd` (empty = every event).
    pub fn register(&self, cmd: &str, handler: Arc<dyn Handler>) {
        self.chains.entry(cmd.to_string()).or_default().push(handler);
    }

    pub fn register_fn<F>(&self, cmd: &str, f: F)
    where
        F: Fn(&Event) -> Flow + Send + Sync + 'static,
    {
        self.register(cmd, Arc::new(f));
    }

    pub fn handler_count(&self, cmd: &str) -> usize {
        self.chains.get(cmd).map(|c| c.len()).unwrap_or(0)
    }

    pub fn registered_cmds(&self) -> Vec<String> {
        self.chains.iter().map(|e| e.key().clone()).collect()
    }

    /// Run the chain registered under `cmd` in order, stopping at the first
    /// `Flow::Stop`. Returns how many handlers ran.
    pub fn dispatch(&self, cmd: &str, event: &Event) -> usize {
        // Snapshot so handlers never run under a map shard lock.
        let Some(chain) = self.chains.get(cmd).map(|c| c.value().clone()) else {
            return 0;
        };

        let mut ran = 0;
        for handler in &chain {
            ran += 1;
            if handler.handle(event) == Flow::Stop {
                break;
            }
        }
        ran
    }

    /// Run the typed chain for `event.cmd`, then the wildcard chain.
    ///
    /// The chains are independent: a stop in one never suppresses the other.
    pub fn dispatch_with_wildcard(&self, event: &Event) -> usize {
        let mut ran = 0;
        if event.cmd != cmd::ALL {
            ran += self.dispatch(&event.cmd, event);
        }
        ran + self.dispatch(cmd::ALL, event)
    }
}
