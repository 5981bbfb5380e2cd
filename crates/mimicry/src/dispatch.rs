//! The call-dispatch core shared by all generated mocks.
//!
//! One `Dispatcher` is owned by each mock instance. It stores stubs
//! under two modes: ordered sequences (`add`, consumed one entry per
//! call in global registration order) and permanent fallbacks (`set`,
//! reusable, last write wins). Stubs are type-erased `Rc<dyn Any>`
//! values; the generated proxy performs the typed cast immediately
//! after retrieval, which keeps this core reusable across every mock.
//!
//! Single-threaded by design: one dispatcher belongs to one test
//! context. Nothing here blocks, yields, or performs I/O.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

/// One global-order registration record: which method, and which
/// position in that method's sequence.
struct TimelineEntry {
    name: String,
    pos: usize,
}

/// Call-dispatch state for one mock instance.
///
/// Created fresh per test case, mutated by `add`/`set` during setup
/// and by `next` while the code under test runs, then discarded.
#[derive(Default)]
pub struct Dispatcher {
    permanent: HashMap<String, Rc<dyn Any>>,
    sequences: HashMap<String, Vec<Rc<dyn Any>>>,
    timeline: Vec<TimelineEntry>,
    cursor: usize,
    misses: Vec<String>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single-use stub to the sequence for `name` and record
    /// it on the global timeline. No signature validation happens
    /// here; the generated proxy only accepts correctly-typed stubs.
    pub fn add(&mut self, name: &str, stub: Rc<dyn Any>) {
        let queue = self.sequences.entry(name.to_string()).or_default();
        queue.push(stub);
        self.timeline.push(TimelineEntry {
            name: name.to_string(),
            pos: queue.len() - 1,
        });
    }

    /// Install the permanent fallback stub for `name`. Last write
    /// wins; independent of the sequence timeline.
    pub fn set(&mut self, name: &str, stub: Rc<dyn Any>) {
        self.permanent.insert(name.to_string(), stub);
    }

    /// Resolve one invocation of `name` to a stub, or `None`.
    ///
    /// While unconsumed timeline entries remain and `name` has a
    /// sequence, the head of the timeline decides: if it expects a
    /// different method, this call is out of the asserted global
    /// order and resolves to `None` without advancing the cursor and
    /// without falling back to a permanent stub. Once the sequence
    /// path is exhausted (or `name` never had one), the permanent
    /// stub answers, if set.
    pub fn next(&mut self, name: &str) -> Option<Rc<dyn Any>> {
        let queued = self.sequences.get(name).is_some_and(|q| !q.is_empty());
        if self.cursor < self.timeline.len() && queued {
            let entry = &self.timeline[self.cursor];
            if entry.name != name {
                return None;
            }
            let stub = self.sequences.get(name).and_then(|q| q.get(entry.pos));
            return match stub {
                Some(stub) => {
                    let stub = Rc::clone(stub);
                    self.cursor += 1;
                    Some(stub)
                }
                None => None,
            };
        }
        self.permanent.get(name).cloned()
    }

    /// True while any sequence entry anywhere remains unconsumed.
    pub fn has_more(&self) -> bool {
        self.cursor < self.timeline.len()
    }

    /// Journal an invocation that found no stub. Called by generated
    /// proxies, which then return a default-valued result so the
    /// exercised code path keeps running.
    pub fn record_miss(&mut self, name: &str) {
        tracing::warn!(method = name, "no stub available for call");
        self.misses.push(name.to_string());
    }

    /// Method names invoked without an available stub, in call order.
    pub fn misses(&self) -> &[String] {
        &self.misses
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("permanent", &self.permanent.len())
            .field("timeline", &self.timeline.len())
            .field("cursor", &self.cursor)
            .field("misses", &self.misses)
            .finish()
    }
}
