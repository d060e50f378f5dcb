//! Fine-grained reactive signal system
//!
//! Signals hold values; effects read signals and are re-run whenever one of
//! the signals they read during their last run is written. Dependencies are
//! tracked automatically on every effect run.
//!
//! Writes come in two flavours:
//! - [`ReactiveGraph::set`] always notifies subscribers
//! - [`ReactiveGraph::set_if_changed`] notifies only when the new value differs
//!
//! The second is what route-bound effects rely on: re-rendering with the same
//! path must not re-run them.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

new_key_type! {
    /// Unique identifier for a signal
    pub struct SignalId;
    /// Unique identifier for an effect
    pub struct EffectId;
}

/// Shared dirty flag for requesting a page rebuild
pub type DirtyFlag = Arc<AtomicBool>;

/// A reactive signal handle (cheap to copy)
#[derive(Debug)]
pub struct Signal<T> {
    id: SignalId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Signal<T> {}

impl<T> Signal<T> {
    /// Get the signal's internal ID
    pub fn id(&self) -> SignalId {
        self.id
    }
}

/// An effect handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    id: EffectId,
}

impl Effect {
    pub fn id(&self) -> EffectId {
        self.id
    }
}

type EffectFn = Box<dyn FnMut(&ReactiveGraph) + Send>;

struct SignalNode {
    value: Box<dyn Any + Send>,
    subscribers: SmallVec<[EffectId; 4]>,
}

struct EffectNode {
    /// Taken out while the effect is running
    run: Option<EffectFn>,
    dependencies: SmallVec<[SignalId; 4]>,
    dirty: bool,
    runs: u64,
}

/// The reactive graph that owns all signals and effects
pub struct ReactiveGraph {
    signals: SlotMap<SignalId, SignalNode>,
    effects: SlotMap<EffectId, EffectNode>,
    pending_effects: VecDeque<EffectId>,
    batch_depth: u32,
    /// Signals read by the effect currently running
    tracking: RefCell<Option<SmallVec<[SignalId; 4]>>>,
}

impl ReactiveGraph {
    /// Create a new reactive graph
    pub fn new() -> Self {
        Self {
            signals: SlotMap::with_key(),
            effects: SlotMap::with_key(),
            pending_effects: VecDeque::new(),
            batch_depth: 0,
            tracking: RefCell::new(None),
        }
    }

    // =========================================================================
    // SIGNALS
    // =========================================================================

    /// Create a new signal with an initial value
    pub fn create_signal<T: Send + 'static>(&mut self, initial: T) -> Signal<T> {
        let id = self.signals.insert(SignalNode {
            value: Box::new(initial),
            subscribers: SmallVec::new(),
        });
        Signal {
            id,
            _marker: PhantomData,
        }
    }

    /// Get the current value of a signal
    ///
    /// When called from inside an effect the signal becomes one of the
    /// effect's dependencies.
    pub fn get<T: Clone + 'static>(&self, signal: Signal<T>) -> Option<T> {
        if let Some(deps) = self.tracking.borrow_mut().as_mut() {
            if !deps.contains(&signal.id) {
                deps.push(signal.id);
            }
        }
        self.get_untracked(signal)
    }

    /// Get the current value without recording a dependency
    pub fn get_untracked<T: Clone + 'static>(&self, signal: Signal<T>) -> Option<T> {
        self.signals
            .get(signal.id)
            .and_then(|node| node.value.downcast_ref::<T>().cloned())
    }

    /// Set the value of a signal and notify every subscriber
    pub fn set<T: Send + 'static>(&mut self, signal: Signal<T>, value: T) {
        let subscribers = match self.signals.get_mut(signal.id) {
            Some(node) => {
                node.value = Box::new(value);
                node.subscribers.clone()
            }
            None => return,
        };

        for effect in subscribers {
            self.schedule(effect);
        }

        if self.batch_depth == 0 {
            self.flush_effects();
        }
    }

    /// Set the value only if it differs from the current one
    ///
    /// Returns `true` when the signal was written.
    pub fn set_if_changed<T: PartialEq + Send + 'static>(
        &mut self,
        signal: Signal<T>,
        value: T,
    ) -> bool {
        let unchanged = match self.signals.get(signal.id) {
            Some(node) => node
                .value
                .downcast_ref::<T>()
                .is_some_and(|current| *current == value),
            None => return false,
        };
        if unchanged {
            return false;
        }
        self.set(signal, value);
        true
    }

    // =========================================================================
    // EFFECTS
    // =========================================================================

    /// Create an effect; it runs once immediately (or at the end of the
    /// current batch) and again whenever a signal it read is written
    pub fn create_effect<F>(&mut self, run: F) -> Effect
    where
        F: FnMut(&ReactiveGraph) + Send + 'static,
    {
        let id = self.effects.insert(EffectNode {
            run: Some(Box::new(run)),
            dependencies: SmallVec::new(),
            dirty: true,
            runs: 0,
        });
        self.pending_effects.push_back(id);

        if self.batch_depth == 0 {
            self.flush_effects();
        }

        Effect { id }
    }

    /// Dispose of an effect; it will never run again
    pub fn dispose_effect(&mut self, effect: Effect) {
        if let Some(node) = self.effects.remove(effect.id) {
            for dep in node.dependencies {
                if let Some(sig) = self.signals.get_mut(dep) {
                    sig.subscribers.retain(|s| *s != effect.id);
                }
            }
        }
        self.pending_effects.retain(|id| *id != effect.id);
        tracing::trace!(?effect, "effect disposed");
    }

    /// Number of times an effect has run, `None` once disposed
    pub fn effect_runs(&self, effect: Effect) -> Option<u64> {
        self.effects.get(effect.id).map(|n| n.runs)
    }

    // =========================================================================
    // BATCHING
    // =========================================================================

    /// Run a function in a batch; effects are flushed once at the end
    pub fn batch<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.batch_depth += 1;
        let result = f(self);
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            self.flush_effects();
        }
        result
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    fn schedule(&mut self, effect: EffectId) {
        if let Some(node) = self.effects.get_mut(effect) {
            if !node.dirty {
                node.dirty = true;
                self.pending_effects.push_back(effect);
            }
        }
    }

    fn flush_effects(&mut self) {
        while let Some(effect) = self.pending_effects.pop_front() {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: EffectId) {
        let mut run = match self.effects.get_mut(effect) {
            Some(node) if node.dirty => {
                node.dirty = false;
                node.runs += 1;
                match node.run.take() {
                    Some(run) => run,
                    None => return,
                }
            }
            _ => return,
        };

        self.tracking.replace(Some(SmallVec::new()));
        run(&*self);
        let deps = self.tracking.take().unwrap_or_default();

        let previous = match self.effects.get_mut(effect) {
            Some(node) => {
                node.run = Some(run);
                std::mem::replace(&mut node.dependencies, deps.clone())
            }
            None => return,
        };

        for dep in previous {
            if let Some(sig) = self.signals.get_mut(dep) {
                sig.subscribers.retain(|s| *s != effect);
            }
        }
        for dep in deps {
            if let Some(sig) = self.signals.get_mut(dep) {
                if !sig.subscribers.contains(&effect) {
                    sig.subscribers.push(effect);
                }
            }
        }
    }

}

impl Default for ReactiveGraph {
    fn default() -> Self {
        Self::new()
    }
}
