use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use slotmap::{SecondaryMap, SlotMap, new_key_type};
use smallvec::SmallVec;

new_key_type! {
    pub struct ObserverId;
}

/// Key a watcher can declare interest in.
pub trait Topic: Clone + Eq + Hash + Debug + 'static {}
impl<T> Topic for T where T: Clone + Eq + Hash + Debug + 'static {}

/// Collects the topics a watcher depends on. Handed to the `deps` closure of
/// a watcher every time its dependencies are (re)computed.
pub struct Tracker<K> {
    topics: SmallVec<[K; 4]>,
}

impl<K: Topic> Tracker<K> {
    fn new() -> Self {
        Self {
            topics: SmallVec::new(),
        }
    }

    pub fn track(&mut self, topic: K) {
        if !self.topics.contains(&topic) {
            self.topics.push(topic);
        }
    }

    pub fn topics(&self) -> &[K] {
        &self.topics
    }
}

struct Observer<K> {
    // creation order; dispatch always follows it
    seq: u64,
    deps: Rc<dyn Fn(&mut Tracker<K>)>,
    run: Rc<dyn Fn()>,
}

struct DepGraph<K> {
    next_seq: u64,
    observers: SlotMap<ObserverId, Observer<K>>,
    // topic -> observers that depend on it
    edges: HashMap<K, HashSet<ObserverId>>,
    // observer -> topics it depends on
    back: SecondaryMap<ObserverId, SmallVec<[K; 4]>>,
    running: HashSet<ObserverId>,
}

impl<K> Default for DepGraph<K> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            observers: SlotMap::with_key(),
            edges: HashMap::new(),
            back: SecondaryMap::new(),
            running: HashSet::new(),
        }
    }
}

impl<K: Topic> DepGraph<K> {
    fn remove_all_edges_for(&mut self, obs: ObserverId) {
        if let Some(topics) = self.back.remove(obs) {
            for t in topics {
                if let Some(set) = self.edges.get_mut(&t) {
                    set.remove(&obs);
                    if set.is_empty() {
                        self.edges.remove(&t);
                    }
                }
            }
        }
    }

    fn remove_observer(&mut self, obs: ObserverId) {
        self.observers.remove(obs);
        self.remove_all_edges_for(obs);
        self.running.remove(&obs);
    }
}

/// Explicit dependency graph.
///
/// Watchers are `(deps, run)` pairs: `deps` declares which topics the watcher
/// reads, `run` is invoked whenever one of those topics is notified. Nothing
/// is tracked implicitly; whoever owns the state calls [`Reactor::notify`]
/// after mutating it.
///
/// Dispatch is synchronous and follows watcher creation order. A watcher that
/// is already running is skipped, so a watcher writing to its own inputs does
/// not re-enter itself. No graph borrow is held while user closures run,
/// which makes nested notifications legal.
pub struct Reactor<K: Topic> {
    graph: Rc<RefCell<DepGraph<K>>>,
}

impl<K: Topic> Clone for Reactor<K> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
        }
    }
}

impl<K: Topic> Default for Reactor<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Topic> Reactor<K> {
    pub fn new() -> Self {
        Self {
            graph: Rc::new(RefCell::new(DepGraph::default())),
        }
    }

    /// Register a watcher and compute its dependencies. `run` is not called;
    /// use [`Reactor::run_now`] for an immediate first evaluation.
    pub fn watch(
        &self,
        deps: impl Fn(&mut Tracker<K>) + 'static,
        run: impl Fn() + 'static,
    ) -> ObserverId {
        let id = {
            let mut g = self.graph.borrow_mut();
            let seq = g.next_seq;
            g.next_seq += 1;
            g.observers.insert(Observer {
                seq,
                deps: Rc::new(deps),
                run: Rc::new(run),
            })
        };
        self.retrack(id);
        id
    }

    /// Recompute the dependencies of `id` without running it.
    pub fn retrack(&self, id: ObserverId) {
        let deps = {
            let mut g = self.graph.borrow_mut();
            g.remove_all_edges_for(id);
            match g.observers.get(id) {
                Some(o) => o.deps.clone(),
                None => return,
            }
        };

        let mut tracker = Tracker::new();
        deps(&mut tracker);

        let mut g = self.graph.borrow_mut();
        // removed while computing deps
        if !g.observers.contains_key(id) {
            return;
        }
        for t in tracker.topics.iter() {
            g.edges.entry(t.clone()).or_default().insert(id);
        }
        g.back.insert(id, tracker.topics);
    }

    /// Refresh dependencies of `id`, then run it. No-op if it is already
    /// running or has been removed.
    pub fn run_now(&self, id: ObserverId) {
        {
            let mut g = self.graph.borrow_mut();
            if !g.observers.contains_key(id) {
                return;
            }
            if !g.running.insert(id) {
                log::trace!("reactor: skipping re-entrant run of {id:?}");
                return;
            }
        }

        self.retrack(id);
        let run = self.graph.borrow().observers.get(id).map(|o| o.run.clone());
        if let Some(run) = run {
            run();
        }

        self.graph.borrow_mut().running.remove(&id);
    }

    /// Run every watcher depending on `topic`.
    pub fn notify(&self, topic: &K) {
        self.notify_where(|t| t == topic);
    }

    /// Run every watcher depending on a topic accepted by `matches`.
    pub fn notify_where(&self, matches: impl Fn(&K) -> bool) {
        let queue: Vec<ObserverId> = {
            let g = self.graph.borrow();
            let mut hits: Vec<(u64, ObserverId)> = g
                .edges
                .iter()
                .filter(|(topic, _)| matches(*topic))
                .flat_map(|(_, set)| set.iter().copied())
                .filter_map(|id| g.observers.get(id).map(|o| (o.seq, id)))
                .collect();
            hits.sort_unstable_by_key(|(seq, _)| *seq);
            hits.dedup_by_key(|(seq, _)| *seq);
            hits.into_iter().map(|(_, id)| id).collect()
        };

        if !queue.is_empty() {
            log::trace!("reactor: dispatching to {} watcher(s)", queue.len());
        }
        for id in queue {
            self.run_now(id);
        }
    }

    /// Remove a watcher and all of its dependency edges.
    pub fn remove(&self, id: ObserverId) {
        self.graph.borrow_mut().remove_observer(id);
    }

    pub fn contains(&self, id: ObserverId) -> bool {
        self.graph.borrow().observers.contains_key(id)
    }

    /// Topics `id` currently depends on.
    pub fn dependencies(&self, id: ObserverId) -> Vec<K> {
        self.graph
            .borrow()
            .back
            .get(id)
            .map(|t| t.to_vec())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.graph.borrow().observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
