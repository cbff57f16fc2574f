//! # Weight Engine
//!
//! Turns activity events into weight changes.
//!
//! ```text
//! record(X, activity)
//!   ├─ apply_activity(X, m)   X += m, hop-d neighbors += m·f^d  (d ≤ H)
//!   └─ decay_all()            every node -= decay, floor 0
//! ```
//!
//! Recently touched files and their import neighbors spike, then everything
//! drifts back toward zero as activity moves elsewhere.

use hashbrown::HashSet;
use tracing::{debug, trace};

use crate::config::WeightConfig;
use crate::model::{Activity, NodePath};
use crate::storage::GraphStore;

/// Applies activity credit with bounded, attenuated propagation.
#[derive(Debug, Clone)]
pub struct WeightEngine {
    config: WeightConfig,
}

impl WeightEngine {
    pub fn new(config: WeightConfig) -> Self {
        Self { config }
    }

    /// Credit `origin` with `magnitude`, then spread `magnitude × attenuation^d`
    /// to every node first reached at hop distance `d ≤ hop_bound`.
    ///
    /// Each node is credited at most once per call, at its shortest distance.
    /// Returns the number of nodes credited (0 if `origin` is unknown).
    pub fn apply_activity<S: GraphStore + ?Sized>(
        &self,
        store: &mut S,
        origin: &NodePath,
        magnitude: f64,
    ) -> usize {
        if !store.add_weight(origin, magnitude) {
            debug!(path = %origin, "activity on untracked file ignored");
            return 0;
        }

        let mut visited: HashSet<NodePath> = HashSet::new();
        visited.insert(origin.clone());
        let mut frontier = vec![origin.clone()];
        let mut credit = magnitude;

        // BFS expansion, one level per hop
        for depth in 1..=self.config.hop_bound {
            credit *= self.config.attenuation;
            let mut next = Vec::new();

            for node in &frontier {
                for neighbor in store.neighbors(node) {
                    if !visited.insert(neighbor.clone()) {
                        continue;
                    }
                    store.add_weight(&neighbor, credit);
                    trace!(path = %neighbor, depth, credit, "propagated");
                    next.push(neighbor);
                }
            }

            frontier = next;
            if frontier.is_empty() {
                break;
            }
        }

        visited.len()
    }

    /// Relax every weight toward zero by the configured decay constant.
    pub fn decay_all<S: GraphStore + ?Sized>(&self, store: &mut S) {
        store.decay_all(self.config.decay);
    }

    /// One activity event: credit, then exactly one global decay step.
    ///
    /// Decay runs even when `path` is untracked; every event ticks the clock.
    pub fn record<S: GraphStore + ?Sized>(
        &self,
        store: &mut S,
        path: &NodePath,
        activity: Activity,
    ) -> usize {
        let credited = self.apply_activity(store, path, self.config.magnitude(activity));
        self.decay_all(store);
        debug!(path = %path, %activity, credited, "activity recorded");
        credited
    }
}
