//! Task dependency graph.
//!
//! Nodes are task manifests; an edge `a → b` means `a` must succeed before
//! `b` may run. The graph is built once from a decomposition batch and is
//! immutable afterwards. Lifecycle state is tracked by the orchestrator, not
//! here: readiness queries take the set of completed task ids as input.

use std::collections::{HashMap, HashSet};

use petgraph::{
    algo::toposort,
    graph::{DiGraph, NodeIndex},
    visit::Bfs,
    Direction,
};
use tracing::debug;

use chimera_contracts::{
    campaign::CampaignId,
    error::{ChimeraError, ChimeraResult},
    task::{AgentTaskManifest, TaskId},
};

/// Directed acyclic graph of one decomposition batch.
pub struct TaskGraph {
    graph: DiGraph<AgentTaskManifest, ()>,
    index: HashMap<TaskId, NodeIndex>,
    /// Node indices in a valid topological order, computed at build time.
    order: Vec<NodeIndex>,
}

impl TaskGraph {
    /// Build the graph from a flat batch of manifests.
    ///
    /// # Errors
    ///
    /// - `DuplicateTask` if two manifests share an id
    /// - `DanglingDependency` if a dependency id is not in the batch
    /// - `Cycle` if a task depends on itself or no topological order exists
    ///
    /// Offending edges are never dropped silently.
    pub fn build(manifests: Vec<AgentTaskManifest>) -> ChimeraResult<Self> {
        let mut graph: DiGraph<AgentTaskManifest, ()> = DiGraph::new();
        let mut index = HashMap::with_capacity(manifests.len());

        for manifest in manifests {
            let task_id = manifest.task_id.clone();
            if index.contains_key(&task_id) {
                return Err(ChimeraError::DuplicateTask { task_id: task_id.0 });
            }
            let node = graph.add_node(manifest);
            index.insert(task_id, node);
        }

        let mut edges = Vec::new();
        for node in graph.node_indices() {
            let manifest = &graph[node];
            for dependency in &manifest.dependencies {
                if dependency == &manifest.task_id {
                    return Err(ChimeraError::Cycle {
                        task_id: manifest.task_id.0.clone(),
                    });
                }
                let upstream = index.get(dependency).ok_or_else(|| {
                    ChimeraError::DanglingDependency {
                        task_id: manifest.task_id.0.clone(),
                        missing: dependency.0.clone(),
                    }
                })?;
                edges.push((*upstream, node));
            }
        }
        for (from, to) in edges {
            graph.update_edge(from, to, ());
        }

        let order = toposort(&graph, None).map_err(|cycle| ChimeraError::Cycle {
            task_id: graph[cycle.node_id()].task_id.0.clone(),
        })?;

        debug!(
            tasks = graph.node_count(),
            edges = graph.edge_count(),
            "task graph built"
        );

        Ok(Self { graph, index, order })
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.index.contains_key(task_id)
    }

    pub fn manifest(&self, task_id: &TaskId) -> Option<&AgentTaskManifest> {
        self.index.get(task_id).map(|&node| &self.graph[node])
    }

    /// Manifests in batch (insertion) order.
    pub fn manifests(&self) -> impl Iterator<Item = &AgentTaskManifest> {
        self.graph.node_weights()
    }

    /// Every distinct campaign id present in the batch.
    pub fn campaign_ids(&self) -> HashSet<&CampaignId> {
        self.graph.node_weights().map(|m| &m.campaign_id).collect()
    }

    /// Manifests ordered so every task comes after all of its dependencies.
    pub fn topological_order(&self) -> Vec<&AgentTaskManifest> {
        self.order.iter().map(|&node| &self.graph[node]).collect()
    }

    /// Direct upstream tasks of `task_id`.
    pub fn dependencies(&self, task_id: &TaskId) -> Vec<&TaskId> {
        self.neighbors(task_id, Direction::Incoming)
    }

    /// Direct downstream tasks of `task_id`.
    pub fn dependents(&self, task_id: &TaskId) -> Vec<&TaskId> {
        self.neighbors(task_id, Direction::Outgoing)
    }

    /// Every task reachable downstream of `task_id`, excluding itself.
    pub fn descendants(&self, task_id: &TaskId) -> Vec<&TaskId> {
        let Some(&start) = self.index.get(task_id) else {
            return Vec::new();
        };
        let mut bfs = Bfs::new(&self.graph, start);
        let mut found = Vec::new();
        while let Some(node) = bfs.next(&self.graph) {
            if node != start {
                found.push(&self.graph[node].task_id);
            }
        }
        found
    }

    // ── Scheduling ───────────────────────────────────────────────────────────

    /// Tasks whose every dependency is in `completed` and which are not
    /// themselves completed, in dispatch order.
    ///
    /// Dispatch order: priority (`HIGH`, `NORMAL`, `LOW`), then creation
    /// timestamp ascending, then batch order.
    pub fn ready_tasks(&self, completed: &HashSet<TaskId>) -> Vec<TaskId> {
        self.ready_tasks_excluding(completed, &HashSet::new())
    }

    /// Like [`ready_tasks`](Self::ready_tasks), additionally skipping every id
    /// in `excluded` (tasks already dispatched or otherwise settled).
    pub fn ready_tasks_excluding(
        &self,
        completed: &HashSet<TaskId>,
        excluded: &HashSet<TaskId>,
    ) -> Vec<TaskId> {
        let mut ready: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&node| {
                let task = &self.graph[node];
                if completed.contains(&task.task_id) || excluded.contains(&task.task_id) {
                    return false;
                }
                self.graph
                    .neighbors_directed(node, Direction::Incoming)
                    .all(|dep| completed.contains(&self.graph[dep].task_id))
            })
            .collect();

        ready.sort_by_key(|&node| {
            let task = &self.graph[node];
            (task.priority.rank(), task.created_at, node.index())
        });

        ready
            .into_iter()
            .map(|node| self.graph[node].task_id.clone())
            .collect()
    }

    fn neighbors(&self, task_id: &TaskId, direction: Direction) -> Vec<&TaskId> {
        match self.index.get(task_id) {
            Some(&node) => self
                .graph
                .neighbors_directed(node, direction)
                .map(|n| &self.graph[n].task_id)
                .collect(),
            None => Vec::new(),
        }
    }
}

impl std::fmt::Debug for TaskGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskGraph")
            .field("tasks", &self.len())
            .field("edges", &self.edge_count())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
