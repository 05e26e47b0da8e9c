// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::Engine;
use crate::errors::{TraversalError, TraversalResult};
use crate::observability::messages::traversal::{
    DeferredBuildError, LockedMutationRejected, TraversalLocked,
};
use crate::observability::messages::StructuredLog;
use crate::steps::{FilterStep, Step, StepContext, StepId, StepKind, Upstream};
use crate::strategy::TraversalStrategies;
use crate::structure::{Graph, Value};
use crate::traverser::{BulkSet, RequirementSet, SideEffects, Traverser, TraverserRequirement};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TRAVERSAL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a traversal. Like [`StepId`], kept across clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TraversalId(pub u64);

impl TraversalId {
    fn next() -> Self {
        TraversalId(NEXT_TRAVERSAL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TraversalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Where a child traversal hangs in its parent. Children are owned by their
/// parent step; this is only an address, never a pointer back up the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef {
    pub traversal: TraversalId,
    pub step: StepId,
}

/// An ordered step pipeline with its strategies, side effects and engine.
///
/// Strategies run lazily on the first `has_next`/`next`, after which the
/// pipeline is locked: structural changes fail with
/// [`TraversalError::LockedTraversal`].
#[derive(Clone)]
pub struct Traversal {
    id: TraversalId,
    pub(crate) steps: Vec<Step>,
    pub(crate) starts: VecDeque<Traverser>,
    parent: Option<ParentRef>,
    engine: Engine,
    strategies: TraversalStrategies,
    pub(crate) side_effects: SideEffects,
    requirements: RequirementSet,
    /// What the enclosing traversals need from traversers flowing through this one.
    inherited: RequirementSet,
    graph: Option<Arc<dyn Graph>>,
    locked: bool,
    deferred: Option<TraversalError>,
    unrolled: Option<(Value, u64)>,
    failed: bool,
}

impl Default for Traversal {
    fn default() -> Self {
        Self::new()
    }
}

impl Traversal {
    /// An anonymous traversal: no graph, no strategies. It only runs as a child.
    pub fn new() -> Self {
        Self {
            id: TraversalId::next(),
            steps: Vec::new(),
            starts: VecDeque::new(),
            parent: None,
            engine: Engine::Unset,
            strategies: TraversalStrategies::default(),
            side_effects: SideEffects::new(),
            requirements: RequirementSet::new(),
            inherited: RequirementSet::new(),
            graph: None,
            locked: false,
            deferred: None,
            unrolled: None,
            failed: false,
        }
    }

    pub(crate) fn bound(
        graph: Arc<dyn Graph>,
        strategies: TraversalStrategies,
        side_effects: SideEffects,
        engine: Engine,
    ) -> Self {
        Self {
            graph: Some(graph),
            strategies,
            side_effects,
            engine,
            ..Self::new()
        }
    }

    pub fn traversal_id(&self) -> TraversalId {
        self.id
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn parent(&self) -> Option<ParentRef> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub fn set_engine(&mut self, engine: Engine) -> TraversalResult<()> {
        if self.locked && engine != self.engine {
            return Err(TraversalError::EngineMismatch {
                expected: self.engine.name(),
                actual: engine.name(),
            });
        }
        self.engine = engine;
        Ok(())
    }

    pub fn strategies(&self) -> &TraversalStrategies {
        &self.strategies
    }

    pub fn set_strategies(&mut self, strategies: TraversalStrategies) {
        self.strategies = strategies;
    }

    pub fn side_effects(&self) -> &SideEffects {
        &self.side_effects
    }

    pub fn side_effects_mut(&mut self) -> &mut SideEffects {
        &mut self.side_effects
    }

    pub fn requirements(&self) -> &RequirementSet {
        &self.requirements
    }

    /// Requirements imposed from outside: ancestors, their other steps, and
    /// sibling children. Empty on a root traversal.
    pub fn inherited_requirements(&self) -> &RequirementSet {
        &self.inherited
    }

    pub(crate) fn set_inherited_requirements(&mut self, requirements: RequirementSet) {
        self.inherited = requirements;
    }

    pub fn graph(&self) -> Option<&Arc<dyn Graph>> {
        self.graph.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The error a fluent builder call recorded, if any.
    pub fn deferred_error(&self) -> Option<&TraversalError> {
        self.deferred.as_ref()
    }

    pub fn add_step(&mut self, step: Step) -> TraversalResult<()> {
        let index = self.steps.len();
        self.insert_step(index, step)
    }

    pub fn insert_step(&mut self, index: usize, mut step: Step) -> TraversalResult<()> {
        if self.locked {
            return Err(self.rejected("insert", step.name()));
        }
        let parent = ParentRef {
            traversal: self.id,
            step: step.id(),
        };
        for child in step.children_mut() {
            child.parent = Some(parent);
        }
        let index = index.min(self.steps.len());
        self.steps.insert(index, step);
        Ok(())
    }

    pub fn remove_step(&mut self, index: usize) -> TraversalResult<Step> {
        if self.locked {
            let name = self.steps.get(index).map(Step::name).unwrap_or_default();
            return Err(self.rejected("remove", name));
        }
        if index >= self.steps.len() {
            return Err(TraversalError::IllegalPattern {
                step: format!("#{}", index),
                reason: format!("traversal {} has only {} steps", self.id, self.steps.len()),
            });
        }
        Ok(self.steps.remove(index))
    }

    /// Steps a strategy may rewrite in place without changing the list's shape.
    pub fn steps_mut(&mut self) -> TraversalResult<&mut [Step]> {
        if self.locked {
            return Err(self.rejected("modify", String::new()));
        }
        Ok(&mut self.steps)
    }

    fn rejected(&self, operation: &'static str, step: String) -> TraversalError {
        LockedMutationRejected {
            traversal: &self.id,
            operation,
            step: &step,
        }
        .log();
        TraversalError::LockedTraversal {
            traversal: self.id,
            operation,
            step,
        }
    }

    pub(crate) fn defer(&mut self, error: TraversalError) {
        DeferredBuildError {
            traversal: &self.id,
            error: &error,
        }
        .log();
        if self.deferred.is_none() {
            self.deferred = Some(error);
        }
    }

    /// Locks this traversal and every child beneath it.
    pub(crate) fn lock(&mut self) {
        self.locked = true;
        for step in self.steps.iter_mut() {
            for child in step.children_mut() {
                child.lock();
            }
        }
    }

    /// Children inherit the engine of the traversal they run inside.
    pub(crate) fn propagate_engine(&mut self) {
        let engine = self.engine;
        for step in self.steps.iter_mut() {
            for child in step.children_mut() {
                child.engine = engine;
                child.propagate_engine();
            }
        }
    }

    /// Union of requirements over this traversal, its children, and its seeds.
    pub fn collect_requirements(&self) -> RequirementSet {
        let mut requirements = RequirementSet::new();
        for step in &self.steps {
            requirements.extend(&step.requirements());
            if !step.labels().is_empty() {
                requirements.insert(TraverserRequirement::LabeledPath);
            }
            for child in step.children() {
                requirements.extend(&child.collect_requirements());
            }
        }
        if self.side_effects.sack_seed().is_some() {
            requirements.insert(TraverserRequirement::Sack);
        }
        requirements
    }

    /// What the children of step `step` inherit: everything this traversal
    /// inherited, plus the requirements of every step here and of the
    /// children of other steps. Branches of the same step never see each
    /// other's traversers, so they do not count.
    pub(crate) fn requirements_around(&self, step: usize) -> RequirementSet {
        let mut requirements = self.inherited.clone();
        for (index, current) in self.steps.iter().enumerate() {
            requirements.extend(&current.requirements());
            if !current.labels().is_empty() {
                requirements.insert(TraverserRequirement::LabeledPath);
            }
            if index == step {
                continue;
            }
            for child in current.children() {
                requirements.extend(&child.collect_requirements());
            }
        }
        requirements
    }

    /// Runs the strategies once and locks the pipeline. Later calls are no-ops
    /// apart from surfacing an error recorded while building.
    pub fn apply_strategies(&mut self) -> TraversalResult<()> {
        if let Some(error) = &self.deferred {
            return Err(error.clone());
        }
        if self.locked {
            return Ok(());
        }
        if self.engine == Engine::Unset {
            self.engine = Engine::Standard;
        }
        self.propagate_engine();
        let strategies = self.strategies.clone();
        strategies.apply(self)?;
        self.lock();
        self.requirements = self.collect_requirements();
        TraversalLocked {
            traversal: &self.id,
            engine: self.engine.name(),
            steps: self.steps.len(),
            requirements: &self.requirements,
        }
        .log();
        Ok(())
    }

    /// Clears buffered traversers and per-execution step state.
    pub fn reset(&mut self) {
        self.starts.clear();
        self.unrolled = None;
        self.failed = false;
        for step in self.steps.iter_mut() {
            step.reset();
        }
    }

    pub fn add_start(&mut self, traverser: Traverser) {
        self.starts.push_back(traverser);
    }

    /// Splits the pipeline before its first step that needs a global view.
    /// Returns the leading half; the rest stays in this traversal.
    pub(crate) fn split_prefix(&mut self) -> Vec<Step> {
        let at = self
            .steps
            .iter()
            .position(Step::requires_global_view)
            .unwrap_or(self.steps.len());
        let suffix = self.steps.split_off(at);
        std::mem::replace(&mut self.steps, suffix)
    }

    /// Continues the remaining steps on the standard engine, starting from
    /// traversers produced elsewhere.
    pub(crate) fn resume_with(&mut self, halted: impl IntoIterator<Item = Traverser>) {
        self.engine = Engine::Standard;
        self.propagate_engine();
        for mut traverser in halted {
            traverser.set_step_id(None);
            traverser.set_branch(None);
            self.starts.push_back(traverser);
        }
    }

    /// Pulls one traverser using the caller's execution context.
    pub(crate) fn next_in(&mut self, ctx: &mut StepContext<'_>) -> TraversalResult<Option<Traverser>> {
        Upstream::new(&mut self.steps, &mut self.starts).next(ctx)
    }

    pub(crate) fn has_next_in(&mut self, ctx: &mut StepContext<'_>) -> TraversalResult<bool> {
        Upstream::new(&mut self.steps, &mut self.starts).has_next(ctx)
    }

    pub(crate) fn drain_in(&mut self, ctx: &mut StepContext<'_>) -> TraversalResult<Vec<Traverser>> {
        let mut upstream = Upstream::new(&mut self.steps, &mut self.starts);
        let mut outputs = Vec::new();
        while let Some(traverser) = upstream.next(ctx)? {
            outputs.push(traverser);
        }
        Ok(outputs)
    }

    /// Removes and returns the leading and trailing labels of a pattern-style
    /// child. A leading identity left without labels is dropped.
    pub(crate) fn take_pattern_ends(&mut self) -> (Option<String>, Option<String>) {
        let start = self.steps.first_mut().and_then(|first| take_one_label(first));
        if start.is_some() {
            let bare_identity = self.steps.first().is_some_and(|first| {
                first.labels().is_empty() && matches!(first.kind(), StepKind::Filter(FilterStep::Identity))
            });
            if bare_identity && self.steps.len() > 1 {
                self.steps.remove(0);
            }
        }
        let end = self.steps.last_mut().and_then(|last| take_one_label(last));
        (start, end)
    }

    fn run_with<T>(
        &mut self,
        pull: impl FnOnce(&mut Upstream<'_>, &mut StepContext<'_>) -> TraversalResult<T>,
    ) -> TraversalResult<T> {
        self.apply_strategies()?;
        if self.engine == Engine::Computer {
            return Err(TraversalError::EngineMismatch {
                expected: Engine::Standard.name(),
                actual: Engine::Computer.name(),
            });
        }
        let Some(graph) = self.graph.clone() else {
            return Err(TraversalError::Unbound { traversal: self.id });
        };
        let mut ctx = StepContext::new(&*graph, &mut self.side_effects, &self.requirements);
        let mut upstream = Upstream::new(&mut self.steps, &mut self.starts);
        pull(&mut upstream, &mut ctx)
    }

    /// The next result traverser, or [`TraversalError::Exhausted`].
    pub fn next_traverser(&mut self) -> TraversalResult<Traverser> {
        self.run_with(|upstream, ctx| upstream.next(ctx))?
            .ok_or(TraversalError::Exhausted)
    }

    pub fn has_next(&mut self) -> TraversalResult<bool> {
        if self.unrolled.is_some() {
            return Ok(true);
        }
        self.run_with(|upstream, ctx| upstream.has_next(ctx))
    }

    /// Drains the pipeline for its side effects.
    pub fn iterate(&mut self) -> TraversalResult<()> {
        loop {
            match self.next_traverser() {
                Ok(_) => {}
                Err(TraversalError::Exhausted) => return Ok(()),
                Err(error) => return Err(error),
            }
        }
    }

    pub fn to_list(&mut self) -> TraversalResult<Vec<Value>> {
        let mut values = Vec::new();
        self.fill(&mut values)?;
        Ok(values)
    }

    pub fn to_set(&mut self) -> TraversalResult<BTreeSet<Value>> {
        let mut values = BTreeSet::new();
        self.fill(&mut values)?;
        Ok(values)
    }

    /// Results with their multiplicities, without unrolling bulk.
    pub fn to_bulk_set(&mut self) -> TraversalResult<BulkSet> {
        let mut set = BulkSet::new();
        loop {
            match self.next_traverser() {
                Ok(traverser) => {
                    let bulk = traverser.bulk();
                    set.add(traverser.into_value(), bulk);
                }
                Err(TraversalError::Exhausted) => return Ok(set),
                Err(error) => return Err(error),
            }
        }
    }

    /// Pushes every remaining result into `sink`; returns how many were added.
    pub fn fill<C: Extend<Value>>(&mut self, sink: &mut C) -> TraversalResult<u64> {
        let mut added = 0u64;
        loop {
            match self.next_traverser() {
                Ok(traverser) => {
                    let bulk = traverser.bulk();
                    let value = traverser.into_value();
                    sink.extend(std::iter::repeat(value).take(bulk as usize));
                    added += bulk;
                }
                Err(TraversalError::Exhausted) => return Ok(added),
                Err(error) => return Err(error),
            }
        }
    }
}

fn take_one_label(step: &mut Step) -> Option<String> {
    let mut labels = step.take_labels();
    let first = labels.pop_first();
    for rest in labels {
        step.add_label(rest);
    }
    first
}

/// Values, one per unit of bulk.
impl Iterator for Traversal {
    type Item = TraversalResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((value, remaining)) = self.unrolled.take() {
            if remaining > 1 {
                self.unrolled = Some((value.clone(), remaining - 1));
            }
            return Some(Ok(value));
        }
        if self.failed {
            return None;
        }
        match self.next_traverser() {
            Ok(traverser) => {
                let bulk = traverser.bulk();
                let value = traverser.into_value();
                if bulk > 1 {
                    self.unrolled = Some((value.clone(), bulk - 1));
                }
                Some(Ok(value))
            }
            Err(TraversalError::Exhausted) => None,
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            }
        }
    }
}

impl fmt::Debug for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traversal")
            .field("id", &self.id)
            .field("steps", &self.steps)
            .field("engine", &self.engine)
            .field("locked", &self.locked)
            .field("parent", &self.parent)
            .finish()
    }
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<String> = self.steps.iter().map(Step::to_string).collect();
        write!(f, "[{}]", steps.join(", "))
    }
}
