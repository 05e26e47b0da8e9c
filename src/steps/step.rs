// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{TraversalError, TraversalResult};
use crate::observability::messages::traversal::BarrierDrained;
use crate::observability::messages::StructuredLog;
use crate::steps::{
    BarrierStep, FilterStep, FlatMapStep, MapStep, SideEffectStep, StartStep, StepContext,
    Upstream,
};
use crate::structure::{ElementIter, Value};
use crate::traversal::Traversal;
use crate::traverser::{RequirementSet, Traverser};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_STEP_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a step. Survives cloning, so a traverser
/// message can name its destination in any worker's copy of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StepId(pub u64);

impl StepId {
    fn next() -> Self {
        StepId(NEXT_STEP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role a step plays in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepRole {
    Start,
    Filter,
    Map,
    FlatMap,
    SideEffect,
    Barrier,
}

/// Step behaviour, one variant per role. Capability data (scoping keys,
/// reducers, child traversals) lives inside the role's own types.
#[derive(Debug, Clone)]
pub enum StepKind {
    Start(StartStep),
    Filter(FilterStep),
    Map(MapStep),
    FlatMap(FlatMapStep),
    SideEffect(SideEffectStep),
    Barrier(BarrierStep),
}

/// An adjacency hop being handed out one element per pull.
struct Expansion {
    source: Traverser,
    items: ElementIter<Value>,
}

/// Open expansion of a flat-map step. Clones start empty; a graph cursor
/// cannot be duplicated.
#[derive(Default)]
struct Cursor(Option<Expansion>);

impl Clone for Cursor {
    fn clone(&self) -> Self {
        Cursor(None)
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("open", &self.0.is_some()).finish()
    }
}

/// A node of the pipeline.
///
/// Its neighbours are implicit: the upstream half of the step list is passed
/// into every pull as an [`Upstream`], and whoever pulls from this step is
/// downstream. `pending` holds outputs already produced but not yet handed out,
/// which is also how `has_next` peeks without consuming.
#[derive(Debug, Clone)]
pub struct Step {
    id: StepId,
    labels: BTreeSet<String>,
    kind: StepKind,
    pending: VecDeque<Traverser>,
    cursor: Cursor,
}

impl Step {
    pub fn new(kind: StepKind) -> Self {
        Self {
            id: StepId::next(),
            labels: BTreeSet::new(),
            kind,
            pending: VecDeque::new(),
            cursor: Cursor::default(),
        }
    }

    pub fn id(&self) -> StepId {
        self.id
    }

    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut StepKind {
        &mut self.kind
    }

    pub fn role(&self) -> StepRole {
        match self.kind {
            StepKind::Start(_) => StepRole::Start,
            StepKind::Filter(_) => StepRole::Filter,
            StepKind::Map(_) => StepRole::Map,
            StepKind::FlatMap(_) => StepRole::FlatMap,
            StepKind::SideEffect(_) => StepRole::SideEffect,
            StepKind::Barrier(_) => StepRole::Barrier,
        }
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    pub fn add_label(&mut self, label: impl Into<String>) {
        self.labels.insert(label.into());
    }

    /// Removes and returns every label.
    pub fn take_labels(&mut self) -> BTreeSet<String> {
        std::mem::take(&mut self.labels)
    }

    pub fn name(&self) -> String {
        match &self.kind {
            StepKind::Start(s) => s.name(),
            StepKind::Filter(s) => s.name(),
            StepKind::Map(s) => s.name(),
            StepKind::FlatMap(s) => s.name(),
            StepKind::SideEffect(s) => s.name(),
            StepKind::Barrier(s) => s.name(),
        }
    }

    /// Requirements this step places on traversers, excluding its children.
    pub fn requirements(&self) -> RequirementSet {
        match &self.kind {
            StepKind::Start(_) => RequirementSet::new(),
            StepKind::Filter(s) => s.requirements(),
            StepKind::Map(s) => s.requirements(),
            StepKind::FlatMap(s) => s.requirements(),
            StepKind::SideEffect(s) => s.requirements(),
            StepKind::Barrier(s) => s.requirements(),
        }
    }

    pub fn children(&self) -> Vec<&Traversal> {
        match &self.kind {
            StepKind::Filter(s) => s.children(),
            StepKind::FlatMap(s) => s.children(),
            _ => Vec::new(),
        }
    }

    pub fn children_mut(&mut self) -> Vec<&mut Traversal> {
        match &mut self.kind {
            StepKind::Filter(s) => s.children_mut(),
            StepKind::FlatMap(s) => s.children_mut(),
            _ => Vec::new(),
        }
    }

    /// Steps that need every traverser in one place before deciding anything.
    pub fn requires_global_view(&self) -> bool {
        match &self.kind {
            StepKind::Barrier(_) => true,
            StepKind::Filter(f) => f.requires_global_view(),
            _ => false,
        }
    }

    /// Clears buffered output and per-execution state.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.cursor = Cursor::default();
        match &mut self.kind {
            StepKind::Start(s) => s.reset(),
            StepKind::Filter(s) => s.reset(),
            StepKind::Map(_) => {}
            StepKind::FlatMap(s) => s.reset(),
            StepKind::SideEffect(_) => {}
            StepKind::Barrier(s) => s.reset(),
        }
    }

    pub fn next(
        &mut self,
        upstream: &mut Upstream<'_>,
        ctx: &mut StepContext<'_>,
    ) -> TraversalResult<Option<Traverser>> {
        loop {
            if let Some(traverser) = self.pending.pop_front() {
                return Ok(Some(traverser));
            }
            if !self.refill(upstream, ctx)? {
                return Ok(None);
            }
        }
    }

    pub fn has_next(
        &mut self,
        upstream: &mut Upstream<'_>,
        ctx: &mut StepContext<'_>,
    ) -> TraversalResult<bool> {
        while self.pending.is_empty() {
            if !self.refill(upstream, ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Runs one traverser through this step in isolation.
    ///
    /// Used by the streaming roles during pulls and by the computer engine,
    /// which resumes traversers at a step by id. An output whose `step_id` is
    /// this step's id asks to be resumed here again, possibly on another vertex.
    pub fn process(
        &mut self,
        mut traverser: Traverser,
        ctx: &mut StepContext<'_>,
    ) -> TraversalResult<Vec<Traverser>> {
        let labels = &self.labels;
        match &mut self.kind {
            StepKind::Start(_) => {
                traverser.add_labels(labels);
                Ok(vec![traverser])
            }
            StepKind::Filter(filter) => {
                if filter.test(&mut traverser, ctx)? {
                    traverser.add_labels(labels);
                    Ok(vec![traverser])
                } else {
                    Ok(Vec::new())
                }
            }
            StepKind::Map(map) => match map.map(&traverser, ctx)? {
                Some(value) => {
                    let mut out = traverser.split(value);
                    out.extend_path(labels, ctx.requirements);
                    Ok(vec![out])
                }
                None => Ok(Vec::new()),
            },
            StepKind::FlatMap(flat_map) => {
                let branch = flat_map.is_branch();
                let mut outputs = flat_map.expand(self.id, traverser, ctx)?;
                for out in outputs.iter_mut() {
                    if out.step_id() == Some(self.id) {
                        continue;
                    }
                    if branch {
                        out.add_labels(labels);
                    } else {
                        out.extend_path(labels, ctx.requirements);
                    }
                }
                Ok(outputs)
            }
            StepKind::SideEffect(side_effect) => {
                side_effect.apply(&mut traverser, ctx)?;
                traverser.add_labels(labels);
                Ok(vec![traverser])
            }
            StepKind::Barrier(barrier) => Err(TraversalError::ComputerUnsupported {
                step: barrier.name(),
                reason: "a barrier reduces its whole input and cannot process traversers one at a time"
                    .into(),
            }),
        }
    }

    /// Produces more output into `pending`. Returns false once nothing more can come.
    fn refill(
        &mut self,
        upstream: &mut Upstream<'_>,
        ctx: &mut StepContext<'_>,
    ) -> TraversalResult<bool> {
        match self.role() {
            StepRole::Start => self.refill_start(upstream, ctx),
            StepRole::Barrier => self.refill_barrier(upstream, ctx),
            StepRole::FlatMap => self.refill_flat_map(upstream, ctx),
            _ => match upstream.next(ctx)? {
                Some(traverser) => {
                    let outputs = self.process(traverser, ctx)?;
                    self.pending.extend(outputs);
                    Ok(true)
                }
                None => Ok(false),
            },
        }
    }

    fn refill_start(
        &mut self,
        upstream: &mut Upstream<'_>,
        ctx: &mut StepContext<'_>,
    ) -> TraversalResult<bool> {
        // seeds handed to a child traversal pass straight through
        if let Some(seed) = upstream.next(ctx)? {
            let outputs = self.process(seed, ctx)?;
            self.pending.extend(outputs);
            return Ok(true);
        }
        let StepKind::Start(start) = &mut self.kind else {
            return Ok(false);
        };
        match start.next_value(ctx)? {
            Some(value) => {
                let mut traverser = ctx.new_traverser(value, 1);
                traverser.extend_path(&self.labels, ctx.requirements);
                self.pending.push_back(traverser);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Adjacency hops hand out one neighbour per pull; other flat-maps
    /// expand a whole input at once.
    fn refill_flat_map(
        &mut self,
        upstream: &mut Upstream<'_>,
        ctx: &mut StepContext<'_>,
    ) -> TraversalResult<bool> {
        loop {
            if let Some(expansion) = self.cursor.0.as_mut() {
                if let Some(value) = expansion.items.next() {
                    let mut out = expansion.source.split(value);
                    out.extend_path(&self.labels, ctx.requirements);
                    self.pending.push_back(out);
                    return Ok(true);
                }
                self.cursor = Cursor::default();
            }
            let Some(traverser) = upstream.next(ctx)? else {
                return Ok(false);
            };
            let opened = match &self.kind {
                StepKind::FlatMap(flat_map) => flat_map.open(&traverser, ctx)?,
                _ => None,
            };
            match opened {
                Some(items) => {
                    self.cursor = Cursor(Some(Expansion {
                        source: traverser,
                        items,
                    }))
                }
                None => {
                    let outputs = self.process(traverser, ctx)?;
                    self.pending.extend(outputs);
                    return Ok(true);
                }
            }
        }
    }

    fn refill_barrier(
        &mut self,
        upstream: &mut Upstream<'_>,
        ctx: &mut StepContext<'_>,
    ) -> TraversalResult<bool> {
        let StepKind::Barrier(barrier) = &mut self.kind else {
            return Ok(false);
        };
        if barrier.is_drained() {
            return Ok(false);
        }
        let limit = barrier.max_size();
        let mut inputs = 0usize;
        let mut exhausted = true;
        while let Some(traverser) = upstream.next(ctx)? {
            inputs += 1;
            barrier.accumulate(traverser, ctx)?;
            if limit.is_some_and(|max| inputs >= max) {
                exhausted = false;
                break;
            }
        }
        let pass_through = barrier.is_pass_through();
        let outputs = if exhausted {
            barrier.finish(ctx)?
        } else {
            barrier.flush(ctx)?
        };
        BarrierDrained {
            step: &barrier.name(),
            inputs,
            outputs: outputs.len(),
        }
        .log();
        for mut out in outputs {
            if pass_through {
                out.add_labels(&self.labels);
            } else {
                out.extend_path(&self.labels, ctx.requirements);
            }
            self.pending.push_back(out);
        }
        Ok(true)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if !self.labels.is_empty() {
            let labels: Vec<&str> = self.labels.iter().map(String::as_str).collect();
            write!(f, "@[{}]", labels.join(","))?;
        }
        Ok(())
    }
}
