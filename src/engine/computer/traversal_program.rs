// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::computer::{
    ComputeVertex, Memory, MemoryComputeKey, MemoryOperator, Messenger, RoundMemory,
};
use crate::errors::{TraversalError, TraversalResult};
use crate::steps::{StartSource, Step, StepContext, StepId, StepKind};
use crate::structure::{Direction, Graph, Value, VertexId};
use crate::traits::VertexProgram;
use crate::traverser::{RequirementSet, SideEffects, Traverser, TraverserSet};
use std::collections::VecDeque;

/// Or-ed by every vertex that sent a traverser this round.
pub const ACTIVE_KEY: &str = "~active";
/// Total traverser visits, summed over all rounds.
pub const PROCESSED_KEY: &str = "~processed";

/// Runs the leading, locally executable part of a traversal as a vertex program.
///
/// Traversers are messages. Each vertex processes the traversers sitting on
/// it until one of them needs a different vertex, at which point it is sent
/// there and resumes next round at the step named by its `step_id`. A
/// traverser that has passed the last step halts and becomes part of the
/// vertex's state.
#[derive(Debug, Clone)]
pub struct TraversalVertexProgram {
    steps: Vec<Step>,
    requirements: RequirementSet,
    side_effects: SideEffects,
}

impl TraversalVertexProgram {
    pub(crate) fn new(
        steps: Vec<Step>,
        requirements: RequirementSet,
        side_effects: SideEffects,
    ) -> TraversalResult<Self> {
        match steps.first().map(Step::kind) {
            Some(StepKind::Start(start))
                if !matches!(start.source(), StartSource::Inject(_)) => {}
            Some(other) => {
                return Err(TraversalError::ComputerUnsupported {
                    step: steps[0].name(),
                    reason: format!(
                        "a computer traversal must start from the graph, not {}",
                        match other {
                            StepKind::Start(_) => "injected values",
                            _ => "a mid-traversal step",
                        }
                    ),
                })
            }
            None => {
                return Err(TraversalError::ComputerUnsupported {
                    step: "empty".into(),
                    reason: "nothing to execute".into(),
                })
            }
        }
        Ok(Self {
            steps,
            requirements,
            side_effects,
        })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    fn position(&self, step: StepId) -> TraversalResult<usize> {
        self.steps
            .iter()
            .position(|s| s.id() == step)
            .ok_or_else(|| TraversalError::JobFailed(format!("traverser addressed unknown step {}", step)))
    }

    fn after(&self, index: usize) -> Option<StepId> {
        self.steps.get(index + 1).map(Step::id)
    }

    /// Start traversers for the first round at `home`.
    fn seed(&self, vertex: &ComputeVertex<'_, TraverserSet>) -> TraversalResult<Vec<Traverser>> {
        let start = &self.steps[0];
        let StepKind::Start(start_step) = start.kind() else {
            return Ok(Vec::new());
        };
        let values: Vec<Value> = match start_step.source() {
            StartSource::Vertices(ids) => {
                if ids.is_empty() || ids.contains(&vertex.id()) {
                    vec![Value::Vertex(vertex.vertex().clone())]
                } else {
                    Vec::new()
                }
            }
            // each edge is seeded once, at its out vertex
            StartSource::Edges(ids) => vertex
                .graph()
                .vertex_edges(vertex.id(), Direction::Out, &[])?
                .filter(|edge| ids.is_empty() || ids.contains(&edge.id))
                .map(Value::Edge)
                .collect(),
            StartSource::Inject(_) => Vec::new(),
        };
        let next = self.after(0);
        Ok(values
            .into_iter()
            .map(|value| {
                let mut traverser =
                    Traverser::start(value, 1, &self.requirements, self.side_effects.sack_seed());
                traverser.extend_path(start.labels(), &self.requirements);
                traverser.set_step_id(next);
                traverser
            })
            .collect())
    }
}

/// The vertex a non-local value must travel to.
fn home_of(value: &Value) -> Option<VertexId> {
    match value {
        Value::Vertex(vertex) => Some(vertex.id),
        Value::Edge(edge) => Some(edge.out_v.id),
        _ => None,
    }
}

impl VertexProgram for TraversalVertexProgram {
    type Message = Traverser;
    type State = TraverserSet;

    fn memory_compute_keys(&self) -> Vec<MemoryComputeKey> {
        vec![
            MemoryComputeKey::new(ACTIVE_KEY, MemoryOperator::Or),
            MemoryComputeKey::new(PROCESSED_KEY, MemoryOperator::Incr),
        ]
    }

    fn setup(&self, memory: &mut Memory) -> TraversalResult<()> {
        memory.set(ACTIVE_KEY, Value::Bool(false))?;
        memory.set(PROCESSED_KEY, Value::Int(0))
    }

    fn execute(
        &mut self,
        vertex: &mut ComputeVertex<'_, TraverserSet>,
        messenger: &mut Messenger<'_, Traverser>,
        memory: &mut RoundMemory,
    ) -> TraversalResult<()> {
        let mut queue: VecDeque<Traverser> = if memory.is_initial_iteration() {
            self.seed(vertex)?.into()
        } else {
            // merge equal arrivals before doing any work on them
            messenger
                .receive()
                .into_iter()
                .collect::<TraverserSet>()
                .into_vec()
                .into()
        };
        if queue.is_empty() {
            return Ok(());
        }

        let home = vertex.id();
        let mut halted = Vec::new();
        let mut processed = 0i64;
        let mut sent = false;
        while let Some(traverser) = queue.pop_front() {
            let Some(step_id) = traverser.step_id() else {
                halted.push(traverser);
                continue;
            };
            let index = self.position(step_id)?;
            let mut ctx = StepContext {
                graph: vertex.graph() as &dyn Graph,
                side_effects: &mut self.side_effects,
                requirements: &self.requirements,
                home: Some(home),
            };
            if !ctx.is_local(traverser.value()) {
                if let Some(target) = home_of(traverser.value()) {
                    messenger.send(target, traverser);
                    sent = true;
                    continue;
                }
            }
            processed += 1;
            let next = self.steps.get(index + 1).map(Step::id);
            let step = &mut self.steps[index];
            for mut output in step.process(traverser, &mut ctx)? {
                if output.step_id() != Some(step_id) {
                    output.set_step_id(next);
                }
                queue.push_back(output);
            }
        }

        let state = vertex.state_mut();
        for traverser in halted {
            state.add(traverser);
        }
        memory.incr(PROCESSED_KEY, Value::Int(processed))?;
        if sent {
            memory.or(ACTIVE_KEY, true)?;
        }
        Ok(())
    }

    fn terminate(&self, memory: &mut Memory) -> TraversalResult<bool> {
        let active = memory.get(ACTIVE_KEY).and_then(Value::as_bool).unwrap_or(false);
        memory.set(ACTIVE_KEY, Value::Bool(false))?;
        Ok(!active)
    }
}
