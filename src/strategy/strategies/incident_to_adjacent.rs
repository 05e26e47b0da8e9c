// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::Engine;
use crate::errors::TraversalResult;
use crate::steps::{Emits, FlatMapStep, MapStep, Step, StepKind};
use crate::strategy::StrategyCategory;
use crate::structure::Direction;
use crate::traits::TraversalStrategy;
use crate::traversal::Traversal;

/// Folds an edge hop followed by the far endpoint into a single vertex hop:
/// `out_e().in_v()` to `out()`, `in_e().out_v()` to `in_()`,
/// `both_e().other_v()` to `both()`.
///
/// Skipped when the edge step is labeled or a step reads full paths, since
/// either would observe the edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncidentToAdjacentStrategy;

impl IncidentToAdjacentStrategy {
    pub const ID: &'static str = "incident_to_adjacent";
}

fn folds_into(edge_step: &Step, vertex_step: &Step) -> Option<(Direction, Vec<String>)> {
    if !edge_step.labels().is_empty() {
        return None;
    }
    let StepKind::FlatMap(FlatMapStep::Vertex {
        direction,
        edge_labels,
        emits: Emits::Edges,
    }) = edge_step.kind()
    else {
        return None;
    };
    let matches = match (direction, vertex_step.kind()) {
        (Direction::Out, StepKind::Map(MapStep::EdgeVertex(Direction::In))) => true,
        (Direction::In, StepKind::Map(MapStep::EdgeVertex(Direction::Out))) => true,
        (Direction::Both, StepKind::Map(MapStep::OtherVertex)) => true,
        _ => false,
    };
    matches.then(|| (*direction, edge_labels.clone()))
}

/// Whether anything other than `other_v` itself needs full paths. `other_v`
/// only uses the path to find where it came from, which a folded step makes moot.
/// A child traversal also answers for the paths its enclosing traversals read.
fn observes_path(traversal: &Traversal) -> bool {
    if traversal.inherited_requirements().tracks_full_path() {
        return true;
    }
    traversal.steps().iter().any(|step| {
        let own = !matches!(step.kind(), StepKind::Map(MapStep::OtherVertex))
            && step.requirements().tracks_full_path();
        own || step
            .children()
            .iter()
            .any(|child| child.collect_requirements().tracks_full_path())
    })
}

impl TraversalStrategy for IncidentToAdjacentStrategy {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Optimization
    }

    fn apply(&self, traversal: &mut Traversal, _engine: Engine) -> TraversalResult<()> {
        if observes_path(traversal) {
            return Ok(());
        }
        let mut index = 0;
        while index + 1 < traversal.steps().len() {
            let steps = traversal.steps();
            let Some((direction, edge_labels)) = folds_into(&steps[index], &steps[index + 1]) else {
                index += 1;
                continue;
            };
            let mut vertex_step = traversal.remove_step(index + 1)?;
            traversal.remove_step(index)?;
            let mut adjacent = Step::new(StepKind::FlatMap(FlatMapStep::Vertex {
                direction,
                edge_labels,
                emits: Emits::Vertices,
            }));
            for label in vertex_step.take_labels() {
                adjacent.add_label(label);
            }
            traversal.insert_step(index, adjacent)?;
            index += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::TraversalStrategies;
    use crate::traversal::__;
    use std::sync::Arc;

    fn names(t: &Traversal) -> Vec<String> {
        t.steps().iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_edge_hops_fold_into_vertex_hops() {
        let cases = vec![
            (__::out_e(&["knows"]).in_v(), "out(knows)"),
            (__::in_e(&[]).out_v(), "in()"),
            (Traversal::new().both_e(&["created"]).other_v(), "both(created)"),
        ];
        for (mut t, expected) in cases {
            IncidentToAdjacentStrategy.apply(&mut t, Engine::Standard).unwrap();
            assert_eq!(names(&t), vec![expected.to_string()]);
        }
    }

    #[test]
    fn test_labels_on_the_vertex_step_are_kept() {
        let mut t = __::out_e(&[]).in_v().as_("friend");
        IncidentToAdjacentStrategy.apply(&mut t, Engine::Standard).unwrap();
        assert!(t.steps()[0].labels().contains("friend"));
    }

    #[test]
    fn test_labeled_edge_or_mismatched_direction_is_left_alone() {
        let mut labeled = __::out_e(&[]).as_("e").in_v();
        IncidentToAdjacentStrategy.apply(&mut labeled, Engine::Standard).unwrap();
        assert_eq!(labeled.steps().len(), 2);

        let mut mismatched = __::out_e(&[]).out_v();
        IncidentToAdjacentStrategy.apply(&mut mismatched, Engine::Standard).unwrap();
        assert_eq!(mismatched.steps().len(), 2);
    }

    #[test]
    fn test_full_path_blocks_the_rewrite() {
        let mut t = __::out_e(&[]).in_v().path();
        IncidentToAdjacentStrategy.apply(&mut t, Engine::Standard).unwrap();
        assert_eq!(t.steps().len(), 3);
    }

    #[test]
    fn test_parent_path_blocks_the_rewrite_in_children() {
        let strategies =
            TraversalStrategies::new(vec![Arc::new(IncidentToAdjacentStrategy)]).unwrap();

        let mut t = __::identity().union(vec![__::out_e(&["knows"]).in_v()]).path();
        strategies.apply(&mut t).unwrap();
        assert_eq!(names(t.steps()[1].children()[0]), vec!["outE(knows)", "inV"]);

        let mut t = __::identity().union(vec![__::out_e(&["knows"]).in_v()]);
        strategies.apply(&mut t).unwrap();
        assert_eq!(names(t.steps()[1].children()[0]), vec!["out(knows)"]);
    }
}
