// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Anonymous traversals for use as children: `__::out(&["knows"]).as_("b")`.
//!
//! Each function starts a fresh graph-less [`Traversal`] with one step.

use crate::steps::{WherePredicate, P};
use crate::structure::Value;
use crate::traversal::Traversal;

pub fn start() -> Traversal {
    Traversal::new()
}

pub fn as_(label: &str) -> Traversal {
    Traversal::new().as_(label)
}

pub fn inject(values: Vec<Value>) -> Traversal {
    Traversal::new().inject(values)
}

pub fn identity() -> Traversal {
    Traversal::new().identity()
}

pub fn has(key: &str, predicate: P) -> Traversal {
    Traversal::new().has(key, predicate)
}

pub fn has_label(labels: &[&str]) -> Traversal {
    Traversal::new().has_label(labels)
}

pub fn is(predicate: P) -> Traversal {
    Traversal::new().is(predicate)
}

pub fn where_(predicate: WherePredicate) -> Traversal {
    Traversal::new().where_(predicate)
}

pub fn not(child: Traversal) -> Traversal {
    Traversal::new().not(child)
}

pub fn id() -> Traversal {
    Traversal::new().id()
}

pub fn label() -> Traversal {
    Traversal::new().label()
}

pub fn constant(value: impl Into<Value>) -> Traversal {
    Traversal::new().constant(value)
}

pub fn select(labels: &[&str]) -> Traversal {
    Traversal::new().select(labels)
}

pub fn out(labels: &[&str]) -> Traversal {
    Traversal::new().out(labels)
}

pub fn in_(labels: &[&str]) -> Traversal {
    Traversal::new().in_(labels)
}

pub fn both(labels: &[&str]) -> Traversal {
    Traversal::new().both(labels)
}

pub fn out_e(labels: &[&str]) -> Traversal {
    Traversal::new().out_e(labels)
}

pub fn in_e(labels: &[&str]) -> Traversal {
    Traversal::new().in_e(labels)
}

pub fn in_v() -> Traversal {
    Traversal::new().in_v()
}

pub fn out_v() -> Traversal {
    Traversal::new().out_v()
}

pub fn values(keys: &[&str]) -> Traversal {
    Traversal::new().values(keys)
}

pub fn unfold() -> Traversal {
    Traversal::new().unfold()
}

pub fn count() -> Traversal {
    Traversal::new().count()
}

pub fn fold() -> Traversal {
    Traversal::new().fold()
}
