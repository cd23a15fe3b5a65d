//! Resolution Context
//!
//! Per-path state threaded through one top-level model's compilation. A
//! context is never mutated: descending into a reference produces a new
//! context owned by that subtree, so sibling branches keep seeing their
//! parent's visited set and a shared submodel reached twice (a diamond) is
//! not mistaken for a cycle.

use crate::descriptor::{ModelDescriptor, SchemaDescriptor};

/// Default bound on reference nesting
pub const DEFAULT_MAX_DEPTH: usize = 10;

#[derive(Debug, Clone)]
pub struct ResolutionContext<'s> {
    schema: &'s SchemaDescriptor,
    /// Models on the current path from the document root, outermost first
    visited: Vec<&'s str>,
    depth: usize,
    max_depth: usize,
}

/// Outcome of trying to descend into a named model
#[derive(Debug, Clone)]
pub enum Descent<'s> {
    /// Expand the model with this context
    Proceed(ResolutionContext<'s>),
    /// The model is already on the current path
    Cycle,
    /// The depth budget is spent
    DepthExceeded,
}

impl<'s> ResolutionContext<'s> {
    /// Fresh context: nothing visited, depth 0
    pub fn new(schema: &'s SchemaDescriptor, max_depth: usize) -> Self {
        Self {
            schema,
            visited: Vec::new(),
            depth: 0,
            max_depth,
        }
    }

    pub fn lookup(&self, model_name: &str) -> Option<&'s ModelDescriptor> {
        self.schema.model(model_name)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn visited(&self) -> &[&'s str] {
        &self.visited
    }

    pub fn is_visited(&self, model_name: &str) -> bool {
        self.visited.iter().any(|v| *v == model_name)
    }

    /// Current path rendered as `A -> B -> C`
    pub fn trail(&self) -> String {
        if self.visited.is_empty() {
            return String::from("<root>");
        }
        self.visited.join(" -> ")
    }

    /// Decide whether `model_name` may be expanded below this point.
    ///
    /// Cycles are reported before depth overruns; both end in the same
    /// permissive placeholder.
    pub fn descend(&self, model_name: &'s str) -> Descent<'s> {
        if self.is_visited(model_name) {
            return Descent::Cycle;
        }
        if self.depth >= self.max_depth {
            return Descent::DepthExceeded;
        }
        let mut visited = self.visited.clone();
        visited.push(model_name);
        Descent::Proceed(Self {
            schema: self.schema,
            visited,
            depth: self.depth + 1,
            max_depth: self.max_depth,
        })
    }
}
