//! Reference Graph
//!
//! Model-to-model `$ref` edges as a petgraph `DiGraph`. Strongly connected
//! components mark the models whose compiled validators contain permissive
//! placeholders; dangling targets come with name suggestions. Edges follow
//! the same rules the compiler uses to decide which references it expands.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::descriptor::{ref_model_name, ItemsDescriptor, ModelDescriptor, SchemaDescriptor, TypeTag};

// =============================================================================
// Edge Site
// =============================================================================

/// Where inside a model a reference sits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteSegment {
    /// A named property
    Field(String),
    /// Array items / nested object shape
    Items,
}

impl fmt::Display for SiteSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, ".{}", name),
            Self::Items => write!(f, "[]"),
        }
    }
}

/// Path from a model root to a reference
pub type SitePath = Vec<SiteSegment>;

pub fn format_site_path(path: &SitePath) -> String {
    if path.is_empty() {
        return String::from("<root>");
    }
    path.iter().map(|s| s.to_string()).collect::<String>()
}

// =============================================================================
// Report Types
// =============================================================================

/// Models that reach each other through references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleGroup {
    /// Sorted member names
    pub members: Vec<String>,
    /// Single model referencing itself
    pub is_self_referential: bool,
}

/// A reference whose target model does not exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingReference {
    pub from_model: String,
    pub site: String,
    pub target: String,
    /// Closest existing model names, best first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// Serializable summary of the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphReport {
    pub models: usize,
    pub references: usize,
    pub fixture_models: Vec<String>,
    pub cycles: Vec<CycleGroup>,
    pub dangling: Vec<DanglingReference>,
}

// =============================================================================
// Graph
// =============================================================================

pub struct ReferenceGraph {
    graph: DiGraph<String, SitePath>,
    nodes: HashMap<String, NodeIndex>,
    dangling: Vec<DanglingReference>,
    fixture_models: Vec<String>,
}

impl ReferenceGraph {
    pub fn build(schema: &SchemaDescriptor) -> Self {
        let mut graph = DiGraph::with_capacity(schema.models.len(), schema.models.len() * 2);
        let mut nodes = HashMap::with_capacity(schema.models.len());

        for name in schema.models.keys() {
            nodes.insert(name.clone(), graph.add_node(name.clone()));
        }

        let matcher = SkimMatcherV2::default();
        let mut dangling = Vec::new();

        for (name, model) in &schema.models {
            let mut refs = Vec::new();
            collect_model_refs(model, &mut Vec::new(), &mut refs);

            for (site, target_ref) in refs {
                let target = ref_model_name(target_ref);
                match nodes.get(target) {
                    Some(&to) => {
                        graph.add_edge(nodes[name], to, site);
                    }
                    None => dangling.push(DanglingReference {
                        from_model: name.clone(),
                        site: format_site_path(&site),
                        target: target.to_string(),
                        suggestions: suggest(&matcher, target, schema.models.keys()),
                    }),
                }
            }
        }

        let fixture_models = schema
            .fixture_model_names()
            .into_iter()
            .map(String::from)
            .collect();

        Self {
            graph,
            nodes,
            dangling,
            fixture_models,
        }
    }

    pub fn model_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn reference_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Direct targets of a model's references, sorted and deduplicated
    pub fn references_from(&self, model: &str) -> Vec<&str> {
        let Some(&idx) = self.nodes.get(model) else {
            return Vec::new();
        };
        let mut targets: Vec<&str> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| self.graph[e.target()].as_str())
            .collect();
        targets.sort_unstable();
        targets.dedup();
        targets
    }

    /// Cyclic groups: SCCs with several members, or one member with a self edge
    pub fn cycles(&self) -> Vec<CycleGroup> {
        let mut groups = Vec::new();

        for scc in kosaraju_scc(&self.graph) {
            let is_self_referential = scc.len() == 1
                && self
                    .graph
                    .edges_directed(scc[0], Direction::Outgoing)
                    .any(|e| e.target() == scc[0]);

            if scc.len() > 1 || is_self_referential {
                let mut members: Vec<String> =
                    scc.iter().map(|idx| self.graph[*idx].clone()).collect();
                members.sort();
                groups.push(CycleGroup {
                    members,
                    is_self_referential,
                });
            }
        }

        groups.sort_by(|a, b| a.members.cmp(&b.members));
        groups
    }

    pub fn is_cyclic(&self, model: &str) -> bool {
        self.cycles()
            .iter()
            .any(|g| g.members.iter().any(|m| m == model))
    }

    pub fn dangling(&self) -> &[DanglingReference] {
        &self.dangling
    }

    pub fn fixture_models(&self) -> &[String] {
        &self.fixture_models
    }

    pub fn report(&self) -> GraphReport {
        GraphReport {
            models: self.model_count(),
            references: self.reference_count(),
            fixture_models: self.fixture_models.clone(),
            cycles: self.cycles(),
            dangling: self.dangling.clone(),
        }
    }
}

// =============================================================================
// Reference Collection
// =============================================================================

fn collect_model_refs<'s>(
    model: &'s ModelDescriptor,
    path: &mut SitePath,
    out: &mut Vec<(SitePath, &'s str)>,
) {
    match model.kind {
        TypeTag::Object => {
            for (name, field) in &model.properties {
                path.push(SiteSegment::Field(name.clone()));
                let follows_refs = field.kind == TypeTag::Object
                    || (field.kind.is_unspecified() && field.reference.is_some());
                let follows_items = field.kind == TypeTag::Array || field.kind == TypeTag::Object;

                match (&field.reference, &field.items) {
                    (Some(target), _) if follows_refs => out.push((path.clone(), target.as_str())),
                    (_, Some(items)) if follows_items => {
                        path.push(SiteSegment::Items);
                        collect_items_refs(items, path, out);
                        path.pop();
                    }
                    _ => {}
                }
                path.pop();
            }
        }
        TypeTag::Array => {
            if let Some(items) = &model.items {
                path.push(SiteSegment::Items);
                collect_items_refs(items, path, out);
                path.pop();
            }
        }
        _ => {}
    }
}

fn collect_items_refs<'s>(
    items: &'s ItemsDescriptor,
    path: &mut SitePath,
    out: &mut Vec<(SitePath, &'s str)>,
) {
    match items {
        ItemsDescriptor::Reference(reference) => {
            out.push((path.clone(), reference.target.as_str()))
        }
        ItemsDescriptor::Inline(model) => collect_model_refs(model, path, out),
    }
}

/// Up to three model names resembling `target`
fn suggest<'a>(
    matcher: &SkimMatcherV2,
    target: &str,
    names: impl Iterator<Item = &'a String>,
) -> Vec<String> {
    if target.is_empty() {
        return Vec::new();
    }
    let mut scored: Vec<(i64, &String)> = names
        .filter_map(|name| {
            matcher
                .fuzzy_match(name, target)
                .or_else(|| matcher.fuzzy_match(target, name))
                .map(|score| (score, name))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().take(3).map(|(_, name)| name.clone()).collect()
}
