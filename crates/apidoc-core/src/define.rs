//! Definition pool: `@apiDefine` templates keyed by (name, version), with
//! cycle detection and `@apiUse` / `@api*Structure` expansion.

use crate::assemble::ParsedFile;
use crate::block::Block;
use crate::context::Context;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::merge;
use crate::version::Version;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

/// One reusable template.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: String,
    pub version: Version,
    pub title: String,
    pub description: String,
    /// The defining block's `local`, with its own `@apiUse` already expanded.
    pub local: Map<String, Value>,
    pub markdown_fields: BTreeSet<String>,
    pub file: String,
    pub block: usize,
}

impl Definition {
    fn from_block(block: &Block, version: Version) -> Option<Self> {
        let define = block.global.get("define")?;
        let text = |key: &str| {
            define
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string()
        };
        Some(Self {
            name: text("name"),
            version,
            title: text("title"),
            description: text("description"),
            local: block.local.clone(),
            markdown_fields: block.markdown_fields.clone(),
            file: block.filename.clone(),
            block: block.index,
        })
    }

    fn uses(&self) -> impl Iterator<Item = &str> {
        used_names(&self.local)
    }
}

/// `local` keys holding references to definitions, with the tag that writes
/// each. All of them resolve against the same pool.
pub const REFERENCE_KEYS: &[(&str, &str)] = &[
    ("use", "apiUse"),
    ("structure", "apiStructure"),
    ("successStructure", "apiSuccessStructure"),
    ("errorStructure", "apiErrorStructure"),
    ("headerStructure", "apiHeaderStructure"),
];

fn reference_names(entries: &Value) -> impl Iterator<Item = &str> {
    entries
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.get("name").and_then(Value::as_str))
}

/// Names referenced from `local`, in [`REFERENCE_KEYS`] order.
fn used_names(local: &Map<String, Value>) -> impl Iterator<Item = &str> {
    REFERENCE_KEYS
        .iter()
        .filter_map(|(key, _)| local.get(*key))
        .flat_map(reference_names)
}

/// Version of a block, or the package default when absent.
pub fn block_version(block: &Block, ctx: &Context) -> Version {
    block
        .version()
        .and_then(|v| Version::parse(v).ok())
        .unwrap_or_else(|| ctx.default_version().clone())
}

/// Strongly connected components of the `@apiUse` graph (Tarjan).
struct Walk<'a> {
    graph: &'a BTreeMap<String, Vec<String>>,
    next_index: usize,
    index: HashMap<&'a str, usize>,
    low: HashMap<&'a str, usize>,
    stack: Vec<&'a str>,
    on_stack: HashSet<&'a str>,
    /// Acyclic names, used definitions before their users.
    order: Vec<&'a str>,
    /// Components whose members use each other, members sorted.
    cycles: Vec<Vec<&'a str>>,
}

impl<'a> Walk<'a> {
    fn new(graph: &'a BTreeMap<String, Vec<String>>) -> Self {
        Self {
            graph,
            next_index: 0,
            index: HashMap::new(),
            low: HashMap::new(),
            stack: Vec::new(),
            on_stack: HashSet::new(),
            order: Vec::new(),
            cycles: Vec::new(),
        }
    }

    fn run(mut self) -> Self {
        let graph = self.graph;
        for name in graph.keys() {
            if !self.index.contains_key(name.as_str()) {
                self.visit(name);
            }
        }
        self
    }

    fn visit(&mut self, name: &'a str) {
        let graph = self.graph;
        let Some(edges) = graph.get(name) else {
            return;
        };
        self.index.insert(name, self.next_index);
        self.low.insert(name, self.next_index);
        self.next_index += 1;
        self.stack.push(name);
        self.on_stack.insert(name);

        // names outside the pool are not nodes; expansion reports them
        for next in edges.iter().map(String::as_str).filter(|n| graph.contains_key(*n)) {
            if !self.index.contains_key(next) {
                self.visit(next);
                let low = self.low[name].min(self.low[next]);
                self.low.insert(name, low);
            } else if self.on_stack.contains(next) {
                let low = self.low[name].min(self.index[next]);
                self.low.insert(name, low);
            }
        }

        if self.low[name] != self.index[name] {
            return;
        }
        let mut component = Vec::new();
        while let Some(member) = self.stack.pop() {
            self.on_stack.remove(member);
            component.push(member);
            if member == name {
                break;
            }
        }
        if component.len() > 1 || edges.iter().any(|e| e == name) {
            component.sort_unstable();
            self.cycles.push(component);
        } else {
            self.order.push(name);
        }
    }

    /// Shortest cycle through the first member of `component`, for the diagnostic.
    fn witness(&self, component: &[&'a str]) -> Vec<&'a str> {
        let Some(&start) = component.first() else {
            return Vec::new();
        };
        let graph = self.graph;
        let mut parent: HashMap<&'a str, &'a str> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for next in graph.get(current).into_iter().flatten().map(String::as_str) {
                if next == start {
                    let mut path = vec![current];
                    while let Some(&prev) = parent.get(path[path.len() - 1]) {
                        path.push(prev);
                    }
                    path.reverse();
                    path.push(start);
                    return path;
                }
                if component.contains(&next) && !parent.contains_key(next) {
                    parent.insert(next, current);
                    queue.push_back(next);
                }
            }
        }
        Vec::new()
    }
}

/// All definitions of a run.
#[derive(Debug, Clone, Default)]
pub struct DefinitionPool {
    entries: BTreeMap<String, BTreeMap<Version, Definition>>,
}

impl DefinitionPool {
    /// Collect every definition block, drop definitions that take part in a
    /// `@apiUse` cycle, and expand the remaining ones in dependency order.
    pub fn collect(files: &[ParsedFile], ctx: &Context, diagnostics: &mut Diagnostics) -> Self {
        let mut pool = Self::default();
        for block in files.iter().flat_map(|f| &f.blocks) {
            let Some(definition) = Definition::from_block(block, block_version(block, ctx)) else {
                continue;
            };
            pool.insert(definition, diagnostics);
        }

        let order = pool.remove_cycles(diagnostics);
        for name in order {
            pool.resolve(&name, diagnostics);
        }
        tracing::debug!(definitions = pool.len(), "collected definition pool");
        pool
    }

    pub fn insert(&mut self, definition: Definition, diagnostics: &mut Diagnostics) {
        let versions = self.entries.entry(definition.name.clone()).or_default();
        if let Some(previous) = versions.get(&definition.version) {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::DuplicateDefinition,
                    format!(
                        "`{}` version {} is already defined in {} (block {}); the later definition wins",
                        definition.name, definition.version, previous.file, previous.block
                    ),
                )
                .in_file(definition.file.clone())
                .at_block(definition.block)
                .with_tag("apiDefine"),
            );
        }
        versions.insert(definition.version.clone(), definition);
    }

    /// Report and remove every definition on a cycle. Returns the remaining
    /// names, dependencies first.
    fn remove_cycles(&mut self, diagnostics: &mut Diagnostics) -> Vec<String> {
        let graph: BTreeMap<String, Vec<String>> = self
            .entries
            .iter()
            .map(|(name, versions)| {
                let mut used: Vec<String> = versions
                    .values()
                    .flat_map(|d| d.uses())
                    .map(str::to_string)
                    .collect();
                used.sort();
                used.dedup();
                (name.clone(), used)
            })
            .collect();

        let walk = Walk::new(&graph).run();

        let mut cyclic = BTreeSet::new();
        for cycle in &walk.cycles {
            let origin = self
                .entries
                .get(cycle[0])
                .and_then(|versions| versions.values().next());
            let mut diagnostic = Diagnostic::new(
                DiagnosticKind::CyclicDefinition,
                format!(
                    "definitions use each other: {} ({}); all of them are excluded",
                    cycle.join(", "),
                    walk.witness(cycle).join(" -> ")
                ),
            )
            .with_tag("apiUse");
            if let Some(origin) = origin {
                diagnostic = diagnostic.in_file(origin.file.clone()).at_block(origin.block);
            }
            diagnostics.push(diagnostic);
            cyclic.extend(cycle.iter().map(|n| n.to_string()));
        }
        for name in &cyclic {
            self.entries.remove(name);
        }

        walk.order.into_iter().map(str::to_string).collect()
    }

    /// Expand the `@apiUse` references of every version of `name`.
    fn resolve(&mut self, name: &str, diagnostics: &mut Diagnostics) {
        let Some(mut versions) = self.entries.remove(name) else {
            return;
        };
        for definition in versions.values_mut() {
            self.expand(
                &mut definition.local,
                &mut definition.markdown_fields,
                &definition.version,
                (definition.file.as_str(), definition.block),
                diagnostics,
            );
        }
        self.entries.insert(name.to_string(), versions);
    }

    /// Exact version, else the greatest version not newer than `version`.
    pub fn lookup(&self, name: &str, version: &Version) -> Option<&Definition> {
        self.entries
            .get(name)?
            .range(..=version)
            .next_back()
            .map(|(_, definition)| definition)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of (name, version) entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace `local.use` and the structure references with the referenced
    /// templates, authored data on top. Unresolvable references are reported
    /// and dropped.
    pub fn expand(
        &self,
        local: &mut Map<String, Value>,
        markdown_fields: &mut BTreeSet<String>,
        version: &Version,
        (file, block): (&str, usize),
        diagnostics: &mut Diagnostics,
    ) {
        let mut references: Vec<(String, &str)> = Vec::new();
        let mut found = false;
        for (key, tag) in REFERENCE_KEYS {
            let Some(entries) = local.remove(*key) else {
                continue;
            };
            found = true;
            references.extend(reference_names(&entries).map(|name| (name.to_string(), *tag)));
        }
        if !found {
            return;
        }

        let mut template = Map::new();
        for (name, tag) in &references {
            match self.lookup(name, version) {
                Some(definition) => {
                    merge::accumulate(&mut template, &definition.local);
                    markdown_fields.extend(definition.markdown_fields.iter().cloned());
                }
                None => {
                    let message = if self.contains(name) {
                        format!("`{}` has no definition at or below version {}", name, version)
                    } else {
                        format!("`{}` is not defined with @apiDefine", name)
                    };
                    diagnostics.push(
                        Diagnostic::new(DiagnosticKind::UnresolvedReference, message)
                            .in_file(file)
                            .at_block(block)
                            .with_tag(*tag),
                    );
                }
            }
        }

        let authored = std::mem::take(local);
        *local = merge::overlay(template, authored);
    }
}
