//! Ordering engine.
//!
//! Modules are partitioned into priority buckets (lower value first, no
//! priority meaning [`ModulePriority::DEFAULT`]). Inside a bucket,
//! `before`/`after` edges are applied with a stable Kahn sort whose ties go
//! to the earliest discovered module. An edge that points against the bucket
//! order cannot be satisfied and is reported, as is any cycle.
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::kernel::error::Result;
use crate::module_system::candidate::{RequestSite, ResolutionResult};
use crate::module_system::conflict::{ConflictManager, ConflictType, ModuleConflict, ResolutionStrategy};
use crate::module_system::error::ModuleSystemError;
use crate::module_system::manifest::{ExclusiveGroup, ModuleManifest};
use crate::module_system::traits::ModulePriority;

/// A module selected for activation and the request site that first
/// contributed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionEntry {
    pub module_id: String,
    pub site: RequestSite,
}

impl ResolutionEntry {
    pub fn new(module_id: impl Into<String>, site: RequestSite) -> Self {
        Self {
            module_id: module_id.into(),
            site,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderingHints {
    pub priority: Option<ModulePriority>,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub group: Option<ExclusiveGroup>,
}

impl From<&ModuleManifest> for OrderingHints {
    fn from(manifest: &ModuleManifest) -> Self {
        Self {
            priority: manifest.priority,
            before: manifest.before.clone(),
            after: manifest.after.clone(),
            group: manifest.group.clone(),
        }
    }
}

/// Deterministic sort of module ids by priority bucket and explicit edges.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModuleSorter;

impl ModuleSorter {
    /// `ids` must be in discovery order; it is the tie-breaker.
    pub fn sort(ids: &[String], hints: &HashMap<String, OrderingHints>) -> Result<Vec<String>> {
        let position: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (id.as_str(), i)).collect();
        let bucket_of = |id: &str| {
            hints
                .get(id)
                .and_then(|h| h.priority)
                .unwrap_or(ModulePriority::DEFAULT)
        };

        // (from, to): `from` must come before `to`
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for (idx, id) in ids.iter().enumerate() {
            let Some(h) = hints.get(id) else { continue };
            for target in &h.before {
                if let Some(&t) = position.get(target.as_str()) {
                    edges.push((idx, t));
                }
            }
            for source in &h.after {
                if let Some(&s) = position.get(source.as_str()) {
                    edges.push((s, idx));
                }
            }
        }

        let mut contradictions = Vec::new();
        let mut buckets: BTreeMap<ModulePriority, Vec<usize>> = BTreeMap::new();
        for (idx, id) in ids.iter().enumerate() {
            buckets.entry(bucket_of(id.as_str())).or_default().push(idx);
        }
        let mut in_bucket_edges: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut seen_edges = HashSet::new();
        for &(from, to) in &edges {
            if !seen_edges.insert((from, to)) {
                continue;
            }
            let (from_bucket, to_bucket) = (bucket_of(ids[from].as_str()), bucket_of(ids[to].as_str()));
            if from_bucket == to_bucket {
                in_bucket_edges.entry(from).or_default().push(to);
            } else if from_bucket > to_bucket {
                contradictions.push(format!(
                    "'{}' must precede '{}' but has priority {} after {}",
                    ids[from], ids[to], from_bucket, to_bucket
                ));
            }
        }
        if !contradictions.is_empty() {
            return Err(ModuleSystemError::OrderingConflict { details: contradictions }.into());
        }

        let mut sorted = Vec::with_capacity(ids.len());
        for members in buckets.values() {
            let order = kahn(members, &in_bucket_edges).map_err(|cycle| ModuleSystemError::OrderingCycle {
                cycle: cycle.into_iter().map(|i| ids[i].clone()).collect(),
            })?;
            sorted.extend(order.into_iter().map(|i| ids[i].clone()));
        }
        Ok(sorted)
    }
}

/// Kahn's algorithm over discovery indices. The ready node with the lowest
/// index is always taken next. On failure returns one cycle, closed by
/// repeating its first node.
fn kahn(members: &[usize], edges: &HashMap<usize, Vec<usize>>) -> std::result::Result<Vec<usize>, Vec<usize>> {
    let member_set: HashSet<usize> = members.iter().copied().collect();
    let mut in_degree: HashMap<usize, usize> = members.iter().map(|&m| (m, 0)).collect();
    for from in members {
        for to in edges.get(from).into_iter().flatten() {
            if member_set.contains(to) {
                *in_degree.entry(*to).or_insert(0) += 1;
            }
        }
    }

    let mut ready: BTreeSet<usize> = members.iter().copied().filter(|m| in_degree[m] == 0).collect();
    let mut order = Vec::with_capacity(members.len());
    while let Some(next) = ready.pop_first() {
        order.push(next);
        for to in edges.get(&next).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(to) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(*to);
                }
            }
        }
    }

    if order.len() == members.len() {
        return Ok(order);
    }

    // Every node left over has a predecessor that is also left over, so
    // walking predecessors must revisit a node.
    let placed: HashSet<usize> = order.iter().copied().collect();
    let remaining: BTreeSet<usize> = members.iter().copied().filter(|m| !placed.contains(m)).collect();
    let predecessor = |node: usize| {
        remaining
            .iter()
            .copied()
            .find(|candidate| edges.get(candidate).is_some_and(|targets| targets.contains(&node)))
    };

    let mut path: Vec<usize> = Vec::new();
    let mut visited_at: HashMap<usize, usize> = HashMap::new();
    let mut current = remaining.first().copied();
    while let Some(node) = current {
        if let Some(&start) = visited_at.get(&node) {
            let mut cycle: Vec<usize> = path[start..].to_vec();
            cycle.reverse();
            if let Some(&first) = cycle.first() {
                cycle.push(first);
            }
            return Err(cycle);
        }
        visited_at.insert(node, path.len());
        path.push(node);
        current = predecessor(node);
    }
    Err(remaining.into_iter().collect())
}

/// Accumulates resolution results from every request site of a run and
/// selects the final, ordered set of modules.
#[derive(Debug, Default)]
pub struct ImportGroup {
    entries: Vec<ResolutionEntry>,
    seen: HashSet<String>,
    exclusions: Vec<String>,
    excluded_seen: HashSet<String>,
}

impl ImportGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the candidates of one request. A module already contributed by
    /// an earlier site keeps its original entry.
    pub fn process(&mut self, site: &RequestSite, result: &ResolutionResult) {
        for id in &result.candidates {
            if self.seen.insert(id.clone()) {
                self.entries.push(ResolutionEntry::new(id.clone(), site.clone()));
            }
        }
        for id in &result.exclusions {
            if self.excluded_seen.insert(id.clone()) {
                self.exclusions.push(id.clone());
            }
        }
    }

    pub fn entries(&self) -> &[ResolutionEntry] {
        &self.entries
    }

    pub fn exclusions(&self) -> &[String] {
        &self.exclusions
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// union(candidates) minus union(exclusions), ordered, with at most one
    /// module per exclusive group. Dropped alternatives are recorded in
    /// `conflicts` as resolved with [`ResolutionStrategy::DisableSecond`].
    pub fn select_imports(
        &self,
        hints: &HashMap<String, OrderingHints>,
        conflicts: &mut ConflictManager,
    ) -> Result<Vec<ResolutionEntry>> {
        let surviving: Vec<&ResolutionEntry> = self
            .entries
            .iter()
            .filter(|e| !self.excluded_seen.contains(&e.module_id))
            .collect();
        let ids: Vec<String> = surviving.iter().map(|e| e.module_id.clone()).collect();
        let ordered = ModuleSorter::sort(&ids, hints)?;

        let by_id: HashMap<&str, &ResolutionEntry> =
            surviving.iter().map(|e| (e.module_id.as_str(), *e)).collect();
        let mut group_winner: HashMap<&str, &str> = HashMap::new();
        let mut selected = Vec::with_capacity(ordered.len());
        for id in &ordered {
            if let Some(group) = hints.get(id).and_then(|h| h.group.as_ref()) {
                if let Some(&kept) = group_winner.get(group.name.as_str()) {
                    let mut conflict = ModuleConflict::new(
                        kept,
                        id,
                        ConflictType::MutuallyExclusive,
                        &format!("both are alternatives of group '{}'", group.name),
                    );
                    conflict.resolve(ResolutionStrategy::DisableSecond);
                    log::info!(
                        "Module '{}' dropped: '{}' already provides group '{}'",
                        id,
                        kept,
                        group.name
                    );
                    conflicts.add_conflict(conflict);
                    continue;
                }
                group_winner.insert(group.name.as_str(), id.as_str());
            }
            if let Some(entry) = by_id.get(id.as_str()) {
                selected.push((*entry).clone());
            }
        }
        Ok(selected)
    }
}
