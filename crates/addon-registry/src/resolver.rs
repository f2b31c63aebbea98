//! Dependency resolution over a [`ModuleRegistry`].
//!
//! Resolution runs in three phases:
//!
//! 1. **Closure**: a work queue expands the seed names through `depends`.
//!    Names missing from the registry are recorded as unresolved.
//! 2. **Auto-install**: optionally, every `auto_install` module whose
//!    dependencies are all required joins the closure, its own dependencies
//!    are expanded, and full passes over the registry repeat until one adds
//!    nothing.
//! 3. **Ordering**: Kahn's algorithm places each module after its required
//!    dependencies. Among modules ready at the same time the one discovered
//!    first goes first.
//!
//! The installable filter is applied to the ordered result only, so a
//! filtered-out module still counts towards the closure.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use crate::error::{Error, Result};
use crate::registry::{InstallableFilter, ModuleRegistry};

/// Flags of a resolution request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub include_auto_install: bool,
    pub installable: InstallableFilter,
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Technical names, dependencies first.
    pub order: Vec<String>,
    /// Required names with no module in the registry, in encounter order.
    pub unresolved: Vec<String>,
}

/// Resolve `seeds` against `registry`.
///
/// Fails with [`Error::DependencyCycle`] when some required modules cannot
/// be ordered.
pub fn resolve<S: AsRef<str>>(
    registry: &ModuleRegistry,
    seeds: &[S],
    options: ResolveOptions,
) -> Result<Resolution> {
    let mut closure = Closure::new(registry);
    for seed in seeds {
        closure.require(seed.as_ref());
    }
    closure.expand();
    tracing::debug!(required = closure.positions.len(), "direct dependency closure");

    if options.include_auto_install {
        closure.auto_install();
        tracing::debug!(required = closure.positions.len(), "auto-install fixed point");
    }

    let Closure {
        positions,
        unresolved,
        ..
    } = closure;
    let order = topological_order(registry, &positions)?;

    let order = order
        .into_iter()
        .filter_map(|position| registry.at(position))
        .filter(|module| options.installable.matches(module))
        .map(|module| module.technical_name.clone())
        .collect();

    Ok(Resolution { order, unresolved })
}

impl ModuleRegistry {
    /// See [`resolve`].
    pub fn resolve<S: AsRef<str>>(&self, seeds: &[S], options: ResolveOptions) -> Result<Resolution> {
        resolve(self, seeds, options)
    }
}

struct Closure<'a> {
    registry: &'a ModuleRegistry,
    /// Every required name, known or not.
    names: HashSet<String>,
    /// Registry positions of the required names that exist.
    positions: BTreeSet<usize>,
    queue: VecDeque<usize>,
    unresolved: Vec<String>,
}

impl<'a> Closure<'a> {
    fn new(registry: &'a ModuleRegistry) -> Self {
        Self {
            registry,
            names: HashSet::new(),
            positions: BTreeSet::new(),
            queue: VecDeque::new(),
            unresolved: Vec::new(),
        }
    }

    fn require(&mut self, name: &str) {
        if !self.names.insert(name.to_string()) {
            return;
        }
        match self.registry.index_of(name) {
            Some(position) => {
                self.positions.insert(position);
                self.queue.push_back(position);
            }
            None => {
                tracing::debug!(module = name, "dependency not found in any search root");
                self.unresolved.push(name.to_string());
            }
        }
    }

    fn expand(&mut self) {
        let registry = self.registry;
        while let Some(position) = self.queue.pop_front() {
            let Some(module) = registry.at(position) else {
                continue;
            };
            for dependency in &module.depends {
                self.require(dependency);
            }
        }
    }

    /// Add auto-install modules until a full pass adds none.
    fn auto_install(&mut self) {
        let registry = self.registry;
        loop {
            let mut added = false;
            for module in registry.iter() {
                if !module.auto_install || self.names.contains(&module.technical_name) {
                    continue;
                }
                // An empty dependency list is satisfied by any closure.
                if module.depends.iter().all(|dep| self.names.contains(dep)) {
                    tracing::debug!(module = %module.technical_name, "auto-installed");
                    self.require(&module.technical_name);
                    self.expand();
                    added = true;
                }
            }
            if !added {
                break;
            }
        }
    }
}

/// Order registry positions so dependencies come first, breaking ties by
/// position.
fn topological_order(registry: &ModuleRegistry, required: &BTreeSet<usize>) -> Result<Vec<usize>> {
    let mut pending: HashMap<usize, usize> = HashMap::with_capacity(required.len());
    let mut dependents: HashMap<usize, Vec<usize>> = HashMap::new();

    for &position in required {
        let Some(module) = registry.at(position) else {
            continue;
        };
        let predecessors: BTreeSet<usize> = module
            .depends
            .iter()
            .filter_map(|dep| registry.index_of(dep))
            .filter(|dep| *dep != position && required.contains(dep))
            .collect();
        for &dep in &predecessors {
            dependents.entry(dep).or_default().push(position);
        }
        pending.insert(position, predecessors.len());
    }

    let mut ready: BTreeSet<usize> = pending
        .iter()
        .filter(|&(_, &count)| count == 0)
        .map(|(&position, _)| position)
        .collect();
    let mut order = Vec::with_capacity(required.len());

    while let Some(position) = ready.pop_first() {
        order.push(position);
        for dependent in dependents.get(&position).into_iter().flatten() {
            if let Some(count) = pending.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }

    if order.len() < pending.len() {
        let placed: HashSet<usize> = order.iter().copied().collect();
        let name = |position: &usize| {
            registry
                .at(*position)
                .map(|module| module.technical_name.clone())
                .unwrap_or_default()
        };
        let participants = required
            .iter()
            .filter(|position| !placed.contains(*position))
            .map(name)
            .collect();
        let resolved = order.iter().map(name).collect();
        return Err(Error::DependencyCycle {
            participants,
            resolved,
        });
    }

    Ok(order)
}
