//! Dependency graph over theme paths.
//!
//! Built before any color is evaluated so that unknown paths and cycles are
//! rejected up front. Acyclic graphs are grouped into waves: every entry of a
//! wave depends only on entries of earlier waves.

use std::collections::BTreeMap;

use crate::error::CompileError;
use crate::theme::spec::{ThemeSpec, TokenPath};

/// Per-entry state while walking the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitState {
    Unresolved,
    Resolving,
    Resolved,
    Failed,
}

/// Validated, acyclic dependency graph of one theme.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    deps: BTreeMap<TokenPath, Vec<TokenPath>>,
}

impl DependencyGraph {
    /// Build and validate the graph of `spec`.
    pub fn build(spec: &ThemeSpec) -> Result<Self, CompileError> {
        let deps: BTreeMap<TokenPath, Vec<TokenPath>> = spec
            .iter()
            .map(|(path, expr)| (path.clone(), expr.dependency().into_iter().cloned().collect()))
            .collect();

        let graph = Self { deps };
        let mut states: BTreeMap<&TokenPath, VisitState> =
            graph.deps.keys().map(|p| (p, VisitState::Unresolved)).collect();
        let mut stack = Vec::new();

        for path in graph.deps.keys() {
            graph.visit(path, &mut states, &mut stack)?;
        }
        Ok(graph)
    }

    fn visit<'a>(
        &'a self,
        path: &'a TokenPath,
        states: &mut BTreeMap<&'a TokenPath, VisitState>,
        stack: &mut Vec<&'a TokenPath>,
    ) -> Result<(), CompileError> {
        match states.get(path).copied().unwrap_or(VisitState::Unresolved) {
            VisitState::Resolved => return Ok(()),
            VisitState::Resolving => {
                let start = stack.iter().position(|p| *p == path).unwrap_or(0);
                let mut chain: Vec<String> = stack[start..].iter().map(|p| p.to_string()).collect();
                chain.push(path.to_string());
                return Err(CompileError::CyclicReference { chain });
            }
            VisitState::Failed | VisitState::Unresolved => {}
        }

        states.insert(path, VisitState::Resolving);
        stack.push(path);

        for dep in self.deps.get(path).map(Vec::as_slice).unwrap_or_default() {
            if !self.deps.contains_key(dep) {
                states.insert(path, VisitState::Failed);
                return Err(CompileError::unknown(path.as_str(), dep.as_str()));
            }
            if let Err(e) = self.visit(dep, states, stack) {
                states.insert(path, VisitState::Failed);
                return Err(e);
            }
        }

        stack.pop();
        states.insert(path, VisitState::Resolved);
        Ok(())
    }

    /// Direct dependencies of `path`.
    pub fn dependencies(&self, path: &TokenPath) -> &[TokenPath] {
        self.deps.get(path).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every path that depends directly on `path`.
    pub fn dependents(&self, path: &TokenPath) -> Vec<&TokenPath> {
        self.deps.iter().filter(|(_, deps)| deps.contains(path)).map(|(p, _)| p).collect()
    }

    /// Group entries into dependency levels, each sorted by path.
    pub fn waves(&self) -> Vec<Vec<TokenPath>> {
        let mut depth: BTreeMap<&TokenPath, usize> = BTreeMap::new();
        for path in self.deps.keys() {
            self.depth_of(path, &mut depth);
        }

        let mut waves: Vec<Vec<TokenPath>> = Vec::new();
        for (path, d) in depth {
            if waves.len() <= d {
                waves.resize_with(d + 1, Vec::new);
            }
            waves[d].push(path.clone());
        }
        waves
    }

    fn depth_of<'a>(&'a self, path: &'a TokenPath, memo: &mut BTreeMap<&'a TokenPath, usize>) -> usize {
        if let Some(&d) = memo.get(path) {
            return d;
        }
        let d = self
            .dependencies(path)
            .iter()
            .map(|dep| self.depth_of(dep, memo) + 1)
            .max()
            .unwrap_or(0);
        memo.insert(path, d);
        d
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }
}
