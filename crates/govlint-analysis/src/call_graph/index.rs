//! Name-indexed view over a file's methods.

use govlint_core::types::collections::{FxHashMap, SmallVec2};

use crate::extractor::Method;

/// Methods keyed by lowercased name. Overloads share one entry.
#[derive(Debug, Clone)]
pub struct MethodIndex<'p> {
    methods: &'p [Method],
    by_name: FxHashMap<String, SmallVec2<usize>>,
}

impl<'p> MethodIndex<'p> {
    pub fn new(methods: &'p [Method]) -> Self {
        let mut by_name: FxHashMap<String, SmallVec2<usize>> = FxHashMap::default();
        for (idx, method) in methods.iter().enumerate() {
            by_name
                .entry(method.name.to_ascii_lowercase())
                .or_default()
                .push(idx);
        }
        Self { methods, by_name }
    }

    /// Methods named `name`, ignoring case, in declaration order.
    pub fn resolve(&self, name: &str) -> impl Iterator<Item = &'p Method> + '_ {
        let methods = self.methods;
        self.by_name
            .get(&name.to_ascii_lowercase())
            .into_iter()
            .flat_map(move |ids| ids.iter().map(move |&i| &methods[i]))
    }
}
