use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smol_str::{SmolStr, format_smolstr};

use crate::value::{Value, ValueSet};

/// A named value built once per compilation and shared by every closure that
/// references it.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: SmolStr,
    pub set: Arc<ValueSet>,
}

/// Per-compilation side table for values that are not written out as literal
/// text.
///
/// Holds the out-of-line scope slots (`scope[n]`) and the cache of registered
/// fragments (`v$n`). Equal values share one slot, so fragments that embed them
/// render identically and deduplicate. Binding names only ever come from the internal counter,
/// so they cannot collide with field names, which are always rendered as
/// quoted accessors.
#[derive(Debug, Default)]
pub struct Context {
    counter: usize,
    declarations: Vec<String>,
    bindings: FxHashMap<String, Binding>,
    per_call: FxHashMap<String, SmolStr>,
    slots: Vec<Arc<Value>>,
    slot_index: FxHashMap<Value, usize>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` out of line and returns its reference text together with
    /// the shared value. A value equal to one already stored reuses its slot.
    pub fn scope(&mut self, value: &Value) -> (String, Arc<Value>) {
        if let Some(&index) = self.slot_index.get(value) {
            return (format!("scope[{index}]"), Arc::clone(&self.slots[index]));
        }

        let index = self.slots.len();
        let shared = Arc::new(value.clone());
        self.slots.push(Arc::clone(&shared));
        self.slot_index.insert(value.clone(), index);

        (format!("scope[{index}]"), shared)
    }

    /// Registers a set-producing fragment, building its value only the first
    /// time an equal fragment is seen.
    pub fn register(&mut self, fragment: String, build: impl FnOnce() -> ValueSet) -> Binding {
        if let Some(binding) = self.bindings.get(&fragment) {
            return binding.clone();
        }

        let name = self.declare(&fragment);
        let binding = Binding {
            name,
            set: Arc::new(build()),
        };
        tracing::trace!(name = %binding.name, fragment = %fragment, size = binding.set.len(), "registered binding");
        self.bindings.insert(fragment, binding.clone());

        binding
    }

    /// Registers a fragment that is evaluated against each record rather than
    /// once, such as a set built from the field being tested.
    pub fn register_per_call(&mut self, fragment: String) -> SmolStr {
        if let Some(name) = self.per_call.get(&fragment) {
            return name.clone();
        }

        let name = self.declare(&fragment);
        self.per_call.insert(fragment, name.clone());
        name
    }

    fn declare(&mut self, fragment: &str) -> SmolStr {
        let name = format_smolstr!("v${}", self.counter);
        self.counter += 1;
        self.declarations.push(format!("const {name} = {fragment};"));
        name
    }

    pub fn declarations(&self) -> usize {
        self.declarations.len()
    }

    pub fn slots(&self) -> usize {
        self.slots.len()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for declaration in &self.declarations {
            writeln!(f, "{declaration}")?;
        }
        Ok(())
    }
}
