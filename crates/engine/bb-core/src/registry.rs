//! Module registry
//!
//! Ordered set of named modules. Registration order is pass order.

use crate::error::RegistryError;
use crate::module::BehaviorModule;

struct Entry {
    name: String,
    module: Box<dyn BehaviorModule>,
}

#[derive(Default)]
pub struct ModuleRegistry {
    entries: Vec<Entry>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module under a unique name
    pub fn register(&mut self, name: &str, module: Box<dyn BehaviorModule>) -> Result<(), RegistryError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if self.contains(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        tracing::debug!("Registered module {} at position {}", name, self.entries.len());
        self.entries.push(Entry {
            name: name.to_string(),
            module,
        });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn BehaviorModule> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.module.as_ref())
    }

    /// Names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn BehaviorModule)> {
        self.entries.iter().map(|e| (e.name.as_str(), e.module.as_ref()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Box<dyn BehaviorModule>)> {
        self.entries.iter_mut().map(|e| (e.name.as_str(), &mut e.module))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModuleError;
    use crate::module::ModuleContext;
    use bb_dom::NodeId;

    struct Noop;

    impl BehaviorModule for Noop {
        fn apply(&mut self, _cx: &mut ModuleContext<'_>, _scope: NodeId) -> Result<(), ModuleError> {
            Ok(())
        }
    }

    #[test]
    fn test_order_and_duplicates() {
        let mut registry = ModuleRegistry::new();
        registry.register("share", Box::new(Noop)).unwrap();
        registry.register("marquee", Box::new(Noop)).unwrap();

        assert_eq!(
            registry.register("share", Box::new(Noop)),
            Err(RegistryError::Duplicate("share".into()))
        );
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["share", "marquee"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_invalid_name() {
        let mut registry = ModuleRegistry::new();
        assert!(matches!(registry.register("", Box::new(Noop)), Err(RegistryError::InvalidName(_))));
        assert!(matches!(registry.register("a b", Box::new(Noop)), Err(RegistryError::InvalidName(_))));
        assert!(registry.is_empty());
    }
}
