//! Generator registry
//!
//! Organization keys resolve by exact match after case normalization. There
//! is no fuzzy matching and no fallback stack.

use super::{
    DotnetServiceGenerator, GoServiceGenerator, JavaGradleGenerator, JavaMavenGenerator,
    NodeServiceGenerator, PythonApiGenerator, RustServiceGenerator, StackGenerator, StackId,
    SwiftPackageGenerator,
};
use crate::config::normalize_org_key;
use crate::error::FatalError;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Stacks enabled for each supported organization
const DEFAULT_ORGANIZATIONS: &[(&str, &[StackId])] = &[
    ("GOOGLE", &[StackId::GoService, StackId::PythonApi]),
    ("AMAZON", &[StackId::JavaMaven]),
    ("MICROSOFT", &[StackId::DotnetService, StackId::NodeService]),
    ("META", &[StackId::PythonApi, StackId::NodeService]),
    ("NETFLIX", &[StackId::JavaGradle, StackId::NodeService]),
    ("APPLE", &[StackId::SwiftPackage]),
    ("UBER", &[StackId::GoService, StackId::JavaGradle]),
    ("SPOTIFY", &[StackId::PythonApi, StackId::JavaMaven]),
    ("MOZILLA", &[StackId::RustService]),
];

/// Resolved organization with the strategies to run, in order
#[derive(Clone)]
pub struct GenerationTask {
    pub org_key: String,
    pub strategies: Vec<Arc<dyn StackGenerator>>,
}

impl GenerationTask {
    pub fn stacks(&self) -> Vec<StackId> {
        self.strategies.iter().map(|s| s.id()).collect()
    }
}

impl std::fmt::Debug for GenerationTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationTask")
            .field("org_key", &self.org_key)
            .field("stacks", &self.stacks())
            .finish()
    }
}

#[derive(Clone)]
pub struct GeneratorRegistry {
    generators: HashMap<StackId, Arc<dyn StackGenerator>>,
    organizations: BTreeMap<String, Vec<StackId>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self {
            generators: HashMap::new(),
            organizations: BTreeMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_generator(Arc::new(GoServiceGenerator));
        registry.register_generator(Arc::new(PythonApiGenerator));
        registry.register_generator(Arc::new(JavaMavenGenerator));
        registry.register_generator(Arc::new(JavaGradleGenerator));
        registry.register_generator(Arc::new(NodeServiceGenerator));
        registry.register_generator(Arc::new(DotnetServiceGenerator));
        registry.register_generator(Arc::new(SwiftPackageGenerator));
        registry.register_generator(Arc::new(RustServiceGenerator));

        for (key, stacks) in DEFAULT_ORGANIZATIONS {
            registry.register_organization(key, stacks.iter().copied());
        }
        registry
    }

    pub fn register_generator(&mut self, generator: Arc<dyn StackGenerator>) {
        self.generators.insert(generator.id(), generator);
    }

    /// Adds or replaces an organization entry; the key is normalized
    pub fn register_organization(
        &mut self,
        organization: &str,
        stacks: impl IntoIterator<Item = StackId>,
    ) {
        self.organizations
            .insert(normalize_org_key(organization), stacks.into_iter().collect());
    }

    /// Resolves an organization (any case) into its generation task
    pub fn resolve(&self, organization: &str) -> Result<GenerationTask, FatalError> {
        let key = normalize_org_key(organization);
        let stacks = self
            .organizations
            .get(&key)
            .ok_or_else(|| FatalError::UnsupportedOrganization {
                name: organization.to_string(),
                supported: self.organizations(),
            })?;

        let strategies = stacks
            .iter()
            .map(|stack| {
                self.generators
                    .get(stack)
                    .cloned()
                    .ok_or_else(|| FatalError::MissingGenerator {
                        organization: key.clone(),
                        stack: stack.slug().to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GenerationTask {
            org_key: key,
            strategies,
        })
    }

    /// Supported organization keys, sorted
    pub fn organizations(&self) -> Vec<String> {
        self.organizations.keys().cloned().collect()
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_key_resolves_in_any_case() {
        let registry = GeneratorRegistry::with_defaults();
        for key in registry.organizations() {
            for variant in [key.clone(), key.to_lowercase(), capitalize(&key)] {
                let task = registry.resolve(&variant).unwrap();
                assert_eq!(task.org_key, key);
                assert!(!task.strategies.is_empty(), "{} resolved to no stacks", key);
            }
        }
    }

    #[test]
    fn test_google_stacks_in_order() {
        let registry = GeneratorRegistry::with_defaults();
        let task = registry.resolve("Google").unwrap();
        assert_eq!(task.stacks(), vec![StackId::GoService, StackId::PythonApi]);
    }

    #[test]
    fn test_unknown_organization_is_fatal() {
        let registry = GeneratorRegistry::with_defaults();
        let err = registry.resolve("Nonexistent").unwrap_err();

        match &err {
            FatalError::UnsupportedOrganization { name, supported } => {
                assert_eq!(name, "Nonexistent");
                assert!(supported.contains(&"GOOGLE".to_string()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("Nonexistent"));
    }

    #[test]
    fn test_no_prefix_matching() {
        let registry = GeneratorRegistry::with_defaults();
        assert!(registry.resolve("Goog").is_err());
        assert!(registry.resolve("GoogleX").is_err());
        assert!(registry.resolve("").is_err());
    }

    #[test]
    fn test_registering_organization_needs_no_new_code() {
        let mut registry = GeneratorRegistry::with_defaults();
        registry.register_organization("Initech", [StackId::RustService, StackId::GoService]);

        let task = registry.resolve("INITECH").unwrap();
        assert_eq!(task.stacks(), vec![StackId::RustService, StackId::GoService]);
    }

    #[test]
    fn test_missing_generator_is_fatal() {
        let mut registry = GeneratorRegistry::new();
        registry.register_organization("Acme", [StackId::SwiftPackage]);

        let err = registry.resolve("acme").unwrap_err();
        assert!(matches!(err, FatalError::MissingGenerator { .. }));
    }

    fn capitalize(key: &str) -> String {
        let lower = key.to_lowercase();
        let mut chars = lower.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
