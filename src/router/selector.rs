//! Candidate ordering.

use std::sync::Arc;

use crate::config::Config;
use crate::providers::{build_providers, TextProvider};

/// Providers to try for one request.
pub enum Candidates {
    /// Caller pinned a usable provider; nothing else is tried.
    Pinned(Arc<dyn TextProvider>),
    /// Usable providers in priority order (possibly empty).
    Ordered(Vec<Arc<dyn TextProvider>>),
}

impl Candidates {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Candidates::Pinned(p) => vec![p.name()],
            Candidates::Ordered(list) => list.iter().map(|p| p.name()).collect(),
        }
    }
}

/// Router over an immutable provider list.
#[derive(Clone)]
pub struct Router {
    /// All providers, already in priority order.
    providers: Vec<Arc<dyn TextProvider>>,
}

impl Router {
    /// Create a router, ordering `providers` by `priority`.
    ///
    /// Providers named in `priority` come first in that order; the rest follow
    /// in the order given.
    pub fn new(providers: Vec<Arc<dyn TextProvider>>, priority: &[String]) -> Self {
        let rank = |p: &Arc<dyn TextProvider>| {
            priority
                .iter()
                .position(|name| name == p.name())
                .unwrap_or(priority.len())
        };
        let mut providers = providers;
        // Stable sort keeps configuration order among unranked providers.
        providers.sort_by_key(rank);
        Self { providers }
    }

    /// Build adapters for every configured provider and order them.
    pub fn from_config(config: &Config, client: &reqwest::Client) -> Self {
        Self::new(build_providers(config, client), &config.routing.priority)
    }

    /// All providers in priority order, usable or not.
    pub fn providers(&self) -> &[Arc<dyn TextProvider>] {
        &self.providers
    }

    /// Determine which providers to try.
    ///
    /// A preferred provider pins the request only when it is configured with a
    /// credential; otherwise the preference is ignored.
    pub fn candidates(&self, preferred: Option<&str>) -> Candidates {
        if let Some(name) = preferred.map(str::trim).filter(|n| !n.is_empty()) {
            match self.providers.iter().find(|p| p.name() == name) {
                Some(p) if p.has_credential() => {
                    tracing::debug!(provider = %name, "Pinned preferred provider");
                    return Candidates::Pinned(p.clone());
                }
                Some(_) => {
                    tracing::debug!(provider = %name, "Preferred provider has no credential, using priority order");
                }
                None => {
                    tracing::debug!(provider = %name, "Unknown preferred provider, using priority order");
                }
            }
        }

        Candidates::Ordered(
            self.providers
                .iter()
                .filter(|p| p.has_credential())
                .cloned()
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::mock::MockProvider;

    fn providers() -> Vec<Arc<dyn TextProvider>> {
        vec![
            MockProvider::ok("openai", "a").arc(),
            MockProvider::ok("anthropic", "b").arc(),
            MockProvider::ok("deepseek", "c").without_credential().arc(),
            MockProvider::ok("groq", "d").arc(),
        ]
    }

    #[test]
    fn test_priority_order_then_configuration_order() {
        let router = Router::new(providers(), &["anthropic".to_string()]);
        let names: Vec<&str> = router.providers().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["anthropic", "openai", "deepseek", "groq"]);
    }

    #[test]
    fn test_ordered_candidates_skip_missing_credentials() {
        let router = Router::new(
            providers(),
            &["deepseek".to_string(), "groq".to_string()],
        );
        let candidates = router.candidates(None);
        assert!(matches!(candidates, Candidates::Ordered(_)));
        assert_eq!(candidates.names(), vec!["groq", "openai", "anthropic"]);
    }

    #[test]
    fn test_preferred_provider_is_pinned() {
        let router = Router::new(providers(), &[]);
        let candidates = router.candidates(Some("anthropic"));
        assert!(matches!(candidates, Candidates::Pinned(_)));
        assert_eq!(candidates.names(), vec!["anthropic"]);
    }

    #[test]
    fn test_preferred_without_credential_falls_back_to_priority() {
        let router = Router::new(providers(), &[]);
        let candidates = router.candidates(Some("deepseek"));
        assert!(matches!(candidates, Candidates::Ordered(_)));
        assert_eq!(candidates.names(), vec!["openai", "anthropic", "groq"]);
    }

    #[test]
    fn test_unknown_or_blank_preference_is_ignored() {
        let router = Router::new(providers(), &[]);
        assert!(matches!(
            router.candidates(Some("mistral")),
            Candidates::Ordered(_)
        ));
        assert!(matches!(router.candidates(Some("  ")), Candidates::Ordered(_)));
    }

    #[test]
    fn test_no_credentials_yields_empty_candidates() {
        let router = Router::new(
            vec![MockProvider::ok("openai", "a").without_credential().arc()],
            &[],
        );
        assert!(router.candidates(None).names().is_empty());
    }
}
