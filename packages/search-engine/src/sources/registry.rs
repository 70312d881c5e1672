//! Registered adapters and per-query source selection.

use indexmap::IndexMap;
use std::sync::Arc;

use super::{CraigslistAdapter, DiceAdapter, IndeedAdapter, SimplyHiredAdapter, SourceAdapter, UsaJobsAdapter};
use crate::types::query::{normalize_text, tokenize, QueryType, SearchQuery, SourceId};

/// Keyword vocabulary that pulls the technology board into a search.
pub const TECH_VOCABULARY: &[&str] = &[
    "software",
    "developer",
    "programmer",
    "engineer",
    "devops",
    "sysadmin",
    "it",
    "helpdesk",
    "help desk",
    "network",
    "cloud",
    "data",
    "database",
    "sql",
    "python",
    "java",
    "javascript",
    "web",
    "qa",
    "cybersecurity",
    "computer",
];

/// Keys for adapters that need them.
#[derive(Debug, Clone, Default)]
pub struct SourceKeys {
    pub dice_api_key: Option<String>,
    pub usajobs_api_key: Option<String>,
    /// Contact email sent as the USAJOBS `User-Agent`.
    pub usajobs_user_agent: String,
}

/// Adapters available to the orchestrator, in registration order.
///
/// An adapter registered for a query type takes the place of the general
/// one with the same id when that type is searched.
#[derive(Default, Clone)]
pub struct SourceRegistry {
    adapters: IndexMap<SourceId, Arc<dyn SourceAdapter>>,
    typed: IndexMap<(QueryType, SourceId), Arc<dyn SourceAdapter>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in adapter sharing one HTTP client.
    pub fn with_defaults(client: reqwest::Client, keys: SourceKeys) -> Self {
        Self::new()
            .register(Arc::new(IndeedAdapter::new(client.clone())))
            .register(Arc::new(SimplyHiredAdapter::new(client.clone())))
            .register(Arc::new(DiceAdapter::new(client.clone(), keys.dice_api_key)))
            .register(Arc::new(UsaJobsAdapter::new(
                client.clone(),
                keys.usajobs_api_key,
                keys.usajobs_user_agent,
            )))
            .register(Arc::new(CraigslistAdapter::new(client.clone())))
            .register_for(
                QueryType::Housing,
                Arc::new(CraigslistAdapter::for_query_type(client.clone(), QueryType::Housing)),
            )
            .register_for(
                QueryType::Services,
                Arc::new(CraigslistAdapter::for_query_type(client, QueryType::Services)),
            )
    }

    /// Register an adapter, replacing any previous one with the same id.
    pub fn register(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.adapters.insert(adapter.id(), adapter);
        self
    }

    /// Register an adapter used only for `query_type`.
    pub fn register_for(mut self, query_type: QueryType, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.typed.insert((query_type, adapter.id()), adapter);
        self
    }

    pub fn get(&self, id: SourceId) -> Option<&Arc<dyn SourceAdapter>> {
        self.adapters.get(&id)
    }

    /// The adapter a search of `query_type` would run for `id`.
    pub fn get_for(&self, query_type: QueryType, id: SourceId) -> Option<&Arc<dyn SourceAdapter>> {
        self.typed.get(&(query_type, id)).or_else(|| self.adapters.get(&id))
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Adapters to run for a query.
    ///
    /// Requested sources (or the type's defaults), restricted to what is
    /// registered; the technology board when the keywords look technical; the
    /// catch-all always. No duplicates, deterministic order.
    pub fn select(&self, query: &SearchQuery) -> Vec<Arc<dyn SourceAdapter>> {
        let mut chosen: IndexMap<SourceId, Arc<dyn SourceAdapter>> = IndexMap::new();

        let base: Vec<SourceId> = match query.sources() {
            Some(requested) => requested.iter().copied().collect(),
            None => query.query_type().default_sources().to_vec(),
        };

        let mut wanted = base;
        if is_technical(query.keywords()) {
            wanted.push(SourceId::Dice);
        }
        wanted.push(SourceId::Craigslist);

        for id in wanted {
            if let Some(adapter) = self.get_for(query.query_type(), id) {
                chosen.entry(id).or_insert_with(|| adapter.clone());
            }
        }

        chosen.into_values().collect()
    }
}

/// True when the keywords hit technical-role vocabulary.
pub fn is_technical(keywords: &str) -> bool {
    let tokens = tokenize(keywords);
    let normalized = normalize_text(keywords);
    TECH_VOCABULARY.iter().any(|term| {
        if term.contains(' ') {
            normalized.contains(term)
        } else {
            tokens.iter().any(|t| t == term)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSource;

    fn registry() -> SourceRegistry {
        [
            SourceId::Indeed,
            SourceId::SimplyHired,
            SourceId::Dice,
            SourceId::UsaJobs,
            SourceId::Craigslist,
        ]
        .into_iter()
        .fold(SourceRegistry::new(), |r, id| r.register(Arc::new(MockSource::new(id))))
    }

    fn ids(adapters: &[Arc<dyn SourceAdapter>]) -> Vec<SourceId> {
        adapters.iter().map(|a| a.id()).collect()
    }

    #[test]
    fn test_type_defaults_plus_catch_all() {
        let query = SearchQuery::builder("forklift", QueryType::Jobs).build();
        assert_eq!(
            ids(&registry().select(&query)),
            vec![SourceId::Indeed, SourceId::SimplyHired, SourceId::UsaJobs, SourceId::Craigslist]
        );
    }

    #[test]
    fn test_technical_keywords_add_dice() {
        let query = SearchQuery::builder("Help Desk technician", QueryType::Jobs).build();
        assert!(ids(&registry().select(&query)).contains(&SourceId::Dice));

        let query = SearchQuery::builder("python developer", QueryType::General).build();
        assert_eq!(
            ids(&registry().select(&query)),
            vec![SourceId::Indeed, SourceId::Dice, SourceId::Craigslist]
        );
    }

    #[test]
    fn test_requested_sources_are_restricted_to_registered() {
        let registry = SourceRegistry::new()
            .register(Arc::new(MockSource::new(SourceId::Indeed)))
            .register(Arc::new(MockSource::new(SourceId::Craigslist)));
        let query = SearchQuery::builder("cook", QueryType::Jobs)
            .sources([SourceId::UsaJobs, SourceId::Indeed, SourceId::Craigslist])
            .build();

        assert_eq!(
            ids(&registry.select(&query)),
            vec![SourceId::Indeed, SourceId::Craigslist]
        );
    }

    #[test]
    fn test_catch_all_only_when_registered() {
        let registry = SourceRegistry::new().register(Arc::new(MockSource::new(SourceId::Indeed)));
        let query = SearchQuery::builder("cook", QueryType::Housing).build();
        assert!(registry.select(&query).is_empty());
    }

    #[test]
    fn test_typed_adapter_replaces_general_one() {
        let registry = registry().register_for(
            QueryType::Housing,
            Arc::new(MockSource::new(SourceId::Craigslist).with_site("housing.craigslist.test")),
        );

        let housing = registry.select(&SearchQuery::builder("room", QueryType::Housing).build());
        assert_eq!(ids(&housing), vec![SourceId::Craigslist]);
        assert_eq!(housing[0].site(), "housing.craigslist.test");

        let jobs = registry.select(&SearchQuery::builder("cook", QueryType::Jobs).build());
        let craigslist = jobs.iter().find(|a| a.id() == SourceId::Craigslist).unwrap();
        assert_ne!(craigslist.site(), "housing.craigslist.test");
    }

    #[test]
    fn test_defaults_register_craigslist_per_type() {
        let registry = SourceRegistry::with_defaults(reqwest::Client::new(), SourceKeys::default());
        let general = registry.get(SourceId::Craigslist).unwrap();

        let housing = registry.get_for(QueryType::Housing, SourceId::Craigslist).unwrap();
        let services = registry.get_for(QueryType::Services, SourceId::Craigslist).unwrap();
        let jobs = registry.get_for(QueryType::Jobs, SourceId::Craigslist).unwrap();

        assert!(!Arc::ptr_eq(housing, general));
        assert!(!Arc::ptr_eq(services, general));
        assert!(!Arc::ptr_eq(housing, services));
        assert!(Arc::ptr_eq(jobs, general));
        assert_eq!(housing.site(), "craigslist.org");
    }

    #[test]
    fn test_is_technical() {
        assert!(is_technical("IT support"));
        assert!(is_technical("junior web developer"));
        assert!(!is_technical("warehouse associate"));
        assert!(!is_technical("kitchen"));
    }
}
