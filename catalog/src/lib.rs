pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod guard;
pub mod metrics_defs;
pub mod model;
pub mod resource_id;
pub mod roster;
pub mod upstream;
pub mod users;

#[cfg(test)]
mod testutils;

use api::{AppState, CatalogApiError};
use cache::MemoryCacheStore;
use catalog::Catalog;
use config::{Config, ValidationError};
use errors::CatalogError;
use roster::RosterEntry;
use std::sync::Arc;
use upstream::UpstreamClient;
use users::StaticUserRepository;

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),
    #[error("could not build upstream client: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    Api(#[from] CatalogApiError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Validates `config` and wires the catalog and user repository it describes.
pub fn build_state(config: &Config) -> Result<AppState, RunError> {
    config.validate()?;

    let client = UpstreamClient::new(&config.upstream)?;
    let cache = Arc::new(MemoryCacheStore::new(config.cache.max_capacity));
    let catalog = Catalog::new(client, cache, config.cache.ttl());
    let users = Arc::new(StaticUserRepository::new(&config.users));

    Ok(AppState { catalog, users })
}

pub async fn run(config: Config) -> Result<(), RunError> {
    let state = build_state(&config)?;
    tracing::info!(
        upstream = %config.upstream.url,
        users = config.users.len(),
        "Starting catalog"
    );
    api::serve(config.listener, state).await?;
    Ok(())
}

pub async fn list_users(config: &Config) -> Result<Vec<RosterEntry>, RunError> {
    let state = build_state(config)?;
    Ok(roster::list_registered_users(&state.catalog, state.users.as_ref()).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{MockResponse, MockUpstream, person_payload};
    use crate::users::test_users;

    fn config(upstream: &MockUpstream) -> Config {
        Config {
            listener: Default::default(),
            upstream: upstream.upstream_config(),
            cache: Default::default(),
            users: test_users(),
        }
    }

    #[tokio::test]
    async fn test_list_users() {
        let upstream = MockUpstream::spawn(vec![
            ("people/1", MockResponse::ok(person_payload(1, "Luke Skywalker", &[], &[]))),
            ("people/5", MockResponse::ok(person_payload(5, "Leia Organa", &[], &[]))),
            ("people/10", MockResponse::ok(person_payload(10, "Obi-Wan Kenobi", &[], &[]))),
        ])
        .await;

        let roster = list_users(&config(&upstream)).await.unwrap();
        let heroes: Vec<_> = roster.iter().map(|e| e.hero_name.as_str()).collect();
        assert_eq!(heroes, vec!["Luke Skywalker", "Leia Organa", "Obi-Wan Kenobi"]);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let upstream = MockUpstream::spawn(Vec::<(&str, MockResponse)>::new()).await;
        let mut config = config(&upstream);
        config.cache.ttl_secs = 0;

        assert!(matches!(
            build_state(&config),
            Err(RunError::Validation(ValidationError::InvalidTtl))
        ));
        assert_eq!(upstream.total_hits(), 0);
    }
}
