//! Read-through cache over the upstream API.
//!
//! Every read checks the cache store first and only goes upstream on a miss. Whatever
//! is fetched is normalized once and written back whole with the configured TTL; a
//! present entry is never revalidated. Two concurrent misses on the same key both
//! fetch and both write equivalent values, which is harmless.
use crate::cache::CacheStore;
use crate::errors::CatalogError;
use crate::metrics_defs::{CACHE_HIT, CACHE_MISS, PEOPLE_PAGES_FETCHED};
use crate::model::{Person, Relation, Resource, ResourceKind};
use crate::resource_id::id_from_url;
use crate::upstream::UpstreamClient;
use rand::seq::SliceRandom;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{counter, histogram};
use std::sync::Arc;
use std::time::Duration;

const PEOPLE_CACHE_KEY: &str = "people";
const PEOPLE_FALLBACK: &str = "Something went wrong during people request.";
const PERSON_FALLBACK: &str = "Something went wrong during person request.";

/// One page of an upstream collection. A page with null `results` contributes nothing.
#[derive(serde::Deserialize)]
struct Page {
    #[serde(default)]
    results: Option<Vec<Value>>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Clone)]
pub struct Catalog {
    client: UpstreamClient,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl Catalog {
    pub fn new(client: UpstreamClient, cache: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Catalog { client, cache, ttl }
    }

    /// Every person upstream knows about, in upstream order. Entries carry their `id`
    /// but their relations are not normalized.
    pub async fn get_people(&self) -> Result<Vec<Person>, CatalogError> {
        if let Some(people) = self.cached(PEOPLE_CACHE_KEY) {
            return Ok(people);
        }

        let mut people = Vec::new();
        let mut page_number: u32 = 1;

        loop {
            let value = self
                .client
                .get("people", &[("page", page_number.to_string())], PEOPLE_FALLBACK)
                .await?;
            let page: Page = decode(value, PEOPLE_FALLBACK)?;

            for result in page.results.unwrap_or_default() {
                let Some(url) = result.get("url").and_then(Value::as_str) else {
                    continue;
                };
                let id = id_from_url(url)
                    .map_err(|e| CatalogError::malformed(PEOPLE_FALLBACK, e))?;
                let person = with_id(result, id, PEOPLE_FALLBACK)?;
                people.push(decode(person, PEOPLE_FALLBACK)?);
            }

            if page.next.is_none() {
                break;
            }
            page_number += 1;
        }

        histogram!(PEOPLE_PAGES_FETCHED).record(page_number as f64);
        tracing::info!(
            pages = page_number,
            people = people.len(),
            "Fetched people listing from upstream"
        );

        self.store(PEOPLE_CACHE_KEY, &people);
        Ok(people)
    }

    /// A person with every relation present upstream resolved into `<relation>_ids`.
    pub async fn get_person_by_id(&self, person_id: u64) -> Result<Person, CatalogError> {
        let key = format!("person.{person_id}");
        if let Some(person) = self.cached(&key) {
            return Ok(person);
        }

        let value = self
            .client
            .get(&format!("people/{person_id}"), &[], PERSON_FALLBACK)
            .await?;
        let mut person: Person =
            decode(with_id(value, person_id, PERSON_FALLBACK)?, PERSON_FALLBACK)?;
        normalize_relations(&mut person)?;

        self.store(&key, &person);
        Ok(person)
    }

    pub async fn get_film_by_id(&self, film_id: u64) -> Result<Resource, CatalogError> {
        self.get_resource(ResourceKind::Films, film_id).await
    }

    pub async fn get_specie_by_id(&self, specie_id: u64) -> Result<Resource, CatalogError> {
        self.get_resource(ResourceKind::Species, specie_id).await
    }

    pub async fn get_vehicle_by_id(&self, vehicle_id: u64) -> Result<Resource, CatalogError> {
        self.get_resource(ResourceKind::Vehicles, vehicle_id).await
    }

    pub async fn get_starship_by_id(&self, starship_id: u64) -> Result<Resource, CatalogError> {
        self.get_resource(ResourceKind::Starships, starship_id).await
    }

    /// Fetches a film, species, vehicle or starship verbatim.
    pub async fn get_resource(
        &self,
        kind: ResourceKind,
        id: u64,
    ) -> Result<Resource, CatalogError> {
        let key = kind.cache_key(id);
        if let Some(resource) = self.cached(&key) {
            return Ok(resource);
        }

        let fallback = kind.fallback_message();
        let value = self
            .client
            .get(&format!("{}/{id}", kind.path()), &[], fallback)
            .await?;
        let resource: Resource = decode(with_id(value, id, fallback)?, fallback)?;

        self.store(&key, &resource);
        Ok(resource)
    }

    /// Every `kind` sub-resource linked to the person, in the person's relation order.
    pub async fn get_person_resources(
        &self,
        person_id: u64,
        kind: ResourceKind,
    ) -> Result<Vec<Resource>, CatalogError> {
        let person = self.get_person_by_id(person_id).await?;
        let ids = person.relations.ids(kind.relation());

        let mut resources = Vec::with_capacity(ids.len());
        for id in ids {
            resources.push(self.get_resource(kind, *id).await?);
        }

        Ok(resources)
    }

    /// A uniformly random entry of the people listing, re-rolled on every call.
    /// `None` when upstream has no people at all.
    pub async fn get_random_person(&self) -> Result<Option<Person>, CatalogError> {
        let people = self.get_people().await?;
        Ok(people.choose(&mut rand::thread_rng()).cloned())
    }

    fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.cache.get(key);
        let Some(value) = value else {
            counter!(CACHE_MISS).increment(1);
            tracing::debug!(key, "Cache miss");
            return None;
        };

        match serde_json::from_value(value) {
            Ok(entity) => {
                counter!(CACHE_HIT).increment(1);
                tracing::debug!(key, "Cache hit");
                Some(entity)
            }
            Err(e) => {
                counter!(CACHE_MISS).increment(1);
                tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    fn store<T: Serialize>(&self, key: &str, entity: &T) {
        match serde_json::to_value(entity) {
            Ok(value) => self.cache.put(key, value, self.ttl),
            Err(e) => tracing::warn!(key, error = %e, "Could not encode cache entry"),
        }
    }
}

/// Resolves each relation URL list present on the person into its ID list.
fn normalize_relations(person: &mut Person) -> Result<(), CatalogError> {
    for relation in Relation::ALL {
        let Some(urls) = person.relations.urls(relation) else {
            continue;
        };
        let ids = urls
            .iter()
            .map(|url| id_from_url(url))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CatalogError::malformed(PERSON_FALLBACK, e))?;
        person.relations.set_ids(relation, ids);
    }
    Ok(())
}

/// Sets `id` on an upstream object, which does not carry one itself.
fn with_id(value: Value, id: u64, fallback: &str) -> Result<Value, CatalogError> {
    let Value::Object(mut object) = value else {
        tracing::error!(id, "Upstream returned a non-object entity");
        return Err(CatalogError::UpstreamRequestFailed(fallback.to_string()));
    };
    object.insert("id".to_string(), Value::from(id));
    Ok(Value::Object(object))
}

fn decode<T: DeserializeOwned>(value: Value, fallback: &str) -> Result<T, CatalogError> {
    serde_json::from_value(value).map_err(|e| {
        tracing::error!(error = %e, "Upstream payload has an unexpected shape");
        CatalogError::UpstreamRequestFailed(fallback.to_string())
    })
}
