use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::Url;

use crate::cache::MemoryCacheStore;
use crate::catalog::Catalog;
use crate::config::Upstream;
use crate::upstream::UpstreamClient;

#[derive(Clone)]
pub struct MockResponse {
    status: StatusCode,
    body: String,
}

impl MockResponse {
    pub fn json(status: StatusCode, body: Value) -> Self {
        MockResponse {
            status,
            body: body.to_string(),
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::json(StatusCode::OK, body)
    }

    pub fn raw(status: StatusCode, body: &str) -> Self {
        MockResponse {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Clone)]
struct MockState {
    responses: Arc<HashMap<String, MockResponse>>,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

/// Fake Star Wars API served from `127.0.0.1` on a random port. Responses are keyed
/// by the path below `/api/`, without slashes at either end, plus the query string,
/// e.g. `people/1` or `people?page=2`. Unknown keys get the upstream's 404 body.
pub struct MockUpstream {
    pub base_url: Url,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockUpstream {
    pub async fn spawn<K: Into<String>>(responses: Vec<(K, MockResponse)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let hits = Arc::new(Mutex::new(HashMap::new()));
        let state = MockState {
            responses: Arc::new(
                responses
                    .into_iter()
                    .map(|(key, response)| (key.into(), response))
                    .collect(),
            ),
            hits: hits.clone(),
        };

        let app = Router::new().fallback(respond).with_state(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockUpstream {
            base_url: Url::parse(&format!("http://{addr}/api/")).unwrap(),
            hits,
        }
    }

    pub fn hits(&self, key: &str) -> usize {
        self.hits.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    pub fn upstream_config(&self) -> Upstream {
        Upstream {
            url: self.base_url.clone(),
            timeout_secs: 5,
            connect_timeout_secs: 5,
        }
    }

    pub fn client(&self) -> UpstreamClient {
        UpstreamClient::new(&self.upstream_config()).unwrap()
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(
            self.client(),
            Arc::new(MemoryCacheStore::new(1000)),
            std::time::Duration::from_secs(60),
        )
    }
}

async fn respond(State(state): State<MockState>, uri: Uri) -> Response {
    let path = uri
        .path()
        .trim_start_matches("/api/")
        .trim_matches('/')
        .to_string();
    let key = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };

    *state.hits.lock().unwrap().entry(key.clone()).or_default() += 1;

    match state.responses.get(&key) {
        Some(response) => (
            response.status,
            [(header::CONTENT_TYPE, "application/json")],
            response.body.clone(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            json!({"detail": "Not found"}).to_string(),
        )
            .into_response(),
    }
}

pub fn swapi_url(collection: &str, id: u64) -> String {
    format!("https://swapi.dev/api/{collection}/{id}/")
}

/// A person payload as upstream returns it from `people/<id>`: no `id`, relations as
/// URL lists.
pub fn person_payload(id: u64, name: &str, films: &[u64], starships: &[u64]) -> Value {
    json!({
        "name": name,
        "height": "172",
        "homeworld": swapi_url("planets", 1),
        "films": films.iter().map(|f| swapi_url("films", *f)).collect::<Vec<_>>(),
        "species": [],
        "vehicles": [swapi_url("vehicles", 14), swapi_url("vehicles", 30)],
        "starships": starships.iter().map(|s| swapi_url("starships", *s)).collect::<Vec<_>>(),
        "url": swapi_url("people", id),
    })
}

pub fn film_payload(id: u64, title: &str) -> Value {
    json!({
        "title": title,
        "episode_id": id + 3,
        "url": swapi_url("films", id),
    })
}
