use log::{debug, info, warn};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{sleep, timeout};

use crate::builder::MealDbClientBuilder;
use crate::cache::ApiCache;
use crate::fallback::fallback_meal;
use crate::model::{CategoriesEnvelope, Category, Meal, MealPreview, MealsEnvelope};
use crate::transport::Transport;
use crate::ApiError;

/// Where a value handed back by the client came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Fresh response from the remote service
    Network,
    /// Served from the response cache without a request
    Cache,
    /// All attempts failed; the built-in substitute was returned
    Fallback,
    /// The input short-circuited before any lookup (e.g. a blank search)
    Skipped,
}

impl Source {
    /// Provenance of a value assembled from several lookups.
    ///
    /// Any fallback taints the whole result, then any network response,
    /// then cache; `Skipped` is neutral.
    pub fn combine(self, other: Source) -> Source {
        use Source::*;
        match (self, other) {
            (Fallback, _) | (_, Fallback) => Fallback,
            (Network, _) | (_, Network) => Network,
            (Cache, _) | (_, Cache) => Cache,
            (Skipped, Skipped) => Skipped,
        }
    }
}

/// A query result tagged with its [`Source`].
///
/// Derefs to the value, so callers that do not care about provenance can
/// use it directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Fetched<T> {
    pub fn new(value: T, source: Source) -> Self {
        Self { value, source }
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    /// True when the value is the built-in substitute, not real data.
    pub fn is_fallback(&self) -> bool {
        self.source == Source::Fallback
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            value: f(self.value),
            source: self.source,
        }
    }
}

impl<T> Deref for Fetched<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

/// Attempt budget, per-attempt timeout and linear backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, at least one is always made
    pub max_attempts: u32,
    /// Delay before the second attempt; grows linearly afterwards
    pub base_delay: Duration,
    /// Each attempt is abandoned once this elapses
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Wait after the failed attempt at `attempt_index` (0-based).
    pub fn backoff(&self, attempt_index: u32) -> Duration {
        self.base_delay * (attempt_index + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Endpoint {
    Random,
    Search(String),
    ByIngredient(String),
    ByCategory(String),
    Lookup(String),
    Categories,
}

impl Endpoint {
    fn path(&self) -> &'static str {
        match self {
            Endpoint::Random => "random.php",
            Endpoint::Search(_) => "search.php",
            Endpoint::ByIngredient(_) | Endpoint::ByCategory(_) => "filter.php",
            Endpoint::Lookup(_) => "lookup.php",
            Endpoint::Categories => "categories.php",
        }
    }

    fn query(&self) -> Option<(&'static str, &str)> {
        match self {
            Endpoint::Search(name) => Some(("s", name.as_str())),
            Endpoint::ByIngredient(ingredient) => Some(("i", ingredient.as_str())),
            Endpoint::ByCategory(category) => Some(("c", category.as_str())),
            Endpoint::Lookup(id) => Some(("i", id.as_str())),
            Endpoint::Random | Endpoint::Categories => None,
        }
    }

    /// `None` means the endpoint must never be cached.
    fn cache_key(&self) -> Option<String> {
        match self {
            Endpoint::Random => None,
            Endpoint::Search(name) => Some(format!("search:{}", normalize(name))),
            Endpoint::ByIngredient(ingredient) => {
                Some(format!("ingredient:{}", normalize(ingredient)))
            }
            Endpoint::ByCategory(category) => Some(format!("category:{}", normalize(category))),
            Endpoint::Lookup(id) => Some(format!("meal:{}", id.trim())),
            Endpoint::Categories => Some("categories".to_string()),
        }
    }
}

fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Client for the TheMealDB JSON API.
///
/// Query methods never fail: network errors, timeouts and bad statuses are
/// retried according to the [`RetryPolicy`] and then replaced by a fallback
/// value. Inspect [`Fetched::source`] to tell real results from fallbacks.
///
/// Cloning is cheap; clones share the transport and the cache.
#[derive(Clone)]
pub struct MealDbClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    cache: Arc<ApiCache>,
    policy: RetryPolicy,
}

impl MealDbClient {
    /// Client with default configuration against the public API.
    pub fn new() -> Result<Self, ApiError> {
        Self::builder().build()
    }

    pub fn builder() -> MealDbClientBuilder {
        MealDbClientBuilder::default()
    }

    pub(crate) fn from_parts(
        base_url: String,
        transport: Arc<dyn Transport>,
        cache: Arc<ApiCache>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            base_url,
            transport,
            cache,
            policy,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &Arc<ApiCache> {
        &self.cache
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// A random meal for the "recipe of the day" slot.
    ///
    /// Never cached. Falls back to the built-in meal when the service is
    /// unreachable or answers without a meal.
    pub async fn random_meal(&self) -> Fetched<Meal> {
        let fetched = self
            .fetch(&Endpoint::Random, MealsEnvelope::<Meal> { meals: None })
            .await;
        let source = fetched.source;

        match fetched.into_inner().into_first() {
            Some(meal) => Fetched::new(meal, source),
            None => Fetched::new(fallback_meal(), Source::Fallback),
        }
    }

    /// Meals whose name matches `query`. Blank queries return an empty list
    /// without touching the network.
    pub async fn search_meal_by_name(&self, query: &str) -> Fetched<Vec<MealPreview>> {
        let query = query.trim();
        if query.is_empty() {
            return Fetched::new(Vec::new(), Source::Skipped);
        }

        self.fetch(
            &Endpoint::Search(query.to_string()),
            MealsEnvelope::<Meal> { meals: None },
        )
        .await
        .map(|envelope| envelope.into_vec().iter().map(Meal::preview).collect())
    }

    pub async fn filter_by_ingredient(&self, ingredient: &str) -> Fetched<Vec<MealPreview>> {
        self.fetch(
            &Endpoint::ByIngredient(ingredient.trim().to_string()),
            MealsEnvelope::<MealPreview> { meals: None },
        )
        .await
        .map(MealsEnvelope::into_vec)
    }

    pub async fn filter_by_category(&self, category: &str) -> Fetched<Vec<MealPreview>> {
        self.fetch(
            &Endpoint::ByCategory(category.trim().to_string()),
            MealsEnvelope::<MealPreview> { meals: None },
        )
        .await
        .map(MealsEnvelope::into_vec)
    }

    /// Pantry search: meals that appear in the results of every ingredient.
    ///
    /// The service only filters by one ingredient at a time, so each one is
    /// queried separately (through the cache) and the lists are intersected
    /// by meal id, keeping the order of the first ingredient's results.
    pub async fn filter_by_ingredients<S: AsRef<str>>(
        &self,
        ingredients: &[S],
    ) -> Fetched<Vec<MealPreview>> {
        let mut ingredients = ingredients
            .iter()
            .map(|i| i.as_ref().trim())
            .filter(|i| !i.is_empty());

        let Some(first) = ingredients.next() else {
            return Fetched::new(Vec::new(), Source::Skipped);
        };

        let Fetched {
            value: mut matches,
            mut source,
        } = self.filter_by_ingredient(first).await;

        for ingredient in ingredients {
            if matches.is_empty() {
                break;
            }
            let fetched = self.filter_by_ingredient(ingredient).await;
            source = source.combine(fetched.source);
            let ids: HashSet<&str> = fetched.value.iter().map(|m| m.id.as_str()).collect();
            matches.retain(|m| ids.contains(m.id.as_str()));
        }

        debug!("Pantry search matched {} meals", matches.len());
        Fetched::new(matches, source)
    }

    /// Full record for `id`, or `None` if the service has no such meal or
    /// could not be reached.
    pub async fn meal_details(&self, id: &str) -> Fetched<Option<Meal>> {
        self.fetch(
            &Endpoint::Lookup(id.trim().to_string()),
            MealsEnvelope::<Meal> { meals: None },
        )
        .await
        .map(MealsEnvelope::into_first)
    }

    /// Previews for a list of favorited ids, resolved concurrently.
    ///
    /// Input order is kept; ids that resolve to no meal are dropped.
    pub async fn favorite_previews(&self, ids: &[String]) -> Fetched<Vec<MealPreview>> {
        if ids.is_empty() {
            return Fetched::new(Vec::new(), Source::Skipped);
        }

        let mut tasks = JoinSet::new();
        for (index, id) in ids.iter().enumerate() {
            let client = self.clone();
            let id = id.clone();
            tasks.spawn(async move { (index, client.meal_details(&id).await) });
        }

        let mut resolved: Vec<Option<Fetched<Option<Meal>>>> =
            (0..ids.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, fetched)) => resolved[index] = Some(fetched),
                Err(e) => warn!("Favorite lookup task failed: {}", e),
            }
        }

        let mut source = Source::Skipped;
        let previews = resolved
            .into_iter()
            .flatten()
            .filter_map(|fetched| {
                source = source.combine(fetched.source);
                fetched.value.as_ref().map(Meal::preview)
            })
            .collect();

        Fetched::new(previews, source)
    }

    pub async fn categories(&self) -> Fetched<Vec<Category>> {
        self.fetch(
            &Endpoint::Categories,
            CategoriesEnvelope { categories: None },
        )
        .await
        .map(|envelope| envelope.categories.unwrap_or_default())
    }

    /// Forget every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("API cache cleared");
    }

    /// Cache lookup, then retried request, then `fallback`.
    async fn fetch<T: DeserializeOwned>(&self, endpoint: &Endpoint, fallback: T) -> Fetched<T> {
        let key = endpoint.cache_key();

        if let Some(key) = &key {
            if let Some(payload) = self.cache.get(key) {
                match T::deserialize(&payload) {
                    Ok(value) => {
                        debug!("Cache hit for '{}'", key);
                        return Fetched::new(value, Source::Cache);
                    }
                    Err(e) => {
                        warn!("Discarding unreadable cache entry '{}': {}", key, e);
                        self.cache.remove(key);
                    }
                }
            }
        }

        let url = match self.url_for(endpoint) {
            Ok(url) => url,
            Err(e) => {
                warn!("API call skipped: {}", e);
                return Fetched::new(fallback, Source::Fallback);
            }
        };

        match self.fetch_with_retry::<T>(url.as_str()).await {
            Ok((value, payload)) => {
                if let Some(key) = key {
                    debug!("Caching response under '{}'", key);
                    self.cache.insert(key, payload);
                }
                Fetched::new(value, Source::Network)
            }
            Err(e) => {
                warn!("API call failed: {} ({}), serving fallback", url, e);
                Fetched::new(fallback, Source::Fallback)
            }
        }
    }

    /// Try the request up to `max_attempts` times with linear backoff.
    async fn fetch_with_retry<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<(T, Value), ApiError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!("GET {} (attempt {}/{})", url, attempt, max_attempts);

            match self.attempt::<T>(url).await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < max_attempts && e.is_request_failure() => {
                    warn!(
                        "Request to {} failed (attempt {}/{}): {}",
                        url, attempt, max_attempts, e
                    );
                    let delay = self.policy.backoff(attempt - 1);
                    debug!("Waiting {:?} before retry", delay);
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One request raced against the timeout, status-checked and decoded.
    async fn attempt<T: DeserializeOwned>(&self, url: &str) -> Result<(T, Value), ApiError> {
        let request_timeout = self.policy.request_timeout;
        let response = timeout(request_timeout, self.transport.get(url))
            .await
            .map_err(|_| ApiError::Timeout(request_timeout))??;

        if !response.is_success() {
            return Err(ApiError::HttpStatus(response.status));
        }

        let payload: Value = serde_json::from_str(&response.body)?;
        let value = T::deserialize(&payload)?;
        Ok((value, payload))
    }

    fn url_for(&self, endpoint: &Endpoint) -> Result<Url, ApiError> {
        let raw = format!("{}/{}", self.base_url, endpoint.path());
        let mut url =
            Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;
        if let Some((name, value)) = endpoint.query() {
            url.query_pairs_mut().append_pair(name, value);
        }
        Ok(url)
    }
}
