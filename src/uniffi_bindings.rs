//! UniFFI bindings for mealdb-client
//!
//! This module provides FFI-compatible types and a blocking client object
//! for use with iOS and Android. The object owns its own tokio runtime and
//! one [`MealDbClient`], so the response cache lives as long as the object.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    parse_ingredients, Category, ClientConfig, Fetched, Meal, MealDbClient, MealPreview, Source,
};

// Re-export UniFFI macro
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

/// FFI-compatible ingredient line
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiIngredient {
    pub name: String,
    /// Empty string when the recipe gives no measure
    pub measure: String,
}

/// FFI-compatible recipe with its ingredient slots already parsed
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiMeal {
    pub id: String,
    pub name: String,
    pub category: String,
    pub area: String,
    pub instructions: String,
    pub thumbnail: String,
    pub tags: Vec<String>,
    pub youtube: Option<String>,
    pub ingredients: Vec<FfiIngredient>,
}

impl From<Meal> for FfiMeal {
    fn from(meal: Meal) -> Self {
        let ingredients = parse_ingredients(&meal)
            .into_iter()
            .map(|i| FfiIngredient {
                name: i.name,
                measure: i.measure,
            })
            .collect();
        let tags = meal.tag_list().into_iter().map(str::to_string).collect();

        FfiMeal {
            id: meal.id,
            name: meal.name,
            category: meal.category,
            area: meal.area,
            instructions: meal.instructions,
            thumbnail: meal.thumbnail,
            tags,
            youtube: meal.youtube,
            ingredients,
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiMealPreview {
    pub id: String,
    pub name: String,
    pub thumbnail: String,
}

impl From<MealPreview> for FfiMealPreview {
    fn from(preview: MealPreview) -> Self {
        FfiMealPreview {
            id: preview.id,
            name: preview.name,
            thumbnail: preview.thumbnail,
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiCategory {
    pub id: String,
    pub name: String,
    pub thumbnail: String,
    pub description: String,
}

impl From<Category> for FfiCategory {
    fn from(category: Category) -> Self {
        FfiCategory {
            id: category.id,
            name: category.name,
            thumbnail: category.thumbnail,
            description: category.description,
        }
    }
}

/// FFI-compatible provenance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum FfiSource {
    Network,
    Cache,
    Fallback,
    Skipped,
}

impl From<Source> for FfiSource {
    fn from(source: Source) -> Self {
        match source {
            Source::Network => FfiSource::Network,
            Source::Cache => FfiSource::Cache,
            Source::Fallback => FfiSource::Fallback,
            Source::Skipped => FfiSource::Skipped,
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiMealResult {
    pub meal: FfiMeal,
    pub source: FfiSource,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiMealDetails {
    /// None when the meal does not exist or the service was unreachable
    pub meal: Option<FfiMeal>,
    pub source: FfiSource,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiPreviewList {
    pub previews: Vec<FfiMealPreview>,
    pub source: FfiSource,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiCategoryList {
    pub categories: Vec<FfiCategory>,
    pub source: FfiSource,
}

impl From<Fetched<Vec<MealPreview>>> for FfiPreviewList {
    fn from(fetched: Fetched<Vec<MealPreview>>) -> Self {
        FfiPreviewList {
            source: fetched.source.into(),
            previews: fetched.value.into_iter().map(Into::into).collect(),
        }
    }
}

/// Client settings; unset fields use the library defaults
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiClientConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub cache_ttl_seconds: Option<u64>,
}

/// FFI-compatible error type
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum FfiError {
    /// Client could not be configured
    ConfigError { message: String },
    /// Runtime error (tokio)
    RuntimeError { message: String },
}

impl fmt::Display for FfiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiError::ConfigError { message } => write!(f, "Config error: {}", message),
            FfiError::RuntimeError { message } => write!(f, "Runtime error: {}", message),
        }
    }
}

impl std::error::Error for FfiError {}

/// Blocking TheMealDB client for mobile hosts
#[cfg_attr(feature = "uniffi", derive(uniffi::Object))]
pub struct FfiMealClient {
    runtime: tokio::runtime::Runtime,
    client: MealDbClient,
}

#[cfg_attr(feature = "uniffi", uniffi::export)]
impl FfiMealClient {
    /// Create a client with its own async runtime and response cache
    #[cfg_attr(feature = "uniffi", uniffi::constructor)]
    pub fn new(config: Option<FfiClientConfig>) -> Result<Arc<Self>, FfiError> {
        let config = config.unwrap_or_default();

        let mut builder = MealDbClient::builder().config(ClientConfig::default());
        if let Some(base_url) = config.base_url {
            builder = builder.base_url(base_url);
        }
        if let Some(timeout_secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        if let Some(attempts) = config.max_attempts {
            builder = builder.max_attempts(attempts);
        }
        if let Some(delay_ms) = config.retry_delay_ms {
            builder = builder.retry_delay(Duration::from_millis(delay_ms));
        }
        if let Some(ttl_secs) = config.cache_ttl_seconds {
            builder = builder.cache_ttl(Duration::from_secs(ttl_secs));
        }

        let client = builder.build().map_err(|e| FfiError::ConfigError {
            message: e.to_string(),
        })?;
        let runtime = tokio::runtime::Runtime::new().map_err(|e| FfiError::RuntimeError {
            message: format!("Failed to create async runtime: {}", e),
        })?;

        Ok(Arc::new(Self { runtime, client }))
    }

    pub fn random_meal(&self) -> FfiMealResult {
        let fetched = self.runtime.block_on(self.client.random_meal());
        FfiMealResult {
            source: fetched.source.into(),
            meal: fetched.value.into(),
        }
    }

    pub fn search_meal_by_name(&self, query: String) -> FfiPreviewList {
        self.runtime
            .block_on(self.client.search_meal_by_name(&query))
            .into()
    }

    pub fn filter_by_ingredient(&self, ingredient: String) -> FfiPreviewList {
        self.runtime
            .block_on(self.client.filter_by_ingredient(&ingredient))
            .into()
    }

    pub fn filter_by_ingredients(&self, ingredients: Vec<String>) -> FfiPreviewList {
        self.runtime
            .block_on(self.client.filter_by_ingredients(&ingredients))
            .into()
    }

    pub fn filter_by_category(&self, category: String) -> FfiPreviewList {
        self.runtime
            .block_on(self.client.filter_by_category(&category))
            .into()
    }

    pub fn meal_details(&self, id: String) -> FfiMealDetails {
        let fetched = self.runtime.block_on(self.client.meal_details(&id));
        FfiMealDetails {
            source: fetched.source.into(),
            meal: fetched.value.map(Into::into),
        }
    }

    pub fn favorite_previews(&self, ids: Vec<String>) -> FfiPreviewList {
        self.runtime
            .block_on(self.client.favorite_previews(&ids))
            .into()
    }

    pub fn categories(&self) -> FfiCategoryList {
        let fetched = self.runtime.block_on(self.client.categories());
        FfiCategoryList {
            source: fetched.source.into(),
            categories: fetched.value.into_iter().map(Into::into).collect(),
        }
    }

    pub fn clear_cache(&self) {
        self.client.clear_cache();
    }
}

/// Get the library version
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback_meal;

    #[test]
    fn test_ffi_meal_conversion() {
        let meal: FfiMeal = fallback_meal().into();
        assert_eq!(meal.id, "52772");
        assert_eq!(meal.tags, vec!["Meat", "Casserole"]);
        assert_eq!(meal.ingredients.len(), 9);
        assert_eq!(
            meal.ingredients[6],
            FfiIngredient {
                name: "chicken breasts".to_string(),
                measure: "2".to_string(),
            }
        );
    }

    #[test]
    fn test_preview_list_conversion() {
        let fetched = Fetched::new(vec![fallback_meal().preview()], Source::Cache);
        let list: FfiPreviewList = fetched.into();
        assert_eq!(list.source, FfiSource::Cache);
        assert_eq!(list.previews[0].name, "Teriyaki Chicken Casserole");
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        let result = FfiMealClient::new(Some(FfiClientConfig {
            base_url: Some("::not-a-url".to_string()),
            ..Default::default()
        }));
        assert!(matches!(result, Err(FfiError::ConfigError { .. })));
    }

    #[test]
    fn test_blank_search_needs_no_network() {
        let client = FfiMealClient::new(None).unwrap();
        let list = client.search_meal_by_name("  ".to_string());
        assert!(list.previews.is_empty());
        assert_eq!(list.source, FfiSource::Skipped);
    }

    #[test]
    fn test_get_version() {
        let version = get_version();
        assert!(!version.is_empty());
    }
}
