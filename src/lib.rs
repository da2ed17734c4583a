//! Client for the [TheMealDB](https://www.themealdb.com) recipe API.
//!
//! Every query retries failed requests with a linear backoff, races each
//! attempt against a timeout, caches successful responses for a few
//! minutes and, once the attempts are spent, hands back a fallback value
//! instead of an error. The [`Fetched`] wrapper tells which of those
//! happened.
//!
//! ```no_run
//! use mealdb_client::{parse_ingredients, MealDbClient};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), mealdb_client::ApiError> {
//! let client = MealDbClient::new()?;
//!
//! let meal = client.random_meal().await;
//! if meal.is_fallback() {
//!     eprintln!("offline, showing the built-in recipe");
//! }
//! for ingredient in parse_ingredients(&meal) {
//!     println!("{} {}", ingredient.measure, ingredient.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod fallback;
pub mod favorites;
pub mod model;
pub mod transport;
pub mod uniffi_bindings;

pub use builder::MealDbClientBuilder;
pub use cache::ApiCache;
pub use client::{Fetched, MealDbClient, RetryPolicy, Source};
pub use config::ClientConfig;
pub use debounce::Debouncer;
pub use error::ApiError;
pub use fallback::{fallback_meal, FALLBACK_MEAL_ID};
pub use favorites::{Favorites, FavoritesStore, FileStore, MemoryStore, FAVORITES_KEY};
pub use model::{parse_ingredients, Category, Meal, MealPreview, ParsedIngredient};
pub use transport::{HttpTransport, RawResponse, Transport};
