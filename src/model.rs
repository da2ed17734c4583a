use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// TheMealDB stores ingredients in numbered slots `strIngredient1..=20`.
pub const INGREDIENT_SLOTS: usize = 20;

/// Full recipe record as returned by the lookup, search and random endpoints.
///
/// The ingredient and measure slots stay flat, exactly as the service sends
/// them, together with any other field this type does not name. Use
/// [`Meal::ingredient`] / [`Meal::measure`] to read a slot and
/// [`parse_ingredients`] to get the populated pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strCategory", default, deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(rename = "strArea", default, deserialize_with = "null_as_empty")]
    pub area: String,
    #[serde(rename = "strInstructions", default, deserialize_with = "null_as_empty")]
    pub instructions: String,
    #[serde(rename = "strMealThumb", default, deserialize_with = "null_as_empty")]
    pub thumbnail: String,
    /// Comma separated, e.g. `"Meat,Casserole"`
    #[serde(rename = "strTags", default)]
    pub tags: Option<String>,
    #[serde(rename = "strYoutube", default)]
    pub youtube: Option<String>,
    /// `strIngredientN`, `strMeasureN` and any unrecognised fields.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Meal {
    /// Raw ingredient name in `slot` (1-based), if the slot holds a string.
    pub fn ingredient(&self, slot: usize) -> Option<&str> {
        self.field_str(&format!("strIngredient{}", slot))
    }

    /// Raw measure in `slot` (1-based), if the slot holds a string.
    pub fn measure(&self, slot: usize) -> Option<&str> {
        self.field_str(&format!("strMeasure{}", slot))
    }

    /// Fill an ingredient slot. Slots outside `1..=20` are ignored.
    pub fn set_ingredient(&mut self, slot: usize, name: &str, measure: &str) {
        if slot == 0 || slot > INGREDIENT_SLOTS {
            return;
        }
        self.fields.insert(
            format!("strIngredient{}", slot),
            Value::String(name.to_string()),
        );
        self.fields.insert(
            format!("strMeasure{}", slot),
            Value::String(measure.to_string()),
        );
    }

    /// Builder-style variant of [`Meal::set_ingredient`].
    pub fn with_ingredient(mut self, slot: usize, name: &str, measure: &str) -> Self {
        self.set_ingredient(slot, name, measure);
        self
    }

    pub fn ingredients(&self) -> Vec<ParsedIngredient> {
        parse_ingredients(self)
    }

    /// Split `strTags` on commas, dropping blanks.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn preview(&self) -> MealPreview {
        MealPreview {
            id: self.id.clone(),
            name: self.name.clone(),
            thumbnail: self.thumbnail.clone(),
        }
    }

    fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

/// Lightweight projection used by the filter endpoints and result grids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPreview {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strMealThumb", default, deserialize_with = "null_as_empty")]
    pub thumbnail: String,
}

impl From<&Meal> for MealPreview {
    fn from(meal: &Meal) -> Self {
        meal.preview()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "idCategory")]
    pub id: String,
    #[serde(rename = "strCategory")]
    pub name: String,
    #[serde(rename = "strCategoryThumb", default, deserialize_with = "null_as_empty")]
    pub thumbnail: String,
    #[serde(
        rename = "strCategoryDescription",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub description: String,
}

/// An ingredient slot that actually holds something.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedIngredient {
    pub name: String,
    pub measure: String,
}

/// `{"meals": [...]}` envelope. The service sends `null` for no matches.
#[derive(Debug, Clone, Deserialize)]
pub struct MealsEnvelope<T> {
    #[serde(default)]
    pub meals: Option<Vec<T>>,
}

impl<T> MealsEnvelope<T> {
    pub fn into_vec(self) -> Vec<T> {
        self.meals.unwrap_or_default()
    }

    pub fn into_first(self) -> Option<T> {
        self.meals.and_then(|meals| meals.into_iter().next())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesEnvelope {
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
}

/// Extract the populated ingredient slots of `meal`, in slot order.
///
/// A slot counts only if its ingredient name is non-empty after trimming.
/// Names and measures are trimmed; a missing measure becomes `""`.
pub fn parse_ingredients(meal: &Meal) -> Vec<ParsedIngredient> {
    (1..=INGREDIENT_SLOTS)
        .filter_map(|slot| {
            let name = meal.ingredient(slot)?.trim();
            if name.is_empty() {
                return None;
            }
            Some(ParsedIngredient {
                name: name.to_string(),
                measure: meal.measure(slot).unwrap_or_default().trim().to_string(),
            })
        })
        .collect()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meal(id: &str) -> Meal {
        Meal {
            id: id.to_string(),
            name: "Test Meal".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_ingredients_skips_empty_slot() {
        let meal = meal("1")
            .with_ingredient(1, "Chicken", " 2 breasts ")
            .with_ingredient(2, " Rice ", "1 cup")
            .with_ingredient(3, "   ", "pinch")
            .with_ingredient(4, "Salt", "  to taste");

        let parsed = parse_ingredients(&meal);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].name, "Chicken");
        assert_eq!(parsed[0].measure, "2 breasts");
        assert_eq!(parsed[1].name, "Rice");
        assert_eq!(parsed[2].name, "Salt");
        assert_eq!(parsed[2].measure, "to taste");
    }

    #[test]
    fn test_parse_ingredients_missing_measure() {
        let mut meal = meal("1");
        meal.fields.insert("strIngredient1".to_string(), json!("Eggs"));
        meal.fields.insert("strMeasure1".to_string(), Value::Null);

        let parsed = meal.ingredients();
        assert_eq!(
            parsed,
            vec![ParsedIngredient {
                name: "Eggs".to_string(),
                measure: String::new(),
            }]
        );
    }

    #[test]
    fn test_set_ingredient_out_of_range_is_ignored() {
        let meal = meal("1")
            .with_ingredient(0, "Nope", "")
            .with_ingredient(21, "Nope", "");
        assert!(meal.fields.is_empty());
    }

    #[test]
    fn test_deserialize_lookup_payload() {
        let payload = json!({
            "idMeal": "52874",
            "strMeal": "Beef and Mustard Pie",
            "strCategory": "Beef",
            "strArea": "British",
            "strInstructions": "Preheat the oven.",
            "strMealThumb": "https://www.themealdb.com/images/media/meals/sytuqu1511553755.jpg",
            "strTags": "Meat,Pie",
            "strYoutube": null,
            "strIngredient1": "Beef",
            "strIngredient2": "Plain Flour",
            "strIngredient3": "",
            "strIngredient4": null,
            "strMeasure1": "1kg",
            "strMeasure2": "2 tbs",
            "strMeasure3": "",
            "strMeasure4": null,
            "strSource": "https://www.bbc.co.uk/food/recipes/beef_and_mustard_pie_58002",
            "dateModified": null
        });

        let meal: Meal = serde_json::from_value(payload).unwrap();
        assert_eq!(meal.id, "52874");
        assert_eq!(meal.area, "British");
        assert!(meal.youtube.is_none());
        assert_eq!(meal.tag_list(), vec!["Meat", "Pie"]);
        assert_eq!(meal.ingredients().len(), 2);
        assert!(meal.fields.contains_key("strSource"));
    }

    #[test]
    fn test_null_text_fields_become_empty() {
        let payload = json!({
            "idMeal": "1",
            "strMeal": "Bare",
            "strCategory": null,
            "strMealThumb": null
        });
        let meal: Meal = serde_json::from_value(payload).unwrap();
        assert_eq!(meal.category, "");
        assert_eq!(meal.thumbnail, "");
        assert!(meal.tag_list().is_empty());
    }

    #[test]
    fn test_envelope_null_meals() {
        let envelope: MealsEnvelope<MealPreview> =
            serde_json::from_str(r#"{"meals": null}"#).unwrap();
        assert!(envelope.into_vec().is_empty());

        let envelope: MealsEnvelope<Meal> = serde_json::from_str("{}").unwrap();
        assert!(envelope.into_first().is_none());
    }

    #[test]
    fn test_preview_projection() {
        let mut meal = meal("42");
        meal.thumbnail = "thumb.jpg".to_string();
        let preview = MealPreview::from(&meal);
        assert_eq!(preview.id, "42");
        assert_eq!(preview.name, "Test Meal");
        assert_eq!(preview.thumbnail, "thumb.jpg");
    }
}
