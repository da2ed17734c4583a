use serde::Serialize;

/// A pantry staple offered for ingredient search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PantryIngredient {
    pub id: &'static str,
    /// Name as understood by `filter.php?i=`
    pub name: &'static str,
    pub emoji: &'static str,
}

pub const COMMON_INGREDIENTS: [PantryIngredient; 15] = [
    PantryIngredient { id: "chicken", name: "Chicken", emoji: "🍗" },
    PantryIngredient { id: "beef", name: "Beef", emoji: "🥩" },
    PantryIngredient { id: "egg", name: "Egg", emoji: "🥚" },
    PantryIngredient { id: "rice", name: "Rice", emoji: "🍚" },
    PantryIngredient { id: "tomato", name: "Tomato", emoji: "🍅" },
    PantryIngredient { id: "potato", name: "Potato", emoji: "🥔" },
    PantryIngredient { id: "cheese", name: "Cheese", emoji: "🧀" },
    PantryIngredient { id: "onion", name: "Onion", emoji: "🧅" },
    PantryIngredient { id: "garlic", name: "Garlic", emoji: "🧄" },
    PantryIngredient { id: "pasta", name: "Pasta", emoji: "🍝" },
    PantryIngredient { id: "salmon", name: "Salmon", emoji: "🍣" },
    PantryIngredient { id: "shrimp", name: "Shrimp", emoji: "🦐" },
    PantryIngredient { id: "milk", name: "Milk", emoji: "🥛" },
    PantryIngredient { id: "bread", name: "Bread", emoji: "🍞" },
    PantryIngredient { id: "carrot", name: "Carrot", emoji: "🥕" },
];

/// Categories shown as shortcuts on the home screen.
pub const QUICK_CATEGORIES: [&str; 8] = [
    "Chicken",
    "Beef",
    "Vegetarian",
    "Seafood",
    "Pasta",
    "Dessert",
    "Breakfast",
    "Side",
];

/// Look up a pantry staple by id or name, ignoring case.
pub fn find_ingredient(key: &str) -> Option<&'static PantryIngredient> {
    let key = key.trim();
    COMMON_INGREDIENTS
        .iter()
        .find(|i| i.id.eq_ignore_ascii_case(key) || i.name.eq_ignore_ascii_case(key))
}

/// Name to send to the ingredient filter: the staple's canonical name when
/// `input` matches one, otherwise `input` trimmed.
pub fn ingredient_query(input: &str) -> &str {
    find_ingredient(input).map_or(input.trim(), |i| i.name)
}
