use crate::model::Meal;

/// Id of the built-in meal served when the service cannot be reached.
pub const FALLBACK_MEAL_ID: &str = "52772";

const FALLBACK_INSTRUCTIONS: &str = "Preheat oven to 350° F. Spray a 9x13-inch baking pan with non-stick spray.\n\n\
Combine soy sauce, ½ cup water, brown sugar, ginger and garlic in a small saucepan and cover. Bring to a boil over medium heat. Remove lid and cook for one minute once boiling.\n\n\
Meanwhile, stir together the cornstarch and 2 tablespoons of water in a separate dish until smooth. Once sauce is boiling, add cornstarch mixture to the saucepan and stir to combine. Cook until the sauce starts to thicken then remove from heat.\n\n\
Place the chicken breasts in the prepared pan. Pour one cup of the sauce over top of chicken. Place chicken in oven and bake 35 minutes or until cooked through. Remove from oven and shred the chicken in the pan using two forks.\n\n\
*Meanwhile, cook the rice according to package directions.\n\n\
Add the rice and remaining sauce to the casserole and stir to combine. Sprinkle the remaining 1/2 cup cheese over the top of the casserole. Return the casserole to the oven and bake an additional 15 minutes or until cheese is melted and bubbly. Garnish with green onions, if desired.";

const FALLBACK_INGREDIENTS: [(&str, &str); 9] = [
    ("soy sauce", "3/4 cup"),
    ("water", "1/2 cup"),
    ("brown sugar", "1/4 cup"),
    ("ground ginger", "1/2 teaspoon"),
    ("minced garlic", "1/2 teaspoon"),
    ("cornstarch", "4 Tablespoons"),
    ("chicken breasts", "2"),
    ("stir-fry vegetables", "1 (12 oz.)"),
    ("brown rice", "3 cups"),
];

/// Teriyaki Chicken Casserole, a complete record bundled with the crate.
pub fn fallback_meal() -> Meal {
    let mut meal = Meal {
        id: FALLBACK_MEAL_ID.to_string(),
        name: "Teriyaki Chicken Casserole".to_string(),
        category: "Chicken".to_string(),
        area: "Japanese".to_string(),
        instructions: FALLBACK_INSTRUCTIONS.to_string(),
        thumbnail: "https://www.themealdb.com/images/media/meals/wvpsxx1468256321.jpg"
            .to_string(),
        tags: Some("Meat,Casserole".to_string()),
        youtube: Some("https://www.youtube.com/watch?v=4aZr5hZXP_s".to_string()),
        ..Default::default()
    };

    for (index, (name, measure)) in FALLBACK_INGREDIENTS.iter().enumerate() {
        meal.set_ingredient(index + 1, name, measure);
    }

    meal
}
