use log::info;
use mealdb_client::catalog::{ingredient_query, COMMON_INGREDIENTS, QUICK_CATEGORIES};
use mealdb_client::{
    parse_ingredients, ClientConfig, Fetched, Meal, MealDbClient, ParsedIngredient,
};
use serde::Serialize;
use std::env;

const USAGE: &str = "Usage: mealdb <command> [args]

Commands:
  random                 Recipe of the day
  search <name>          Search meals by name
  ingredient <name>      Meals using an ingredient
  pantry <a,b,...>       Meals using all of the listed ingredients
  category <name>        Meals in a category
  meal <id>              Full recipe with parsed ingredients
  categories             All categories
  ingredients            Built-in pantry staples and quick categories";

#[derive(Serialize)]
struct MealDetail<'a> {
    #[serde(flatten)]
    meal: &'a Meal,
    ingredients: Vec<ParsedIngredient>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = args.first().ok_or(USAGE)?;
    let argument = args[1..].join(" ");

    let client = MealDbClient::builder()
        .config(ClientConfig::load()?)
        .build()?;

    match command.as_str() {
        "random" => {
            let meal = client.random_meal().await;
            print_detail(&meal)?;
        }
        "search" => print(client.search_meal_by_name(&argument).await)?,
        "ingredient" => print(client.filter_by_ingredient(&argument).await)?,
        "pantry" => {
            let ingredients: Vec<&str> = argument.split(',').map(ingredient_query).collect();
            print(client.filter_by_ingredients(&ingredients).await)?;
        }
        "category" => print(client.filter_by_category(&argument).await)?,
        "meal" => {
            let meal = client.meal_details(&argument).await;
            match meal.value.as_ref() {
                Some(found) => print_detail(&Fetched::new(found.clone(), meal.source))?,
                None => {
                    report_source(&meal);
                    return Err(format!("No meal found with id '{}'", argument).into());
                }
            }
        }
        "categories" => print(client.categories().await)?,
        "ingredients" => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "ingredients": COMMON_INGREDIENTS,
                    "categories": QUICK_CATEGORIES,
                }))?
            );
        }
        _ => return Err(USAGE.into()),
    }

    Ok(())
}

fn report_source<T>(fetched: &Fetched<T>) {
    info!("Served from {:?}", fetched.source);
    if fetched.is_fallback() {
        eprintln!("note: TheMealDB is unreachable, showing fallback data");
    }
}

fn print<T: Serialize>(fetched: Fetched<T>) -> Result<(), serde_json::Error> {
    report_source(&fetched);
    println!("{}", serde_json::to_string_pretty(&fetched.value)?);
    Ok(())
}

fn print_detail(meal: &Fetched<Meal>) -> Result<(), serde_json::Error> {
    report_source(meal);
    let detail = MealDetail {
        meal: &meal.value,
        ingredients: parse_ingredients(&meal.value),
    };
    println!("{}", serde_json::to_string_pretty(&detail)?);
    Ok(())
}
