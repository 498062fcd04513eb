//! Upstream response envelopes and conversion into stored recipes.

use radar_core::{Error, Recipe};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `{ "meals": [...] }`; upstream sends `null` when nothing matches.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MealsEnvelope {
    #[serde(default)]
    pub meals: Option<Vec<Meal>>,
}

impl MealsEnvelope {
    pub fn from_value(value: Value) -> Result<Self, Error> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn into_meals(self) -> Vec<Meal> {
        self.meals.unwrap_or_default()
    }
}

/// `{ "categories": [...] }`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CategoriesEnvelope {
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
}

impl CategoriesEnvelope {
    pub fn from_value(value: Value) -> Result<Self, Error> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn into_categories(self) -> Vec<Category> {
        self.categories.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Category {
    #[serde(rename = "idCategory")]
    pub id: String,
    #[serde(rename = "strCategory")]
    pub name: String,
    #[serde(rename = "strCategoryThumb", default)]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "strCategoryDescription", default)]
    pub description: Option<String>,
}

/// A meal as upstream returns it.
///
/// Filter results only carry id, name and thumbnail; lookups carry the rest.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Meal {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "strCategory", default)]
    pub category: Option<String>,
    #[serde(rename = "strArea", default)]
    pub area: Option<String>,
    #[serde(rename = "strInstructions", default)]
    pub instructions: Option<String>,
    #[serde(rename = "strTags", default)]
    pub tags: Option<String>,
    #[serde(rename = "strYoutube", default)]
    pub youtube_url: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl From<Meal> for Recipe {
    fn from(meal: Meal) -> Self {
        let extra = meal
            .rest
            .into_iter()
            .filter(|(_, v)| match v {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                _ => true,
            })
            .collect();

        Recipe {
            id: meal.id,
            name: meal.name,
            thumbnail_url: meal.thumbnail_url.unwrap_or_default(),
            category: non_empty(meal.category),
            area: non_empty(meal.area),
            instructions: non_empty(meal.instructions),
            tags: non_empty(meal.tags),
            youtube_url: non_empty(meal.youtube_url),
            extra,
        }
    }
}
