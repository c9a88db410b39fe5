//! Item-name extraction from food/drink entries.

use crate::types::{DiaryEntry, EntryKind, FoodData, ItemType};

/// Names an entry contributes as exposures, in payload order, deduplicated.
///
/// Food with ingredients yields one name per ingredient (never the meal
/// label); otherwise the legacy `foodItem`. Drinks yield `drinkItem`.
/// Blank names are skipped; non-consumables yield nothing.
pub fn exposure_names(entry: &DiaryEntry) -> Vec<&str> {
  let mut names: Vec<&str> = Vec::new();
  match &entry.kind {
    EntryKind::Food(food) => {
      if food.ingredients.is_empty() {
        names.extend(legacy_food_item(food));
      } else {
        for ingredient in &food.ingredients {
          let name = ingredient.name.as_str();
          if !name.trim().is_empty() && !names.contains(&name) {
            names.push(name);
          }
        }
      }
    }
    EntryKind::Drink(drink) => {
      if !drink.drink_item.trim().is_empty() {
        names.push(drink.drink_item.as_str());
      }
    }
    _ => {}
  }
  names
}

/// Single whole-entry label, used by trend bucketing.
///
/// Ingredient-list meals are labelled by `mealLabel`, falling back to the
/// first ingredient's name.
pub fn entry_label(entry: &DiaryEntry) -> Option<&str> {
  match &entry.kind {
    EntryKind::Food(food) => match food.ingredients.first() {
      Some(first) => food
        .meal_label
        .as_deref()
        .filter(|label| !label.is_empty())
        .or(Some(first.name.as_str())),
      None => legacy_food_item(food),
    },
    EntryKind::Drink(drink) => Some(drink.drink_item.as_str()),
    _ => None,
  }
}

/// Tracker item type for a consumable entry.
pub fn item_type(entry: &DiaryEntry) -> Option<ItemType> {
  match entry.kind {
    EntryKind::Food(_) => Some(ItemType::Food),
    EntryKind::Drink(_) => Some(ItemType::Drink),
    _ => None,
  }
}

fn legacy_food_item(food: &FoodData) -> Option<&str> {
  food
    .food_item
    .as_deref()
    .filter(|name| !name.trim().is_empty())
}
