use crate::error::StoreError;
use crate::model::Ingredient;
use serde::Serialize;

/// Body of the recipe upload request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadPayload {
    pub title: String,
    pub source_url: String,
    pub image_url: String,
    pub publisher: String,
    pub cooking_time: u32,
    pub servings: u32,
    pub ingredients: Vec<Ingredient>,
}

impl UploadPayload {
    /// Build the payload from submitted form fields, in form order.
    ///
    /// Recognised names are `title`, `sourceUrl`, `image`, `publisher`, `cookingTime`,
    /// `servings`, and any field starting with `ingredient`. Empty ingredient fields are skipped.
    pub fn from_form<K, V>(fields: &[(K, V)]) -> Result<Self, StoreError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let field = |name: &str| -> String {
            fields
                .iter()
                .find(|(key, _)| key.as_ref() == name)
                .map(|(_, value)| value.as_ref().trim().to_string())
                .unwrap_or_default()
        };

        let ingredients = fields
            .iter()
            .filter(|(key, value)| {
                key.as_ref().starts_with("ingredient") && !value.as_ref().trim().is_empty()
            })
            .map(|(_, value)| parse_ingredient(value.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            title: field("title"),
            source_url: field("sourceUrl"),
            image_url: field("image"),
            publisher: field("publisher"),
            cooking_time: parse_number("cookingTime", &field("cookingTime"))?,
            servings: parse_servings(&field("servings"))?,
            ingredients,
        })
    }
}

/// Parse one `quantity,unit,description` entry; the quantity may be empty
pub fn parse_ingredient(entry: &str) -> Result<Ingredient, StoreError> {
    let parts: Vec<&str> = entry.split(',').map(str::trim).collect();
    let [quantity, unit, description] = parts.as_slice() else {
        return Err(StoreError::Validation(format!(
            "Wrong ingredient format '{}'! Please use the format 'Quantity,Unit,Description'.",
            entry
        )));
    };

    let quantity = if quantity.is_empty() {
        None
    } else {
        let value = quantity
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| {
                StoreError::Validation(format!("Ingredient quantity '{}' is not a number", quantity))
            })?;
        Some(value)
    };

    Ok(Ingredient {
        quantity,
        unit: unit.to_string(),
        description: description.to_string(),
    })
}

fn parse_number(name: &str, value: &str) -> Result<u32, StoreError> {
    value
        .parse::<u32>()
        .map_err(|_| StoreError::Validation(format!("{} must be a whole number, got '{}'", name, value)))
}

fn parse_servings(value: &str) -> Result<u32, StoreError> {
    match parse_number("servings", value)? {
        0 => Err(StoreError::Validation(
            "servings must be at least 1".to_string(),
        )),
        servings => Ok(servings),
    }
}
