use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned car identifier.
///
/// The collection resource hands out integer ids today, but nothing on the
/// client depends on that, so string ids are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CarId {
    Number(i64),
    Text(String),
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarId::Number(id) => write!(f, "{id}"),
            CarId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for CarId {
    fn from(value: i64) -> Self {
        CarId::Number(value)
    }
}

/// Typed ids such as `"007"` or `"+7"` stay text so they are sent as typed.
impl From<&str> for CarId {
    fn from(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(id) if id.to_string() == value => CarId::Number(id),
            _ => CarId::Text(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: CarId,
    pub model: String,
    pub year: i64,
    pub color: String,
    pub price: f64,
}

impl Car {
    /// Card headline, e.g. `Civic (2020)`.
    pub fn title(&self) -> String {
        format!("{} ({})", self.model, self.year)
    }

    pub fn price_label(&self) -> String {
        format!("Price: ${}", self.price)
    }

    pub fn color_label(&self) -> String {
        format!("Color: {}", self.color)
    }
}
