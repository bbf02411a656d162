use serde::{Deserialize, Serialize};

use crate::domain::Car;

/// Body of `POST /cars` and `PUT /cars/{id}`.
///
/// A numeric field that could not be coerced from the form is `None` and goes
/// out as JSON `null`; the server decides what to do with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarFields {
    pub model: String,
    pub year: Option<i64>,
    pub color: String,
    pub price: Option<f64>,
}

impl From<&Car> for CarFields {
    fn from(car: &Car) -> Self {
        Self {
            model: car.model.clone(),
            year: Some(car.year),
            color: car.color.clone(),
            price: Some(car.price),
        }
    }
}
