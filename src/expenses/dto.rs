use serde::Deserialize;

use crate::{
    error::{ApiError, FieldErrors},
    expenses::repo_types::{Category, ExpensePatch, ExpenseType, NewExpense},
};

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<ExpenseType>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateExpenseRequest {
    pub fn validate(self) -> Result<NewExpense, ApiError> {
        let mut errors = FieldErrors::default();
        if self.amount.is_none() {
            errors.add("amount", "This field is required.");
        }
        if self.kind.is_none() {
            errors.add("type", "This field is required.");
        }
        let description = self.description.unwrap_or_default();
        if description.trim().is_empty() {
            errors.add("description", "This field may not be blank.");
        }

        match (self.amount, self.kind) {
            (Some(amount), Some(kind)) if errors.is_empty() => Ok(NewExpense {
                amount,
                kind,
                category: self.category.unwrap_or_default(),
                description,
            }),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateExpenseRequest {
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<ExpenseType>,
    pub category: Option<Category>,
    pub description: Option<String>,
}

impl UpdateExpenseRequest {
    pub fn validate(self) -> Result<ExpensePatch, ApiError> {
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(ApiError::validation(
                    "description",
                    "This field may not be blank.",
                ));
            }
        }
        Ok(ExpensePatch {
            amount: self.amount,
            kind: self.kind,
            category: self.category,
            description: self.description,
        })
    }
}
