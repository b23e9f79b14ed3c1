use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[allow(non_snake_case)]
#[derive(Debug, Deserialize, sqlx::FromRow, Serialize, Clone, Default)]
pub struct Package {
	pub package_id: Uuid,
	pub clinic_id: Uuid,
	pub name_ru: Option<String>,
	pub name_ro: Option<String>,
	pub description_ru: Option<String>,
	pub description_ro: Option<String>,
	/// MDL
	pub price: i32,
	pub old_price: Option<i32>,
	pub is_active: bool,
	#[serde(rename = "createdTs")]
	pub created_ts: Option<DateTime<Utc>>,
	#[serde(rename = "updatedTs")]
	pub updated_ts: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AddPackageSchema {
	pub name_ru: String,
	pub name_ro: Option<String>,
	pub description_ru: Option<String>,
	pub description_ro: Option<String>,
	pub price: i32,
	pub old_price: Option<i32>,
}

impl AddPackageSchema {
	pub fn validate(&self) -> Result<(), String> {
		if self.name_ru.trim().is_empty() {
			return Err("Название пакета не может быть пустым".to_string());
		}
		if self.price < 0 {
			return Err("Цена не может быть отрицательной".to_string());
		}
		if self.old_price.is_some_and(|old| old <= self.price) {
			return Err("Старая цена должна быть больше текущей".to_string());
		}

		Ok(())
	}
}

#[allow(non_snake_case)]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FilteredPackage {
	pub package_id: String,
	pub clinic_id: String,
	pub name: Option<String>,
	pub description: Option<String>,
	pub price: i32,
	pub old_price: Option<i32>,
	/// Percent off `old_price`, rounded down.
	pub discount: Option<i32>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn old_price_must_exceed_price() {
		let mut body = AddPackageSchema {
			name_ru: "Чистка".to_string(),
			price: 500,
			old_price: Some(700),
			..Default::default()
		};
		assert!(body.validate().is_ok());

		body.old_price = Some(500);
		assert!(body.validate().is_err());

		body.old_price = None;
		body.price = -1;
		assert!(body.validate().is_err());
	}
}
