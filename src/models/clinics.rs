use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Lang;
use crate::scoring::ScoreInput;

#[allow(non_snake_case)]
#[derive(Debug, Deserialize, sqlx::FromRow, Serialize, Clone, Default)]
pub struct Clinic {
	pub clinic_id: Uuid,
	pub name_ru: Option<String>,
	pub name_ro: Option<String>,
	pub address_ru: Option<String>,
	pub address_ro: Option<String>,
	pub city: Option<String>,
	pub phone: Option<String>,
	pub website: Option<String>,
	pub parking: bool,
	pub open_24h: bool,
	pub weekend_work: bool,
	pub installment_plan: bool,
	pub urgent_care: bool,
	pub online_booking: bool,
	pub evening_hours: bool,
	pub convenient_location: bool,
	pub has_licenses: bool,
	pub has_certificates: bool,
	pub has_promotions: bool,
	pub google_rating: Option<f64>,
	pub google_reviews_count: Option<i32>,
	pub doctor_experience: Option<i32>,
	pub reviews_index: i32,
	pub trust_index: i32,
	pub access_index: i32,
	pub price_index: i32,
	pub d_score: i32,
	#[serde(rename = "createdTs")]
	pub created_ts: Option<DateTime<Utc>>,
	#[serde(rename = "updatedTs")]
	pub updated_ts: Option<DateTime<Utc>>,
}

/// Body of clinic create and update requests. Scores are never accepted
/// from the client, they are recomputed from these fields.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SaveClinic {
	pub name_ru: String,
	pub name_ro: Option<String>,
	pub address_ru: Option<String>,
	pub address_ro: Option<String>,
	pub city: Option<String>,
	pub phone: Option<String>,
	pub website: Option<String>,
	#[serde(default)]
	pub parking: bool,
	#[serde(default)]
	pub open_24h: bool,
	#[serde(default)]
	pub weekend_work: bool,
	#[serde(default)]
	pub installment_plan: bool,
	#[serde(default)]
	pub urgent_care: bool,
	#[serde(default)]
	pub online_booking: bool,
	#[serde(default)]
	pub evening_hours: bool,
	#[serde(default)]
	pub convenient_location: bool,
	#[serde(default)]
	pub has_licenses: bool,
	#[serde(default)]
	pub has_certificates: bool,
	#[serde(default)]
	pub has_promotions: bool,
	pub google_rating: Option<f64>,
	pub google_reviews_count: Option<i32>,
	pub doctor_experience: Option<i32>,
}

impl SaveClinic {
	pub fn score_input(&self) -> ScoreInput {
		ScoreInput {
			google_rating: self.google_rating,
			google_reviews_count: self.google_reviews_count.map(i64::from),
			doctor_experience: self.doctor_experience.map(i64::from),
			has_licenses: self.has_licenses,
			has_certificates: self.has_certificates,
			online_booking: self.online_booking,
			evening_hours: self.evening_hours,
			urgent_care: self.urgent_care,
			convenient_location: self.convenient_location,
			installment_plan: self.installment_plan,
			has_promotions: self.has_promotions,
		}
	}

	pub fn validate(&self) -> Result<(), String> {
		if self.name_ru.trim().is_empty() {
			return Err("Название клиники не может быть пустым".to_string());
		}
		if let Some(rating) = self.google_rating {
			if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
				return Err("Рейтинг Google должен быть в диапазоне от 0 до 5".to_string());
			}
		}
		if self.google_reviews_count.is_some_and(|count| count < 0) {
			return Err("Количество отзывов не может быть отрицательным".to_string());
		}
		if self.doctor_experience.is_some_and(|years| years < 0) {
			return Err("Стаж врачей не может быть отрицательным".to_string());
		}

		Ok(())
	}
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClinicSort {
	#[default]
	Score,
	Rating,
	Name,
}

#[derive(Deserialize, Debug, Default)]
pub struct ClinicFilterOptions {
	pub page: Option<usize>,
	pub limit: Option<usize>,
	pub city: Option<String>,
	pub lang: Option<Lang>,
	pub parking: Option<bool>,
	pub open_24h: Option<bool>,
	pub weekend_work: Option<bool>,
	pub installment: Option<bool>,
	pub urgent_care: Option<bool>,
	pub sort: Option<ClinicSort>,
}

#[allow(non_snake_case)]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FilteredClinic {
	pub clinic_id: String,
	pub name: Option<String>,
	pub address: Option<String>,
	pub city: Option<String>,
	pub phone: Option<String>,
	pub website: Option<String>,
	pub parking: bool,
	pub open_24h: bool,
	pub weekend_work: bool,
	pub installment_plan: bool,
	pub urgent_care: bool,
	pub online_booking: bool,
	pub evening_hours: bool,
	pub convenient_location: bool,
	pub has_licenses: bool,
	pub has_certificates: bool,
	pub has_promotions: bool,
	pub google_rating: Option<f64>,
	pub google_reviews_count: Option<i32>,
	pub doctor_experience: Option<i32>,
	#[serde(rename = "reviewsIndex")]
	pub reviews_index: i32,
	#[serde(rename = "trustIndex")]
	pub trust_index: i32,
	#[serde(rename = "accessIndex")]
	pub access_index: i32,
	#[serde(rename = "priceIndex")]
	pub price_index: i32,
	#[serde(rename = "dScore")]
	pub d_score: i32,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn save_clinic_defaults_missing_flags_to_false() {
		let body: SaveClinic = serde_json::from_str(r#"{"name_ru": "Дент Люкс"}"#).unwrap();
		let input = body.score_input();

		assert!(!input.online_booking);
		assert!(!input.has_promotions);
		assert_eq!(input.google_rating, None);
		assert!(body.validate().is_ok());
	}

	#[test]
	fn validation_rejects_bad_values() {
		let mut body = SaveClinic {
			name_ru: "Smile".to_string(),
			google_rating: Some(5.5),
			..Default::default()
		};
		assert!(body.validate().is_err());

		body.google_rating = Some(4.9);
		body.doctor_experience = Some(-1);
		assert!(body.validate().is_err());

		body.doctor_experience = Some(8);
		body.name_ru = "  ".to_string();
		assert!(body.validate().is_err());
	}
}
