use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
	Pending,
	Approved,
	Rejected,
}

impl ReviewStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			ReviewStatus::Pending => "pending",
			ReviewStatus::Approved => "approved",
			ReviewStatus::Rejected => "rejected",
		}
	}

	/// A moderator may approve or reject a review at any time, but nothing
	/// goes back into the moderation queue.
	pub fn can_transition_to(&self, next: ReviewStatus) -> bool {
		next != ReviewStatus::Pending
	}
}

impl fmt::Display for ReviewStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ReviewStatus {
	type Err = ReviewRowError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"pending" => Ok(ReviewStatus::Pending),
			"approved" => Ok(ReviewStatus::Approved),
			"rejected" => Ok(ReviewStatus::Rejected),
			other => Err(ReviewRowError::UnknownStatus(other.to_string())),
		}
	}
}

#[derive(Debug, Error, PartialEq)]
pub enum ReviewRowError {
	#[error("rating `{field}` is missing")]
	MissingRating { field: &'static str },
	#[error("rating `{field}` is not a number: {value:?}")]
	InvalidRating { field: &'static str, value: String },
	#[error("unknown review status: {0:?}")]
	UnknownStatus(String),
}

/// Review as it comes out of the database. Ratings are selected as text
/// because older rows were written as strings.
#[allow(non_snake_case)]
#[derive(Debug, Deserialize, sqlx::FromRow, Serialize, Clone, Default)]
pub struct ReviewRow {
	pub review_id: Uuid,
	pub clinic_id: Uuid,
	pub quality: Option<String>,
	pub service: Option<String>,
	pub comfort: Option<String>,
	pub price: Option<String>,
	pub comment: Option<String>,
	pub status: Option<String>,
	pub author_name: Option<String>,
	pub author_phone: Option<String>,
	pub author_email: Option<String>,
	#[serde(rename = "createdTs")]
	pub created_ts: Option<DateTime<Utc>>,
	#[serde(rename = "updatedTs")]
	pub updated_ts: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
	pub review_id: Uuid,
	pub clinic_id: Uuid,
	pub quality: f64,
	pub service: f64,
	pub comfort: f64,
	pub price: f64,
	pub average_rating: f64,
	pub comment: Option<String>,
	pub status: ReviewStatus,
	pub author_name: Option<String>,
	pub author_phone: Option<String>,
	pub author_email: Option<String>,
	pub created_ts: Option<DateTime<Utc>>,
	pub updated_ts: Option<DateTime<Utc>>,
}

pub fn average_rating(quality: f64, service: f64, comfort: f64, price: f64) -> f64 {
	(quality + service + comfort + price) / 4.0
}

fn parse_rating(field: &'static str, raw: &Option<String>) -> Result<f64, ReviewRowError> {
	let raw = raw
		.as_deref()
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.ok_or(ReviewRowError::MissingRating { field })?;

	raw.parse::<f64>()
		.ok()
		.filter(|value| value.is_finite())
		.ok_or_else(|| ReviewRowError::InvalidRating {
			field,
			value: raw.to_string(),
		})
}

impl TryFrom<ReviewRow> for Review {
	type Error = ReviewRowError;

	fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
		let quality = parse_rating("quality", &row.quality)?;
		let service = parse_rating("service", &row.service)?;
		let comfort = parse_rating("comfort", &row.comfort)?;
		let price = parse_rating("price", &row.price)?;
		let status = row
			.status
			.as_deref()
			.unwrap_or(ReviewStatus::Pending.as_str())
			.parse()?;

		Ok(Review {
			review_id: row.review_id,
			clinic_id: row.clinic_id,
			quality,
			service,
			comfort,
			price,
			average_rating: average_rating(quality, service, comfort, price),
			comment: row.comment,
			status,
			author_name: row.author_name,
			author_phone: row.author_phone,
			author_email: row.author_email,
			created_ts: row.created_ts,
			updated_ts: row.updated_ts,
		})
	}
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AddReviewSchema {
	pub quality: f64,
	pub service: f64,
	pub comfort: f64,
	pub price: f64,
	pub comment: Option<String>,
	pub author_name: String,
	pub author_phone: Option<String>,
	pub author_email: Option<String>,
}

impl AddReviewSchema {
	pub fn validate(&self) -> Result<(), String> {
		let ratings = [self.quality, self.service, self.comfort, self.price];
		if ratings
			.iter()
			.any(|r| !r.is_finite() || !(MIN_RATING..=MAX_RATING).contains(r))
		{
			return Err("Оценки должны быть в диапазоне от 0 до 5".to_string());
		}
		if self.author_name.trim().is_empty() {
			return Err("Укажите имя".to_string());
		}

		Ok(())
	}

	pub fn average_rating(&self) -> f64 {
		average_rating(self.quality, self.service, self.comfort, self.price)
	}
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewStatusSchema {
	pub status: ReviewStatus,
}

#[derive(Deserialize, Debug, Default)]
pub struct ReviewsFilterOptions {
	pub status: Option<ReviewStatus>,
	pub page: Option<usize>,
	pub limit: Option<usize>,
}

/// Public shape of a review. Contact fields are only shown to moderators.
#[allow(non_snake_case)]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FilteredReview {
	pub review_id: String,
	pub clinic_id: String,
	pub quality: f64,
	pub service: f64,
	pub comfort: f64,
	pub price: f64,
	#[serde(rename = "averageRating")]
	pub average_rating: f64,
	pub comment: Option<String>,
	pub status: ReviewStatus,
	pub author_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub author_phone: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub author_email: Option<String>,
	#[serde(rename = "createdTs")]
	pub created_ts: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row(quality: &str, service: &str, comfort: &str, price: &str) -> ReviewRow {
		ReviewRow {
			review_id: Uuid::new_v4(),
			clinic_id: Uuid::new_v4(),
			quality: Some(quality.to_string()),
			service: Some(service.to_string()),
			comfort: Some(comfort.to_string()),
			price: Some(price.to_string()),
			status: Some("approved".to_string()),
			..Default::default()
		}
	}

	#[test]
	fn numeric_strings_are_coerced() {
		let review = Review::try_from(row("5", " 4.0 ", "4.5", "2.5")).unwrap();

		assert_eq!(review.quality, 5.0);
		assert_eq!(review.service, 4.0);
		assert_eq!(review.average_rating, 4.0);
		assert_eq!(review.status, ReviewStatus::Approved);
	}

	#[test]
	fn malformed_rating_rejects_the_row() {
		let err = Review::try_from(row("5", "excellent", "4", "4")).unwrap_err();
		assert_eq!(
			err,
			ReviewRowError::InvalidRating {
				field: "service",
				value: "excellent".to_string()
			}
		);

		assert!(Review::try_from(row("NaN", "4", "4", "4")).is_err());
		assert!(Review::try_from(row("inf", "4", "4", "4")).is_err());
	}

	#[test]
	fn missing_rating_rejects_the_row() {
		let mut raw = row("5", "5", "5", "5");
		raw.price = None;

		assert_eq!(
			Review::try_from(raw).unwrap_err(),
			ReviewRowError::MissingRating { field: "price" }
		);
	}

	#[test]
	fn unknown_status_rejects_the_row() {
		let mut raw = row("5", "5", "5", "5");
		raw.status = Some("spam".to_string());

		assert!(matches!(
			Review::try_from(raw),
			Err(ReviewRowError::UnknownStatus(_))
		));
	}

	#[test]
	fn status_transitions_never_return_to_pending() {
		assert!(ReviewStatus::Pending.can_transition_to(ReviewStatus::Approved));
		assert!(ReviewStatus::Approved.can_transition_to(ReviewStatus::Rejected));
		assert!(ReviewStatus::Rejected.can_transition_to(ReviewStatus::Approved));
		assert!(!ReviewStatus::Approved.can_transition_to(ReviewStatus::Pending));
	}

	#[test]
	fn submission_validation() {
		let mut body = AddReviewSchema {
			quality: 5.0,
			service: 4.0,
			comfort: 3.0,
			price: 4.0,
			comment: Some("Всё понравилось".to_string()),
			author_name: "Ion".to_string(),
			author_phone: None,
			author_email: None,
		};
		assert!(body.validate().is_ok());
		assert_eq!(body.average_rating(), 4.0);

		body.price = 6.0;
		assert!(body.validate().is_err());

		body.price = f64::NAN;
		assert!(body.validate().is_err());
	}
}
