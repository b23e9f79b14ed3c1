use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

const MIN_PHONE_DIGITS: usize = 6;
const MAX_PHONE_DIGITS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
	New,
	Confirmed,
	Cancelled,
}

impl BookingStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			BookingStatus::New => "new",
			BookingStatus::Confirmed => "confirmed",
			BookingStatus::Cancelled => "cancelled",
		}
	}

	/// new -> confirmed | cancelled, confirmed -> cancelled. Cancelled is final.
	pub fn can_transition_to(&self, next: BookingStatus) -> bool {
		matches!(
			(self, next),
			(BookingStatus::New, BookingStatus::Confirmed)
				| (BookingStatus::New, BookingStatus::Cancelled)
				| (BookingStatus::Confirmed, BookingStatus::Cancelled)
		)
	}
}

impl fmt::Display for BookingStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for BookingStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"new" => Ok(BookingStatus::New),
			"confirmed" => Ok(BookingStatus::Confirmed),
			"cancelled" => Ok(BookingStatus::Cancelled),
			other => Err(format!("unknown booking status: {other:?}")),
		}
	}
}

#[allow(non_snake_case)]
#[derive(Debug, Deserialize, sqlx::FromRow, Serialize, Clone, Default)]
pub struct Booking {
	pub booking_id: Uuid,
	pub clinic_id: Uuid,
	pub package_id: Option<Uuid>,
	pub name: Option<String>,
	pub phone: Option<String>,
	pub email: Option<String>,
	pub preferred_date: Option<NaiveDate>,
	pub comment: Option<String>,
	pub status: String,
	#[serde(rename = "createdTs")]
	pub created_ts: Option<DateTime<Utc>>,
	#[serde(rename = "updatedTs")]
	pub updated_ts: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AddBookingSchema {
	pub clinic_id: Uuid,
	pub package_id: Option<Uuid>,
	pub name: String,
	pub phone: String,
	pub email: Option<String>,
	pub preferred_date: Option<NaiveDate>,
	pub comment: Option<String>,
}

impl AddBookingSchema {
	pub fn validate(&self, today: NaiveDate) -> Result<(), String> {
		if self.name.trim().is_empty() {
			return Err("Укажите имя".to_string());
		}
		if !is_valid_phone(&self.phone) {
			return Err("Некорректный номер телефона".to_string());
		}
		if self.preferred_date.is_some_and(|date| date < today) {
			return Err("Дата визита не может быть в прошлом".to_string());
		}

		Ok(())
	}
}

/// Accepts `+373 (22) 12-34-56` style numbers.
pub fn is_valid_phone(phone: &str) -> bool {
	let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')');
	let digits = phone.chars().filter(char::is_ascii_digit).count();

	phone.chars().all(allowed) && (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusSchema {
	pub status: BookingStatus,
}

#[derive(Deserialize, Debug, Default)]
pub struct BookingsFilterOptions {
	pub status: Option<BookingStatus>,
	pub clinic_id: Option<Uuid>,
	pub page: Option<usize>,
	pub limit: Option<usize>,
}

#[allow(non_snake_case)]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FilteredBooking {
	pub booking_id: String,
	pub clinic_id: String,
	pub package_id: Option<String>,
	pub name: Option<String>,
	pub phone: Option<String>,
	pub email: Option<String>,
	pub preferred_date: Option<NaiveDate>,
	pub comment: Option<String>,
	pub status: String,
	#[serde(rename = "createdTs")]
	pub created_ts: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn phone_validation() {
		assert!(is_valid_phone("+373 (22) 12-34-56"));
		assert!(is_valid_phone("069123456"));
		assert!(!is_valid_phone("12345"));
		assert!(!is_valid_phone("call me"));
		assert!(!is_valid_phone("+373 69 123 456 789 0000"));
	}

	#[test]
	fn status_transitions() {
		assert!(BookingStatus::New.can_transition_to(BookingStatus::Confirmed));
		assert!(BookingStatus::New.can_transition_to(BookingStatus::Cancelled));
		assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));
		assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Confirmed));
		assert!(!BookingStatus::Confirmed.can_transition_to(BookingStatus::New));
		assert!(!BookingStatus::New.can_transition_to(BookingStatus::New));
	}

	#[test]
	fn booking_in_the_past_is_rejected() {
		let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
		let mut body = AddBookingSchema {
			clinic_id: Uuid::new_v4(),
			name: "Maria".to_string(),
			phone: "+37369123456".to_string(),
			preferred_date: NaiveDate::from_ymd_opt(2024, 5, 10),
			..Default::default()
		};
		assert!(body.validate(today).is_ok());

		body.preferred_date = NaiveDate::from_ymd_opt(2024, 5, 9);
		assert!(body.validate(today).is_err());
	}

	#[test]
	fn status_parsing() {
		assert_eq!("Confirmed".parse::<BookingStatus>(), Ok(BookingStatus::Confirmed));
		assert!("done".parse::<BookingStatus>().is_err());
	}
}
