//! Clinic scoring.
//!
//! Converts the raw attributes of a clinic (Google rating, review count,
//! doctor experience and amenity flags) into four sub-indices and the
//! weighted `d_score`. Every value is an integer in `[0, 100]`.
//!
//! The functions here are pure: the clinic handlers call [`compute_scores`]
//! on create and update and persist the result.

use serde::{Deserialize, Serialize};

const BASELINE: i32 = 30;
const MAX_INDEX: i32 = 100;

/// `(minimum review count, bonus)`, highest tier first.
const REVIEW_COUNT_TIERS: [(i64, i32); 6] =
	[(200, 30), (100, 25), (50, 20), (20, 15), (10, 10), (5, 5)];

/// `(minimum years of experience, bonus)`, highest tier first.
const EXPERIENCE_TIERS: [(i64, i32); 5] = [(20, 50), (15, 40), (10, 30), (5, 20), (2, 10)];

const LICENSES_BONUS: i32 = 10;
const CERTIFICATES_BONUS: i32 = 10;

const ONLINE_BOOKING_BONUS: i32 = 20;
const EVENING_HOURS_BONUS: i32 = 15;
const URGENT_CARE_BONUS: i32 = 15;
const CONVENIENT_LOCATION_BONUS: i32 = 20;

const INSTALLMENT_BONUS: i32 = 35;
const PROMOTIONS_BONUS: i32 = 35;

/// Weights of the composite score, in percent.
const TRUST_WEIGHT: i32 = 30;
const REVIEWS_WEIGHT: i32 = 25;
const PRICE_WEIGHT: i32 = 25;
const ACCESS_WEIGHT: i32 = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreInput {
	pub google_rating: Option<f64>,
	pub google_reviews_count: Option<i64>,
	pub doctor_experience: Option<i64>,
	pub has_licenses: bool,
	pub has_certificates: bool,
	pub online_booking: bool,
	pub evening_hours: bool,
	pub urgent_care: bool,
	pub convenient_location: bool,
	pub installment_plan: bool,
	pub has_promotions: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scores {
	pub reviews_index: i32,
	pub trust_index: i32,
	pub access_index: i32,
	pub price_index: i32,
	pub d_score: i32,
}

pub fn compute_scores(input: &ScoreInput) -> Scores {
	let reviews_index = reviews_index(input.google_rating, input.google_reviews_count);
	let trust_index = trust_index(
		input.doctor_experience,
		input.has_licenses,
		input.has_certificates,
	);
	let access_index = access_index(input);
	let price_index = price_index(input.installment_plan, input.has_promotions);

	Scores {
		reviews_index,
		trust_index,
		access_index,
		price_index,
		d_score: d_score(trust_index, reviews_index, price_index, access_index),
	}
}

/// Without a positive Google rating the index stays at the baseline.
pub fn reviews_index(google_rating: Option<f64>, google_reviews_count: Option<i64>) -> i32 {
	match google_rating {
		Some(rating) if rating > 0.0 => {
			// epsilon keeps one-decimal ratings like 4.3 from truncating to 51
			let rating_score = ((rating - 3.0) * 40.0 + 1e-9).floor().clamp(0.0, 100.0) as i32;
			let count_bonus = tier_bonus(google_reviews_count.unwrap_or(0), &REVIEW_COUNT_TIERS);

			clamp_index(rating_score + count_bonus)
		}
		_ => BASELINE,
	}
}

pub fn trust_index(doctor_experience: Option<i64>, has_licenses: bool, has_certificates: bool) -> i32 {
	let mut index = BASELINE + tier_bonus(doctor_experience.unwrap_or(0), &EXPERIENCE_TIERS);

	if has_licenses {
		index += LICENSES_BONUS;
	}
	if has_certificates {
		index += CERTIFICATES_BONUS;
	}

	clamp_index(index)
}

pub fn access_index(input: &ScoreInput) -> i32 {
	let bonuses = [
		(input.online_booking, ONLINE_BOOKING_BONUS),
		(input.evening_hours, EVENING_HOURS_BONUS),
		(input.urgent_care, URGENT_CARE_BONUS),
		(input.convenient_location, CONVENIENT_LOCATION_BONUS),
	];

	clamp_index(
		BASELINE
			+ bonuses
				.iter()
				.filter(|(enabled, _)| *enabled)
				.map(|(_, bonus)| bonus)
				.sum::<i32>(),
	)
}

pub fn price_index(installment_plan: bool, has_promotions: bool) -> i32 {
	let mut index = BASELINE;

	if installment_plan {
		index += INSTALLMENT_BONUS;
	}
	if has_promotions {
		index += PROMOTIONS_BONUS;
	}

	clamp_index(index)
}

/// Weighted composite rounded half-up. Computed in hundredths so that
/// `55.75` never turns into `55.749999`.
pub fn d_score(trust_index: i32, reviews_index: i32, price_index: i32, access_index: i32) -> i32 {
	let weighted = trust_index * TRUST_WEIGHT
		+ reviews_index * REVIEWS_WEIGHT
		+ price_index * PRICE_WEIGHT
		+ access_index * ACCESS_WEIGHT;

	clamp_index((weighted + 50).div_euclid(100))
}

fn tier_bonus(value: i64, tiers: &[(i64, i32)]) -> i32 {
	tiers
		.iter()
		.find(|(threshold, _)| value >= *threshold)
		.map(|(_, bonus)| *bonus)
		.unwrap_or(0)
}

fn clamp_index(value: i32) -> i32 {
	value.clamp(0, MAX_INDEX)
}
