//! "Real" clinic ratings computed from moderated visitor reviews.
//!
//! Only approved reviews count. Raw rows go through the
//! `ReviewRow -> Review` conversion first; rows with unparsable ratings are
//! left out of the averages entirely.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::models::{Review, ReviewRow, ReviewStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicRatings {
	pub has_rating: bool,
	pub quality: f64,
	pub service: f64,
	pub comfort: f64,
	pub price: f64,
	pub average_rating: f64,
	pub total_reviews: usize,
}

pub fn aggregate(reviews: &[Review]) -> ClinicRatings {
	let approved: Vec<&Review> = reviews
		.iter()
		.filter(|review| review.status == ReviewStatus::Approved)
		.collect();

	if approved.is_empty() {
		return ClinicRatings::default();
	}

	let count = approved.len() as f64;
	let mean = |pick: fn(&Review) -> f64| approved.iter().map(|r| pick(r)).sum::<f64>() / count;

	ClinicRatings {
		has_rating: true,
		quality: mean(|r| r.quality),
		service: mean(|r| r.service),
		comfort: mean(|r| r.comfort),
		price: mean(|r| r.price),
		average_rating: mean(|r| r.average_rating),
		total_reviews: approved.len(),
	}
}

/// Parses raw rows and aggregates the valid ones.
pub fn aggregate_rows(rows: Vec<ReviewRow>) -> ClinicRatings {
	aggregate(&parse_rows(rows))
}

pub fn parse_rows(rows: Vec<ReviewRow>) -> Vec<Review> {
	rows.into_iter()
		.filter_map(|row| {
			let review_id = row.review_id;
			Review::try_from(row)
				.map_err(|e| warn!("skipping review {review_id}: {e}"))
				.ok()
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use uuid::Uuid;

	fn review(average: f64, status: ReviewStatus) -> Review {
		Review {
			review_id: Uuid::new_v4(),
			clinic_id: Uuid::nil(),
			quality: average,
			service: average,
			comfort: average,
			price: average,
			average_rating: average,
			comment: None,
			status,
			author_name: None,
			author_phone: None,
			author_email: None,
			created_ts: None,
			updated_ts: None,
		}
	}

	fn raw(values: [&str; 4], status: &str) -> ReviewRow {
		ReviewRow {
			review_id: Uuid::new_v4(),
			clinic_id: Uuid::nil(),
			quality: Some(values[0].to_string()),
			service: Some(values[1].to_string()),
			comfort: Some(values[2].to_string()),
			price: Some(values[3].to_string()),
			status: Some(status.to_string()),
			..Default::default()
		}
	}

	#[test]
	fn no_reviews_means_no_rating() {
		let ratings = aggregate(&[]);

		assert!(!ratings.has_rating);
		assert_eq!(ratings.total_reviews, 0);
		assert_eq!(ratings.average_rating, 0.0);
		assert_eq!(ratings.quality, 0.0);
	}

	#[test]
	fn only_unapproved_reviews_means_no_rating() {
		let ratings = aggregate(&[
			review(5.0, ReviewStatus::Pending),
			review(1.0, ReviewStatus::Rejected),
		]);

		assert_eq!(ratings, ClinicRatings::default());
	}

	#[test]
	fn averages_of_two_approved_reviews() {
		let ratings = aggregate(&[
			review(4.0, ReviewStatus::Approved),
			review(5.0, ReviewStatus::Approved),
		]);

		assert!(ratings.has_rating);
		assert_eq!(ratings.average_rating, 4.5);
		assert_eq!(ratings.total_reviews, 2);
	}

	#[test]
	fn pending_and_rejected_reviews_do_not_count() {
		let ratings = aggregate(&[
			review(4.0, ReviewStatus::Approved),
			review(1.0, ReviewStatus::Pending),
			review(1.0, ReviewStatus::Rejected),
		]);

		assert_eq!(ratings.average_rating, 4.0);
		assert_eq!(ratings.total_reviews, 1);
	}

	#[test]
	fn sub_ratings_are_averaged_independently() {
		let rows = vec![
			raw(["5", "4", "3", "2"], "approved"),
			raw(["3", "4", "5", "4"], "approved"),
		];

		let ratings = aggregate_rows(rows);

		assert_eq!(ratings.quality, 4.0);
		assert_eq!(ratings.service, 4.0);
		assert_eq!(ratings.comfort, 4.0);
		assert_eq!(ratings.price, 3.0);
		assert_eq!(ratings.average_rating, 3.75);
	}

	#[test]
	fn malformed_rows_are_excluded_not_zeroed() {
		let rows = vec![
			raw(["4", "4", "4", "4"], "approved"),
			raw(["oops", "4", "4", "4"], "approved"),
			raw(["5.0", "5.0", "5.0", "5.0"], "approved"),
		];

		let ratings = aggregate_rows(rows);

		assert_eq!(ratings.total_reviews, 2);
		assert_eq!(ratings.average_rating, 4.5);
	}

	#[test]
	fn camel_case_json() {
		let json = serde_json::to_value(aggregate(&[])).unwrap();

		assert_eq!(json["hasRating"], false);
		assert_eq!(json["totalReviews"], 0);
	}
}
