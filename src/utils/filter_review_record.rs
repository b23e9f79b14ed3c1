use crate::models::{FilteredReview, Review};

pub fn filter_review_record(review: &Review) -> FilteredReview {
	FilteredReview {
		review_id: review.review_id.to_string(),
		clinic_id: review.clinic_id.to_string(),
		quality: review.quality,
		service: review.service,
		comfort: review.comfort,
		price: review.price,
		average_rating: review.average_rating,
		comment: review.comment.to_owned(),
		status: review.status,
		author_name: review.author_name.to_owned(),
		author_phone: None,
		author_email: None,
		created_ts: review.created_ts,
	}
}

/// Same as [`filter_review_record`] plus the author's contacts.
pub fn filter_review_record_for_moderator(review: &Review) -> FilteredReview {
	FilteredReview {
		author_phone: review.author_phone.to_owned(),
		author_email: review.author_email.to_owned(),
		..filter_review_record(review)
	}
}
