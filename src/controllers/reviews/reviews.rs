use actix_web::{
	delete, get, patch, post,
	web::{self, Path},
	HttpResponse,
};
use log::{info, warn};
use serde_json::json;
use uuid::Uuid;

use crate::{
	api::CustomError,
	jwt_auth::JwtMiddleware,
	models::{
		limit_offset, AddReviewSchema, Clinic, FilterOptions, FilteredReview, Review, ReviewRow,
		ReviewStatus, ReviewsFilterOptions, UpdateReviewStatusSchema,
	},
	ratings,
	utils::{filter_review_record, filter_review_record_for_moderator},
	AppState,
};

/// Approved reviews of one clinic plus the aggregate over all of them.
#[get("/clinic/{id}/reviews")]
pub async fn get_clinic_reviews_handler(
	path: Path<Uuid>,
	opts: web::Query<FilterOptions>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	let clinic_id = path.into_inner();
	let (limit, offset) = opts.limit_offset();

	Clinic::get_clinic(&data.db, clinic_id).await?;

	let page = ReviewRow::get_by_clinic(
		&data.db,
		clinic_id,
		Some(ReviewStatus::Approved),
		limit,
		offset,
	)
	.await?;
	let approved = ReviewRow::get_approved_by_clinic(&data.db, clinic_id).await?;

	let json_response = json!({
		"status": "success",
		"data": clinic_reviews_payload(page, approved)
	});

	Ok(HttpResponse::Ok().json(json_response))
}

/// `reviews_count` is the number of approved reviews that parse, the same
/// set the ratings are averaged over. Rows with malformed ratings are left
/// out of the page, the count and the ratings alike.
fn clinic_reviews_payload(page: Vec<ReviewRow>, approved: Vec<ReviewRow>) -> serde_json::Value {
	let ratings = ratings::aggregate_rows(approved);

	json!({
		"reviews": &ratings::parse_rows(page).iter().map(filter_review_record).collect::<Vec<FilteredReview>>(),
		"reviews_count": ratings.total_reviews,
		"ratings": ratings
	})
}

/// Submissions land in the moderation queue and do not affect ratings
/// until approved.
#[post("/clinic/{id}/reviews")]
pub async fn add_review_handler(
	path: Path<Uuid>,
	body: web::Json<AddReviewSchema>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	let clinic_id = path.into_inner();

	body.validate().map_err(CustomError::BadRequest)?;
	Clinic::get_clinic(&data.db, clinic_id).await?;

	let row = ReviewRow::insert_review(&data.db, clinic_id, &body).await?;
	let review = Review::try_from(row).map_err(|e| CustomError::Internal(e.to_string()))?;

	info!("Новый отзыв {} для клиники {clinic_id} ожидает модерации", review.review_id);

	let json_response = json!({
		"status": "success",
		"data": json!({
			"review": filter_review_record(&review)
		})
	});

	Ok(HttpResponse::Created().json(json_response))
}

/// `reviews_count` counts stored rows, including rows whose ratings fail
/// to parse; those rows are dropped from the page.
#[get("/reviews")]
pub async fn get_reviews_handler(
	_: JwtMiddleware,
	opts: web::Query<ReviewsFilterOptions>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	let (limit, offset) = limit_offset(opts.page, opts.limit);

	let rows = ReviewRow::get_by_status(&data.db, opts.status, limit, offset).await?;
	let reviews_count = ReviewRow::count_by_status(&data.db, opts.status).await?;

	let json_response = json!({
		"status": "success",
		"data": json!({
			"reviews": &ratings::parse_rows(rows).iter().map(filter_review_record_for_moderator).collect::<Vec<FilteredReview>>(),
			"reviews_count": &reviews_count
		})
	});

	Ok(HttpResponse::Ok().json(json_response))
}

#[patch("/review/{id}")]
pub async fn update_review_status_handler(
	_: JwtMiddleware,
	path: Path<Uuid>,
	body: web::Json<UpdateReviewStatusSchema>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	let review_id = path.into_inner();
	let current = ReviewRow::get_review(&data.db, review_id).await?;

	let status = match current.status.as_deref() {
		Some(raw) => raw
			.parse::<ReviewStatus>()
			.map_err(|e| CustomError::Internal(e.to_string()))?,
		None => ReviewStatus::Pending,
	};

	if !status.can_transition_to(body.status) {
		return Err(CustomError::Conflict(format!(
			"Нельзя перевести отзыв из статуса {status} в {}",
			body.status
		)));
	}

	let row = ReviewRow::update_status(&data.db, review_id, body.status).await?;
	info!("Отзыв {review_id}: {status} -> {}", body.status);

	let json_response = match Review::try_from(row) {
		Ok(review) => json!({
			"status": "success",
			"data": json!({
				"review": filter_review_record_for_moderator(&review)
			})
		}),
		Err(e) => {
			warn!("Отзыв {review_id} содержит некорректные оценки: {e}");
			json!({
				"status": "success",
				"data": json!({
					"review_id": review_id.to_string(),
					"review_status": body.status
				})
			})
		}
	};

	Ok(HttpResponse::Ok().json(json_response))
}

#[delete("/review/{id}")]
pub async fn delete_review_handler(
	_: JwtMiddleware,
	path: Path<Uuid>,
	data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
	let review_id = path.into_inner();

	if ReviewRow::delete_review(&data.db, review_id).await? == 0 {
		return Err(CustomError::NotFound(format!("Отзыв {review_id} не найден")));
	}

	info!("Отзыв {review_id} удалён");

	Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::jwt_auth::tests::test_state;
	use actix_web::{http::StatusCode, test, App};

	fn row(rating: &str) -> ReviewRow {
		ReviewRow {
			review_id: Uuid::new_v4(),
			clinic_id: Uuid::nil(),
			quality: Some(rating.to_string()),
			service: Some(rating.to_string()),
			comfort: Some(rating.to_string()),
			price: Some(rating.to_string()),
			status: Some("approved".to_string()),
			..Default::default()
		}
	}

	#[actix_web::test]
	async fn count_matches_reviews_that_parse() {
		let rows = vec![row("4"), row("5"), row("n/a")];

		let payload = clinic_reviews_payload(rows.clone(), rows);

		assert_eq!(payload["reviews"].as_array().unwrap().len(), 2);
		assert_eq!(payload["reviews_count"], 2);
		assert_eq!(payload["ratings"]["totalReviews"], 2);
		assert_eq!(payload["ratings"]["averageRating"], 4.5);
	}

	#[actix_web::test]
	async fn moderation_queue_requires_a_token() {
		let app = test::init_service(App::new().app_data(test_state()).service(get_reviews_handler)).await;

		let resp = test::call_service(&app, test::TestRequest::get().uri("/reviews").to_request()).await;

		assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
	}

	#[actix_web::test]
	async fn out_of_range_rating_is_rejected() {
		let app = test::init_service(App::new().app_data(test_state()).service(add_review_handler)).await;

		let req = test::TestRequest::post()
			.uri(&format!("/clinic/{}/reviews", Uuid::new_v4()))
			.set_json(json!({
				"quality": 6,
				"service": 5,
				"comfort": 5,
				"price": 5,
				"author_name": "Ion"
			}))
			.to_request();
		let resp = test::call_service(&app, req).await;

		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
	}
}
