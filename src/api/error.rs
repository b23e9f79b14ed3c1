use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomError {
	#[error("{0}")]
	BadRequest(String),

	#[error("Вы не авторизованы")]
	Unauthorized,

	#[error("Недостаточно прав")]
	Forbidden,

	#[error("{0}")]
	NotFound(String),

	#[error("{0}")]
	Conflict(String),

	#[error("Что-то пошло не так во время запроса к базе данных")]
	Database(#[from] sqlx::Error),

	#[error("Что-то пошло не так: {0}")]
	Internal(String),
}

impl ResponseError for CustomError {
	fn status_code(&self) -> StatusCode {
		match self {
			CustomError::BadRequest(_) => StatusCode::BAD_REQUEST,
			CustomError::Unauthorized => StatusCode::UNAUTHORIZED,
			CustomError::Forbidden => StatusCode::FORBIDDEN,
			CustomError::NotFound(_) | CustomError::Database(sqlx::Error::RowNotFound) => {
				StatusCode::NOT_FOUND
			}
			CustomError::Conflict(_) => StatusCode::CONFLICT,
			CustomError::Database(_) | CustomError::Internal(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}

	fn error_response(&self) -> HttpResponse {
		let message = match self {
			CustomError::Database(sqlx::Error::RowNotFound) => "Запись не найдена".to_string(),
			CustomError::Database(e) => {
				error!("{:?}", e);
				self.to_string()
			}
			other => other.to_string(),
		};

		HttpResponse::build(self.status_code()).json(json!({"status": "error", "message": message}))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_codes() {
		assert_eq!(
			CustomError::Database(sqlx::Error::RowNotFound).status_code(),
			StatusCode::NOT_FOUND
		);
		assert_eq!(
			CustomError::Database(sqlx::Error::PoolTimedOut).status_code(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
		assert_eq!(
			CustomError::BadRequest("x".to_string()).status_code(),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(CustomError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
		assert_eq!(
			CustomError::Conflict("x".to_string()).status_code(),
			StatusCode::CONFLICT
		);
	}
}
