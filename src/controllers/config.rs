use actix_web::web;

use crate::controllers::auth::{login_handler, logout_handler};
use crate::controllers::bookings::{
	add_booking_handler, get_bookings_handler, update_booking_status_handler,
};
use crate::controllers::cache_settings::{
	get_cache_settings_handler, update_cache_settings_handler,
};
use crate::controllers::clinics::{
	add_clinic_handler, delete_clinic_handler, get_clinic_handler, get_clinics_handler,
	update_clinic_handler,
};
use crate::controllers::packages::{
	add_package_handler, delete_package_handler, get_packages_handler,
};
use crate::controllers::reviews::{
	add_review_handler, delete_review_handler, get_clinic_reviews_handler, get_reviews_handler,
	update_review_status_handler,
};

pub fn config(conf: &mut web::ServiceConfig) {
	let scope = web::scope("/api")
		.service(login_handler)
		.service(logout_handler)
		.service(get_clinics_handler)
		.service(add_clinic_handler)
		.service(get_clinic_handler)
		.service(update_clinic_handler)
		.service(delete_clinic_handler)
		.service(get_packages_handler)
		.service(add_package_handler)
		.service(delete_package_handler)
		.service(get_clinic_reviews_handler)
		.service(add_review_handler)
		.service(get_reviews_handler)
		.service(update_review_status_handler)
		.service(delete_review_handler)
		.service(add_booking_handler)
		.service(get_bookings_handler)
		.service(update_booking_status_handler)
		.service(get_cache_settings_handler)
		.service(update_cache_settings_handler);

	conf.service(scope);
}
