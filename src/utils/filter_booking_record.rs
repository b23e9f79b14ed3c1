use crate::models::{Booking, FilteredBooking};

pub fn filter_booking_record(booking: &Booking) -> FilteredBooking {
	FilteredBooking {
		booking_id: booking.booking_id.to_string(),
		clinic_id: booking.clinic_id.to_string(),
		package_id: booking.package_id.map(|id| id.to_string()),
		name: booking.name.to_owned(),
		phone: booking.phone.to_owned(),
		email: booking.email.to_owned(),
		preferred_date: booking.preferred_date,
		comment: booking.comment.to_owned(),
		status: booking.status.to_owned(),
		created_ts: booking.created_ts,
	}
}
