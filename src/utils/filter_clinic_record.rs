use crate::models::{Clinic, FilteredClinic, Lang};

pub fn filter_clinic_record(clinic: &Clinic, lang: Lang) -> FilteredClinic {
	FilteredClinic {
		clinic_id: clinic.clinic_id.to_string(),
		name: lang.pick(&clinic.name_ru, &clinic.name_ro),
		address: lang.pick(&clinic.address_ru, &clinic.address_ro),
		city: clinic.city.to_owned(),
		phone: clinic.phone.to_owned(),
		website: clinic.website.to_owned(),
		parking: clinic.parking,
		open_24h: clinic.open_24h,
		weekend_work: clinic.weekend_work,
		installment_plan: clinic.installment_plan,
		urgent_care: clinic.urgent_care,
		online_booking: clinic.online_booking,
		evening_hours: clinic.evening_hours,
		convenient_location: clinic.convenient_location,
		has_licenses: clinic.has_licenses,
		has_certificates: clinic.has_certificates,
		has_promotions: clinic.has_promotions,
		google_rating: clinic.google_rating,
		google_reviews_count: clinic.google_reviews_count,
		doctor_experience: clinic.doctor_experience,
		reviews_index: clinic.reviews_index,
		trust_index: clinic.trust_index,
		access_index: clinic.access_index,
		price_index: clinic.price_index,
		d_score: clinic.d_score,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn picks_romanian_name_and_keeps_scores() {
		let clinic = Clinic {
			name_ru: Some("Улыбка".to_string()),
			name_ro: Some("Zâmbet".to_string()),
			address_ru: Some("ул. Пушкина 1".to_string()),
			d_score: 56,
			..Default::default()
		};

		let filtered = filter_clinic_record(&clinic, Lang::Ro);

		assert_eq!(filtered.name.as_deref(), Some("Zâmbet"));
		assert_eq!(filtered.address.as_deref(), Some("ул. Пушкина 1"));
		assert_eq!(filtered.d_score, 56);

		let json = serde_json::to_value(&filtered).unwrap();
		assert_eq!(json["dScore"], 56);
	}

	#[test]
	fn exposes_every_flag_that_feeds_the_scores() {
		let clinic = Clinic {
			convenient_location: true,
			has_licenses: true,
			has_promotions: true,
			..Default::default()
		};

		let json = serde_json::to_value(filter_clinic_record(&clinic, Lang::Ru)).unwrap();

		assert_eq!(json["convenient_location"], true);
		assert_eq!(json["has_licenses"], true);
		assert_eq!(json["has_certificates"], false);
		assert_eq!(json["has_promotions"], true);
	}
}
