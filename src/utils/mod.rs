pub mod filter_booking_record;
pub mod filter_clinic_record;
pub mod filter_package_record;
pub mod filter_review_record;

pub use self::filter_booking_record::filter_booking_record;
pub use self::filter_clinic_record::filter_clinic_record;
pub use self::filter_package_record::filter_package_record;
pub use self::filter_review_record::{filter_review_record, filter_review_record_for_moderator};
