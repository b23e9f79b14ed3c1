use crate::models::{FilteredPackage, Lang, Package};

pub fn filter_package_record(package: &Package, lang: Lang) -> FilteredPackage {
	FilteredPackage {
		package_id: package.package_id.to_string(),
		clinic_id: package.clinic_id.to_string(),
		name: lang.pick(&package.name_ru, &package.name_ro),
		description: lang.pick(&package.description_ru, &package.description_ro),
		price: package.price,
		old_price: package.old_price,
		discount: discount_percent(package.price, package.old_price),
	}
}

fn discount_percent(price: i32, old_price: Option<i32>) -> Option<i32> {
	let old_price = old_price.filter(|old| *old > price && *old > 0)?;

	Some(((old_price - price) as i64 * 100 / old_price as i64) as i32)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn discount_is_rounded_down() {
		assert_eq!(discount_percent(700, Some(1000)), Some(30));
		assert_eq!(discount_percent(666, Some(1000)), Some(33));
		assert_eq!(discount_percent(1000, Some(1000)), None);
		assert_eq!(discount_percent(500, None), None);
	}
}
