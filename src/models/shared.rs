use serde::Deserialize;
use sqlx::FromRow;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

#[derive(Deserialize, Debug, Default)]
pub struct FilterOptions {
	pub page: Option<usize>,
	pub limit: Option<usize>,
}

impl FilterOptions {
	pub fn limit_offset(&self) -> (i64, i64) {
		limit_offset(self.page, self.limit)
	}
}

/// Page numbers start at 1; page 0 is treated as the first page.
pub fn limit_offset(page: Option<usize>, limit: Option<usize>) -> (i64, i64) {
	let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
	let offset = page.unwrap_or(1).saturating_sub(1).saturating_mul(limit);

	(limit as i64, i64::try_from(offset).unwrap_or(i64::MAX))
}

#[derive(Deserialize, Debug, FromRow)]
pub struct Count {
	pub count: Option<i64>,
}

/// Interface language. Russian is the default, Romanian the alternative.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
	#[default]
	Ru,
	Ro,
}

impl Lang {
	/// Picks the text in this language, falling back to the other one.
	pub fn pick(&self, ru: &Option<String>, ro: &Option<String>) -> Option<String> {
		let (first, second) = match self {
			Lang::Ru => (ru, ro),
			Lang::Ro => (ro, ru),
		};

		first
			.as_ref()
			.filter(|s| !s.trim().is_empty())
			.or(second.as_ref())
			.cloned()
	}
}

#[derive(Deserialize, Debug, Default)]
pub struct LangOptions {
	pub lang: Option<Lang>,
}
