use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

/// One catalog entry. Records are produced by the retrieval adapter and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
	pub section_number: String,
	pub title: String,
	pub summary: String,
	pub keywords: Vec<String>,
	pub full_text: String,
	pub offence_type: OffenceType,
}
impl SectionRecord {
	pub fn key(&self) -> SectionKey<'_> {
		SectionKey::parse(&self.section_number)
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OffenceType {
	#[serde(rename = "Property Crime")]
	PropertyCrime,
	#[serde(rename = "Violent Crime")]
	ViolentCrime,
	#[serde(rename = "Fraud / Cheating")]
	FraudCheating,
	#[serde(rename = "Sexual Offence")]
	SexualOffence,
	#[serde(rename = "Public Servant Offence")]
	PublicServantOffence,
	#[serde(rename = "Abetment")]
	Abetment,
	#[serde(rename = "General Exception")]
	GeneralException,
	#[serde(rename = "Punishment")]
	Punishment,
	#[default]
	#[serde(rename = "Other")]
	Other,
}
impl OffenceType {
	pub const ALL: [Self; 9] = [
		Self::PropertyCrime,
		Self::ViolentCrime,
		Self::FraudCheating,
		Self::SexualOffence,
		Self::PublicServantOffence,
		Self::Abetment,
		Self::GeneralException,
		Self::Punishment,
		Self::Other,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::PropertyCrime => "Property Crime",
			Self::ViolentCrime => "Violent Crime",
			Self::FraudCheating => "Fraud / Cheating",
			Self::SexualOffence => "Sexual Offence",
			Self::PublicServantOffence => "Public Servant Offence",
			Self::Abetment => "Abetment",
			Self::GeneralException => "General Exception",
			Self::Punishment => "Punishment",
			Self::Other => "Other",
		}
	}

	/// Case-insensitive match against the closed label set; anything else is `Other`.
	pub fn from_label(label: &str) -> Self {
		let label = label.trim();

		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str().eq_ignore_ascii_case(label))
			.unwrap_or(Self::Other)
	}
}
impl fmt::Display for OffenceType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Ordering key for section identifiers: leading digits numerically, then whatever follows
/// byte-wise. "120" < "120B" < "121"; an identifier without leading digits has prefix 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionKey<'a> {
	pub number: u64,
	pub suffix: &'a str,
}
impl<'a> SectionKey<'a> {
	pub fn parse(section_number: &'a str) -> Self {
		let trimmed = section_number.trim();
		let digit_end =
			trimmed.bytes().position(|b| !b.is_ascii_digit()).unwrap_or(trimmed.len());
		let number = if digit_end == 0 {
			0
		} else {
			trimmed[..digit_end].parse().unwrap_or(u64::MAX)
		};

		Self { number, suffix: &trimmed[digit_end..] }
	}
}
impl Ord for SectionKey<'_> {
	fn cmp(&self, other: &Self) -> Ordering {
		self.number.cmp(&other.number).then_with(|| self.suffix.cmp(other.suffix))
	}
}
impl PartialOrd for SectionKey<'_> {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
