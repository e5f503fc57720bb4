//! Payload decoding for section points.
//!
//! Ingestion pipelines have stored `keywords` as a list, as a JSON-encoded list, and as a
//! comma-separated string; all three decode to the same `Vec<String>`.

use std::collections::HashMap;

use qdrant_client::qdrant::{Value, value::Kind};

use ipc_domain::{OffenceType, SectionRecord};

pub fn decode_section(payload: &HashMap<String, Value>) -> Option<SectionRecord> {
	let Some(section_number) = payload_section_number(payload) else {
		tracing::warn!("Section point missing section_number.");

		return None;
	};

	Some(SectionRecord {
		title: payload_string(payload, "title").unwrap_or_default(),
		summary: payload_string(payload, "summary").unwrap_or_default(),
		keywords: payload_keywords(payload),
		full_text: payload_string(payload, "full_text").unwrap_or_default(),
		offence_type: payload_string(payload, "offence_type")
			.map(|label| OffenceType::from_label(&label))
			.unwrap_or_default(),
		section_number,
	})
}

pub fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.to_string()),
		_ => None,
	}
}

fn payload_section_number(payload: &HashMap<String, Value>) -> Option<String> {
	let value = payload.get("section_number")?;
	let number = match &value.kind {
		Some(Kind::StringValue(text)) => text.trim().to_string(),
		Some(Kind::IntegerValue(number)) => number.to_string(),
		Some(Kind::DoubleValue(number)) if number.fract() == 0.0 => (*number as i64).to_string(),
		_ => return None,
	};

	(!number.is_empty()).then_some(number)
}

pub fn payload_keywords(payload: &HashMap<String, Value>) -> Vec<String> {
	let Some(value) = payload.get("keywords") else { return Vec::new() };

	match &value.kind {
		Some(Kind::ListValue(list)) => clean(list.values.iter().filter_map(|item| match &item.kind {
			Some(Kind::StringValue(text)) => Some(text.as_str()),
			_ => None,
		})),
		Some(Kind::StringValue(text)) => split_keywords(text),
		_ => Vec::new(),
	}
}

fn split_keywords(raw: &str) -> Vec<String> {
	if let Ok(items) = serde_json::from_str::<Vec<String>>(raw) {
		return clean(items.iter().map(String::as_str));
	}

	clean(raw.split(','))
}

fn clean<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
	items.map(str::trim).filter(|item| !item.is_empty()).map(str::to_string).collect()
}
