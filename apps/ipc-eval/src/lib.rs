//! Offline evaluation against the live collaborators: retrieval hit@K, run-to-run stability
//! of full predictions, and latency.

use std::{
	fs,
	path::{Path, PathBuf},
	time::Instant,
};

use clap::Parser;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};

use ipc_domain::{PredictionResult, RankedCandidate};
use ipc_service::{IpcService, PredictionFailure};

#[derive(Debug, Parser)]
#[command(
	version = ipc_cli::VERSION,
	rename_all = "kebab",
	styles = ipc_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, short = 'd', value_name = "FILE")]
	pub dataset: PathBuf,
	#[arg(
		long,
		value_name = "N",
		default_value_t = 1,
		value_parser = clap::value_parser!(u32).range(1..)
	)]
	pub runs_per_query: u32,
}

#[derive(Debug, Deserialize)]
pub struct EvalDataset {
	pub name: Option<String>,
	pub cases: Vec<EvalCase>,
}

#[derive(Debug, Deserialize)]
pub struct EvalCase {
	pub id: Option<String>,
	pub text: String,
	pub expected_section: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EvalOutput {
	pub dataset: EvalDatasetInfo,
	pub settings: EvalSettings,
	pub summary: EvalSummary,
	pub cases: Vec<CaseReport>,
}

#[derive(Debug, Serialize)]
pub struct EvalDatasetInfo {
	pub name: String,
	pub case_count: usize,
}

#[derive(Debug, Serialize)]
pub struct EvalSettings {
	pub config_path: String,
	pub top_k: u32,
	pub similarity_threshold: f32,
	pub runs_per_query: u32,
}

#[derive(Debug, Serialize)]
pub struct EvalSummary {
	/// Cases carrying an `expected_section`; only these count toward hit@K.
	pub labelled_cases: usize,
	pub hit_at_k: f64,
	pub stable_cases: usize,
	pub stability_rate: f64,
	pub fallback_cases: usize,
	pub latency_ms_p50: f64,
	pub latency_ms_p95: f64,
}

#[derive(Debug, Serialize)]
pub struct CaseReport {
	pub id: String,
	pub text: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub expected_section: Option<String>,
	pub retrieved_sections: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub retrieval_error: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hit: Option<bool>,
	pub prediction: PredictionResult,
	pub stable: bool,
	pub latency_ms: f64,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = ipc_config::load(&args.config)?;

	ipc_cli::init_tracing(&config.service.log_level);

	let dataset = load_dataset(&args.dataset)?;
	let service = IpcService::connect(config)?;
	let config_path = args.config.display().to_string();
	let output = evaluate(&service, &dataset, config_path, args.runs_per_query).await;
	let json = serde_json::to_string_pretty(&output)?;

	println!("{json}");

	Ok(())
}

pub fn load_dataset(path: &Path) -> color_eyre::Result<EvalDataset> {
	let raw = fs::read_to_string(path)?;
	let dataset: EvalDataset = serde_json::from_str(&raw)?;

	if dataset.cases.is_empty() {
		return Err(eyre::eyre!("Dataset {} contains no cases.", path.display()));
	}

	Ok(dataset)
}

pub async fn evaluate(
	service: &IpcService,
	dataset: &EvalDataset,
	config_path: String,
	runs_per_query: u32,
) -> EvalOutput {
	let runs = runs_per_query.max(1);
	let mut cases = Vec::with_capacity(dataset.cases.len());
	let mut latencies = Vec::new();

	for (idx, case) in dataset.cases.iter().enumerate() {
		let id = case.id.clone().unwrap_or_else(|| format!("case-{}", idx + 1));
		let (retrieved_sections, retrieval_error) =
			retrieval_outcome(service.retrieve(&case.text).await);
		let hit = case.expected_section.as_deref().map(|expected| {
			retrieved_sections.iter().any(|section| section.trim() == expected.trim())
		});
		let mut predictions = Vec::with_capacity(runs as usize);
		let mut case_latencies = Vec::with_capacity(runs as usize);

		for _ in 0..runs {
			let started = Instant::now();
			let prediction = service.predict(&case.text).await;

			case_latencies.push(started.elapsed().as_secs_f64() * 1_000.0);
			predictions.push(prediction);
		}

		let stable = predictions.windows(2).all(|pair| pair[0] == pair[1]);
		let latency_ms = case_latencies.iter().sum::<f64>() / case_latencies.len() as f64;
		let Some(prediction) = predictions.into_iter().next() else { continue };

		tracing::debug!(case = %id, ?hit, stable, "Case evaluated.");

		latencies.extend(case_latencies);
		cases.push(CaseReport {
			id,
			text: case.text.clone(),
			expected_section: case.expected_section.clone(),
			retrieved_sections,
			retrieval_error,
			hit,
			prediction,
			stable,
			latency_ms,
		});
	}

	latencies.sort_by(f64::total_cmp);

	let labelled: Vec<bool> = cases.iter().filter_map(|case| case.hit).collect();
	let stable_cases = cases.iter().filter(|case| case.stable).count();
	let summary = EvalSummary {
		labelled_cases: labelled.len(),
		hit_at_k: ratio(labelled.iter().filter(|hit| **hit).count(), labelled.len()),
		stable_cases,
		stability_rate: ratio(stable_cases, cases.len()),
		fallback_cases: cases.iter().filter(|case| case.prediction.is_fallback()).count(),
		latency_ms_p50: percentile(&latencies, 0.50),
		latency_ms_p95: percentile(&latencies, 0.95),
	};

	EvalOutput {
		dataset: EvalDatasetInfo {
			name: dataset.name.clone().unwrap_or_else(|| "unnamed".to_string()),
			case_count: dataset.cases.len(),
		},
		settings: EvalSettings {
			config_path,
			top_k: service.cfg.prediction.top_k,
			similarity_threshold: service.cfg.prediction.similarity_threshold,
			runs_per_query: runs,
		},
		summary,
		cases,
	}
}

/// Section identifiers in rank order, or the failure text when retrieval did not complete.
fn retrieval_outcome(
	result: Result<Vec<RankedCandidate>, PredictionFailure>,
) -> (Vec<String>, Option<String>) {
	match result {
		Ok(ranked) =>
			(ranked.into_iter().map(|candidate| candidate.record.section_number).collect(), None),
		Err(err) => (Vec::new(), Some(err.to_string())),
	}
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
	if denominator == 0 {
		return 0.0;
	}

	numerator as f64 / denominator as f64
}

/// Linear interpolation between closest ranks; `values` must be sorted.
fn percentile(values: &[f64], percentile: f64) -> f64 {
	if values.is_empty() {
		return 0.0;
	}

	let clamped = percentile.clamp(0.0, 1.0);
	let pos = clamped * (values.len() as f64 - 1.0);
	let lower = pos.floor() as usize;
	let upper = pos.ceil() as usize;

	if lower == upper {
		values[lower]
	} else {
		let weight = pos - lower as f64;

		values[lower] * (1.0 - weight) + values[upper] * weight
	}
}
