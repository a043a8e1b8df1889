//! Command handlers. Each prints its result as pretty JSON on stdout.

use std::io::Read;
use std::path::Path;

use aivis_analysis::{response_score, AnalysisService, RunAnalysisResult};
use aivis_core::{BrandId, PromptId};
use serde_json::json;

use crate::runtime::Runtime;

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `None` when no ids were given, meaning "all active prompts".
fn prompt_filter(ids: &[PromptId]) -> Option<&[PromptId]> {
    (!ids.is_empty()).then_some(ids)
}

pub(crate) fn run_detect(runtime: &Runtime, slug: &str, file: Option<&Path>) -> anyhow::Result<()> {
    let brand = runtime.brand(slug)?;
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mentions = runtime.detector.detect_mentions(&text, &brand);
    print_json(&json!({
        "brand": brand.name,
        "score": response_score(&mentions),
        "mentions": mentions,
    }))
}

pub(crate) async fn run_analyze(
    runtime: &Runtime,
    slug: &str,
    prompts: &[PromptId],
    repeat: u32,
) -> anyhow::Result<()> {
    let brand_id = runtime.brand_id(slug)?;
    let service = runtime.analysis_service()?;
    analyze_repeatedly(&service, brand_id, prompts, repeat, print_json).await
}

/// Run `repeat` analyses back to back, waiting out the rate limiter between
/// runs so later runs are not rejected.
pub(crate) async fn analyze_repeatedly<F>(
    service: &AnalysisService,
    brand_id: BrandId,
    prompts: &[PromptId],
    repeat: u32,
    mut on_result: F,
) -> anyhow::Result<()>
where
    F: FnMut(&RunAnalysisResult) -> anyhow::Result<()>,
{
    for run in 1..=repeat.max(1) {
        if run > 1 {
            let wait = service.rate_limit_wait();
            if !wait.is_zero() {
                tracing::info!(run, wait_ms = wait.as_millis(), "waiting for rate limiter");
                tokio::time::sleep(wait).await;
            }
        }
        let result = service
            .run_analysis(brand_id, prompt_filter(prompts))
            .await?;
        tracing::info!(run, success = result.success, "{}", result.message);
        on_result(&result)?;
    }
    Ok(())
}

pub(crate) async fn run_compare(
    runtime: &Runtime,
    slug: &str,
    prompts: &[PromptId],
    models: &[String],
) -> anyhow::Result<()> {
    let brand_id = runtime.brand_id(slug)?;
    let service = runtime.compare_service()?;
    let model_filter = (!models.is_empty()).then_some(models);

    let result = service
        .run_comparison(brand_id, prompt_filter(prompts), model_filter)
        .await?;
    tracing::info!(
        success = result.success,
        calls = result.total_calls,
        "{}",
        result.message
    );
    print_json(&result)
}

pub(crate) async fn run_status(runtime: &Runtime) -> anyhow::Result<()> {
    let analysis = runtime.analysis_service()?.status().await;
    let compare = runtime.compare_service()?;
    let brands: Vec<_> = runtime
        .brands
        .brands
        .iter()
        .map(|b| json!({ "slug": b.slug(), "name": b.name, "competitors": b.competitors }))
        .collect();

    print_json(&json!({
        "environment": runtime.config.env.to_string(),
        "analysis": analysis,
        "comparison_available": compare.is_available().await,
        "comparison_models": compare.model_names(),
        "brands": brands,
        "active_prompts": runtime.brands.prompts.iter().filter(|p| p.active).count(),
    }))
}
