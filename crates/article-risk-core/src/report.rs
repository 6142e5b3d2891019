use std::fmt::Write;

use colored::Colorize;
use serde::Serialize;

use crate::analysis::extractor::extract_summary;
use crate::analysis::normalizer::{
    classify_aggregate, classify_category, Category, Classification, Tier, TierStyle,
};
use crate::analysis::{AnalysisResponse, CategoryReport, FoundUrl, RiskLevel};

const BAR_WIDTH: usize = 20;

/// Format styles supported by [`render_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Everything needed to show one analysis, in display order.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayModel {
    pub summary: SummaryBlock,
    pub categories: Vec<CategoryBlock>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryBlock {
    pub level: RiskLevel,
    pub level_label: String,
    pub classification: Classification,
    pub style: TierStyle,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryBlock {
    pub key: String,
    pub label: String,
    pub classification: Classification,
    pub style: TierStyle,
    pub reason: String,
    pub recommendation: String,
    pub related: Vec<RelatedUrl>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelatedUrl {
    pub url: String,
    pub similarity_percent: u32,
}

impl DisplayModel {
    pub fn from_response(response: &AnalysisResponse) -> Self {
        let level = response.risk_level();
        let classification = classify_aggregate(response.final_risk_score);
        let summary = SummaryBlock {
            level,
            level_label: response.display_level_label(),
            classification,
            style: classification.tier.style(),
        };
        let categories = response
            .breakdown
            .iter()
            .map(|(key, report)| CategoryBlock::new(key, report))
            .collect();
        Self {
            summary,
            categories,
        }
    }
}

impl CategoryBlock {
    fn new(key: &str, report: &CategoryReport) -> Self {
        let category = Category::from_key(key);
        let classification = classify_category(&category, report.score);
        Self {
            key: key.to_string(),
            label: category.label().to_string(),
            classification,
            style: classification.tier.style(),
            reason: extract_summary(&report.reason),
            recommendation: report.recommendation.clone(),
            related: report.found_urls.iter().map(RelatedUrl::from).collect(),
        }
    }
}

impl From<&FoundUrl> for RelatedUrl {
    fn from(found: &FoundUrl) -> Self {
        let percent = (found.similarity * 100.0).round();
        Self {
            url: found.url.clone(),
            similarity_percent: if percent.is_nan() {
                0
            } else {
                percent.clamp(0.0, 100.0) as u32
            },
        }
    }
}

/// Produce a report string from a [`DisplayModel`] using the desired format.
pub fn render_report(
    model: &DisplayModel,
    format: OutputFormat,
    color: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => render_human(model, color),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(model)?),
    }
}

fn render_human(model: &DisplayModel, color: bool) -> anyhow::Result<String> {
    let mut out = String::new();
    let summary = &model.summary;
    writeln!(
        out,
        "종합 위험도: {} ({}%)",
        paint(&summary.level_label, summary.style, color),
        summary.classification.rounded_percent()
    )?;
    writeln!(
        out,
        "  {} {}",
        paint(&bar(&summary.classification), summary.style, color),
        tier_tag(summary.classification.tier)
    )?;

    for block in &model.categories {
        writeln!(out)?;
        writeln!(out, "■ {}", block.label)?;
        writeln!(
            out,
            "  점수: {} {}",
            paint(
                &format!("{}%", block.classification.rounded_percent()),
                block.style,
                color
            ),
            tier_tag(block.classification.tier)
        )?;
        writeln!(out, "  {}", paint(&bar(&block.classification), block.style, color))?;
        if !block.reason.trim().is_empty() {
            writeln!(out, "  분석: {}", indent_continuation(&block.reason))?;
        }
        if !block.recommendation.trim().is_empty() {
            writeln!(out, "  권고: {}", indent_continuation(&block.recommendation))?;
        }
        if !block.related.is_empty() {
            writeln!(out, "  관련 기사:")?;
            for related in &block.related {
                writeln!(
                    out,
                    "    - {} (유사도 {}%)",
                    related.url, related.similarity_percent
                )?;
            }
        }
    }

    Ok(out)
}

fn paint(text: &str, style: TierStyle, color: bool) -> String {
    if color {
        text.color(style.terminal).bold().to_string()
    } else {
        text.to_string()
    }
}

fn tier_tag(tier: Tier) -> String {
    format!("[{}]", tier.as_str())
}

fn bar(classification: &Classification) -> String {
    let filled = ((classification.display_percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn indent_continuation(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join("\n        ")
}
