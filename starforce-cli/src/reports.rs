use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

use starforce_core::numbers::{group_thousands, round_f64_to_i64};
use starforce_core::{CalculationRequest, Estimate, LevelBreakdown};

/// Serializable bundle of a request and its estimate.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub request: &'a CalculationRequest,
    pub odds_source: &'a str,
    pub expected_cost: i64,
    pub estimate: &'a Estimate,
}

impl<'a> Report<'a> {
    pub fn new(
        request: &'a CalculationRequest,
        odds_source: &'a str,
        estimate: &'a Estimate,
    ) -> Self {
        Self {
            request,
            odds_source,
            expected_cost: estimate.rounded_cost(),
            estimate,
        }
    }
}

fn enabled_options(request: &CalculationRequest) -> Vec<&'static str> {
    let options = &request.options;
    [
        (options.guaranteed_milestones, "5/10/15 guaranteed"),
        (options.double_step_early, "+2 levels up to 10"),
        (options.discount30, "30% off"),
        (options.star_catching, "star catching"),
        (options.safeguard, "safeguard"),
    ]
    .into_iter()
    .filter_map(|(on, label)| on.then_some(label))
    .collect()
}

fn options_label(request: &CalculationRequest) -> String {
    let enabled = enabled_options(request);
    if enabled.is_empty() {
        "none".to_string()
    } else {
        enabled.join(", ")
    }
}

fn breakdown_cost(row: &LevelBreakdown) -> String {
    if row.attempted {
        group_thousands(round_f64_to_i64(row.expected_cost))
    } else {
        "skipped".to_string()
    }
}

pub fn generate_console_report(
    out: &mut dyn Write,
    report: &Report<'_>,
    include_breakdown: bool,
) -> Result<()> {
    let request = report.request;
    let estimate = report.estimate;

    writeln!(out)?;
    writeln!(out, "{}", "⭐ Star Force Estimate".bright_cyan().bold())?;
    writeln!(out, "{}", "======================".cyan())?;
    writeln!(out, "Item level: {}", request.item_strength)?;
    writeln!(
        out,
        "Levels: {} -> {}",
        request.start_level, request.target_level
    )?;
    writeln!(out, "Discount: {}", request.discount)?;
    writeln!(out, "Options: {}", options_label(request))?;
    writeln!(out, "Odds: {}", report.odds_source)?;
    writeln!(out)?;
    writeln!(
        out,
        "The expected cost is: {}",
        group_thousands(report.expected_cost).bright_yellow().bold()
    )?;
    writeln!(
        out,
        "Expected number of destructions: {}",
        estimate.total_expected_destroys
    )?;
    writeln!(
        out,
        "P(no destruction): {}",
        estimate.destruction_free_prob.to_string().green()
    )?;

    if include_breakdown && !estimate.levels.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "📈 Per-level breakdown".bright_yellow().bold())?;
        writeln!(out, "{}", "----------------------".yellow())?;
        writeln!(
            out,
            "{:>5}  {:>22}  {:>12}  {:>12}",
            "level", "expected cost", "p(no boom)", "destroys"
        )?;
        for row in &estimate.levels {
            writeln!(
                out,
                "{:>5}  {:>22}  {:>12.6}  {:>12.6}",
                row.level,
                breakdown_cost(row),
                row.destruction_free_prob,
                row.expected_destroys
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, report: &Report<'_>) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    report: &Report<'_>,
    include_breakdown: bool,
) -> Result<()> {
    let request = report.request;
    let estimate = report.estimate;

    writeln!(out, "# Star Force Estimate\n")?;
    writeln!(out, "## Request\n")?;
    writeln!(out, "- **Item level**: {}", request.item_strength)?;
    writeln!(
        out,
        "- **Levels**: {} -> {}",
        request.start_level, request.target_level
    )?;
    writeln!(out, "- **Discount**: {}", request.discount)?;
    writeln!(out, "- **Options**: {}", options_label(request))?;
    writeln!(out, "- **Odds**: {}\n", report.odds_source)?;

    writeln!(out, "## Result\n")?;
    writeln!(
        out,
        "- **Expected cost**: {}",
        group_thousands(report.expected_cost)
    )?;
    writeln!(
        out,
        "- **Expected destructions**: {}",
        estimate.total_expected_destroys
    )?;
    writeln!(
        out,
        "- **P(no destruction)**: {}",
        estimate.destruction_free_prob
    )?;

    if include_breakdown && !estimate.levels.is_empty() {
        writeln!(out, "\n## Per-level breakdown\n")?;
        writeln!(out, "| Level | Expected cost | P(no destruction) | Destroys |")?;
        writeln!(out, "|------:|--------------:|------------------:|---------:|")?;
        for row in &estimate.levels {
            writeln!(
                out,
                "| {} | {} | {:.6} | {:.6} |",
                row.level,
                breakdown_cost(row),
                row.destruction_free_prob,
                row.expected_destroys
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use starforce_core::{DiscountTier, OptionSet, estimate};

    fn sample_request() -> CalculationRequest {
        CalculationRequest {
            item_strength: 150,
            start_level: 0,
            target_level: 5,
            options: OptionSet {
                double_step_early: true,
                safeguard: true,
                ..OptionSet::none()
            },
            discount: DiscountTier::Gold,
        }
    }

    fn render<F>(write_report: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        write_report(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn options_label_lists_enabled_options() {
        assert_eq!(options_label(&sample_request()), "+2 levels up to 10, safeguard");
        let plain = CalculationRequest {
            options: OptionSet::none(),
            ..sample_request()
        };
        assert_eq!(options_label(&plain), "none");
    }

    #[test]
    fn console_report_includes_totals_and_breakdown() {
        let request = sample_request();
        let estimate = estimate(&request).unwrap();
        let report = Report::new(&request, "built-in", &estimate);
        let text = render(|out| generate_console_report(out, &report, true));
        assert!(text.contains("The expected cost is: "));
        assert!(text.contains("Per-level breakdown"));
        assert!(text.contains("skipped"));
        assert!(text.contains("MVP Gold"));
    }

    #[test]
    fn json_report_round_trips_estimate() {
        let request = sample_request();
        let estimate = estimate(&request).unwrap();
        let report = Report::new(&request, "built-in", &estimate);
        let text = render(|out| generate_json_report(out, &report));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["expected_cost"], estimate.rounded_cost());
        assert_eq!(value["request"]["discount"], "gold");
        assert_eq!(value["estimate"]["levels"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn markdown_report_omits_breakdown_when_not_requested() {
        let request = sample_request();
        let estimate = estimate(&request).unwrap();
        let report = Report::new(&request, "built-in", &estimate);
        let text = render(|out| generate_markdown_report(out, &report, false));
        assert!(text.starts_with("# Star Force Estimate"));
        assert!(!text.contains("Per-level breakdown"));
    }
}
