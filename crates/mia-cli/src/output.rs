//! Terminal output formatting.

use colored::Colorize;
use mia_core::analysis::format_confidence;
use mia_core::image::model::MedicalImage;
use mia_core::patient::model::Patient;
use mia_core::report::model::{Report, ReportStatus};
use mia_core::{AnalysisResult, ResultOrigin, UserProfile};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn print_profile(user: &UserProfile) {
    println!("{} {}", user.display_name().cyan().bold(), format!("({})", user.id).dimmed());
    println!("{}: {}", "Email".bold(), user.email);
    println!("{}: {}", "Role".bold(), user.role.as_str().yellow());
    if let Some(institution) = &user.institution {
        println!("{}: {}", "Institution".bold(), institution);
    }
}

pub fn print_patients_table(patients: &[Patient]) {
    if patients.is_empty() {
        println!("{}", "No patients found.".dimmed());
        return;
    }

    println!("{:<14} {:<28} {:<12} {:<8}", "Patient ID", "Name", "Born", "Gender");
    println!("{}", "─".repeat(65));

    for patient in patients {
        let born = patient
            .date_of_birth
            .as_deref()
            .map(|d| d.get(..10).unwrap_or(d))
            .unwrap_or("-");
        println!(
            "{} {} {:<12} {:<8}",
            pad_right(&truncate(&patient.patient_id, 14), 14),
            pad_right(&truncate(&patient.full_name(), 28), 28),
            born,
            patient.gender.as_deref().unwrap_or("-")
        );
    }

    println!();
    println!("{} patient(s) total", patients.len());
}

pub fn print_images_table(images: &[MedicalImage]) {
    if images.is_empty() {
        println!("{}", "No images found.".dimmed());
        return;
    }

    println!("{:<26} {:<28} {:<14} {:>10}", "ID", "File", "Study", "Size");
    println!("{}", "─".repeat(81));

    for image in images {
        println!(
            "{:<26} {} {:<14} {:>10}",
            truncate(&image.id, 26),
            pad_right(&truncate(&image.file_name, 28), 28),
            image.study_type.as_str(),
            format!("{:.2} MB", image.file_size as f64 / 1024.0 / 1024.0)
        );
    }
}

pub fn print_reports_table(reports: &[Report]) {
    if reports.is_empty() {
        println!("{}", "No reports found.".dimmed());
        return;
    }

    println!("{:<26} {:<14} {:<10} {:<4} {:<30}", "ID", "Study", "Status", "Ver", "Impression");
    println!("{}", "─".repeat(88));

    for report in reports {
        let status = match report.status {
            ReportStatus::Draft => "draft".dimmed(),
            ReportStatus::Finalized => "finalized".green(),
            ReportStatus::Reviewed => "reviewed".cyan(),
        };
        println!(
            "{:<26} {:<14} {:<10} {:<4} {}",
            truncate(&report.id, 26),
            report.study_type.as_str(),
            status,
            report.version,
            truncate(&report.impression, 30)
        );
    }
}

pub fn print_analysis(result: &AnalysisResult) {
    let origin = match result.origin {
        ResultOrigin::Remote => "remote".green(),
        ResultOrigin::Fallback => "fallback".yellow(),
    };
    println!();
    println!("{}", result.report_text.trim_end());
    println!();
    println!(
        "{}: {}  {}: {}",
        "Confidence".bold(),
        format_confidence(result.confidence_score),
        "Source".bold(),
        origin
    );
}

/// Pad to a visual width.
fn pad_right(s: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(s);
    if visual >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visual))
    }
}

/// Truncate a string respecting visual width.
fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 2 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("..");
    result
}
