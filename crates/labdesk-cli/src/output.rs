//! Terminal output formatting.

use colored::{ColoredString, Colorize};
use labdesk_core::export;
use labdesk_core::request::model::{ApprovalStatus, MaintenanceRequest};
use labdesk_core::workflow;
use unicode_width::UnicodeWidthStr;

/// Print requests as a table.
pub fn print_requests_table(requests: &[MaintenanceRequest]) {
    if requests.is_empty() {
        println!("{}", "No requests found.".dimmed());
        return;
    }

    println!(
        "{:<10} {:<12} {:<20} {:<8} {:<10}",
        "ID", "Type", "Department", "Step", "Approval"
    );
    println!("{}", "─".repeat(64));

    for req in requests {
        println!(
            "{:<10} {:<12} {:<20} {:<8} {:<10}",
            &req.id[..8.min(req.id.len())],
            req.type_of_problem.as_str(),
            truncate_visual(&req.department, 18),
            format!("{}/6", req.current_step),
            approval_colored(req.admin_approval_status)
        );
    }

    println!();
    println!("{} request(s) total", requests.len());
}

/// Print one request in full: step sections with completion markers.
pub fn print_request(req: &MaintenanceRequest) {
    let width = term_width().min(72);

    println!(
        "{} {}",
        "Maintenance request".bold(),
        req.id.cyan()
    );
    println!(
        "{}: {}   {}: {}   {}: {}",
        "Type".bold(),
        req.type_of_problem.as_str(),
        "Step".bold(),
        format!("{}/6", req.current_step).yellow(),
        "Approval".bold(),
        approval_colored(req.admin_approval_status)
    );
    println!("{}", "─".repeat(width));

    for section in export::snapshot(req) {
        let marker = step_marker(req, section.ordinal);
        println!("{} {} {}", marker, format!("Step {}", section.ordinal).bold(), section.title);

        for field in &section.fields {
            let value: ColoredString = if field.value == export::EMPTY_PLACEHOLDER {
                field.value.dimmed()
            } else {
                field.value.normal()
            };
            println!("    {:<32} {}", field.label, value);
        }
        println!();
    }
}

/// Completion marker for a step: done, current, or pending.
fn step_marker(req: &MaintenanceRequest, ordinal: u8) -> ColoredString {
    if workflow::is_step_complete(req, ordinal).unwrap_or(false) {
        "✓".green().bold()
    } else if req.current_step == ordinal {
        "▸".yellow().bold()
    } else {
        "·".dimmed()
    }
}

fn approval_colored(status: ApprovalStatus) -> ColoredString {
    match status {
        ApprovalStatus::Approved => "approved".green(),
        ApprovalStatus::Rejected => "rejected".red(),
        ApprovalStatus::Unset => "pending".dimmed(),
    }
}

/// Get terminal width, defaulting to 80.
fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Truncate a string respecting visual width.
fn truncate_visual(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 2 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("..");
    result
}
