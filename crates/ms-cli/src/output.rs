use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use ms_core::models::JobStatus;
use ms_core::services::jobs::JobSummary;
use ms_core::services::pipeline::StepEvent;

/// Draws a spinner for the running deployment step and a mark once it ends.
#[derive(Default)]
pub struct StepProgress {
    spinner: Option<ProgressBar>,
}

impl StepProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: StepEvent) {
        match event {
            StepEvent::Started(step) => {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(
                    ProgressStyle::with_template("{spinner:.cyan} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                spinner.set_message(step.name());
                spinner.enable_steady_tick(Duration::from_millis(100));
                self.spinner = Some(spinner);
            }
            StepEvent::Finished(step) => {
                self.clear();
                println!("{} {}", "✓".green(), step.name());
            }
            StepEvent::Failed(step) => {
                self.clear();
                println!("{} {}", "✗".red(), step.name().red());
            }
        }
    }

    fn clear(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

pub fn status_indicator(status: &JobStatus) -> &'static str {
    match status {
        JobStatus::Running => "🟢",
        JobStatus::Warning => "🟡",
        JobStatus::Failed => "🔴",
        JobStatus::Stopped => "⚫",
        JobStatus::Other(_) => "⚪",
    }
}

/// Plain-text table of jobs, columns padded to their widest cell.
pub fn render_job_table(jobs: &[JobSummary]) -> String {
    if jobs.is_empty() {
        return "No manuscript jobs found.".to_string();
    }

    let header = [
        "NAME".to_string(),
        "STATUS".to_string(),
        "RUNNING FOR".to_string(),
        "GRAPHQL ENDPOINT".to_string(),
    ];
    let rows: Vec<[String; 4]> = jobs
        .iter()
        .map(|job| {
            [
                job.name.clone(),
                format!("{} {}", status_indicator(&job.status), job.status),
                non_empty_or_dash(&job.running_for),
                job.graphql_endpoint.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    let mut widths = [0usize; 4];
    for row in std::iter::once(&header).chain(rows.iter()) {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    std::iter::once(&header)
        .chain(rows.iter())
        .map(|row| {
            let line: Vec<String> = row
                .iter()
                .zip(widths.iter())
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect();
            line.join("  ").trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn non_empty_or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}
