//! Table output for the `check` command

use colored::{ColoredString, Colorize};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::types::{HealthStatus, ResolvedApplication, SyncStatus};

const HEADER: [&str; 8] = [
    "PROJECT",
    "NAME",
    "HEALTH STATUS",
    "SYNC STATUS",
    "AUTO SYNC",
    "CHART",
    "VERSION",
    "LATEST",
];

fn health(status: HealthStatus) -> ColoredString {
    let text = status.to_string();
    match status {
        HealthStatus::Healthy => text.green(),
        HealthStatus::Progressing => text.cyan(),
        HealthStatus::Degraded => text.red(),
        HealthStatus::Missing => text.yellow(),
        HealthStatus::Suspended => text.bright_magenta(),
        HealthStatus::Unknown => text.normal(),
    }
}

fn sync(status: SyncStatus) -> ColoredString {
    let text = status.to_string();
    match status {
        SyncStatus::Synced => text.green(),
        SyncStatus::OutOfSync => text.yellow(),
        SyncStatus::Unknown => text.normal(),
    }
}

/// Render applications as a table
///
/// LATEST shows the newer version in yellow, or the deployed one in green
/// when the application is current.
pub fn render(apps: &[&ResolvedApplication]) -> String {
    let mut builder = Builder::default();
    builder.push_record(HEADER);

    for app in apps {
        let auto_sync = if app.automated {
            "true".bright_cyan().to_string()
        } else {
            String::new()
        };
        let latest = match &app.latest_version {
            Some(latest) => latest.yellow().to_string(),
            None => app.revision.green().to_string(),
        };

        builder.push_record([
            app.project.clone(),
            app.name.clone(),
            health(app.health).to_string(),
            sync(app.sync).to_string(),
            auto_sync,
            app.chart.clone(),
            app.revision.clone(),
            latest,
        ]);
    }

    builder.build().with(Style::blank()).to_string()
}
