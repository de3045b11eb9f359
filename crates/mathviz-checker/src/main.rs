//! `course-check`: verifies every course's registration and exits 0 or 1.

use std::process::ExitCode;

use mathviz_checker::{CheckerConfig, check_catalog};
use mathviz_course_store::CourseLayout;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout is the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match CheckerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            println!("{err}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(root = %config.course_root.display(), "checking course root");

    let layout = CourseLayout::new(config.course_root.clone());
    match check_catalog(&layout, config.options).await {
        Ok(report) => {
            print!("{report}");
            if report.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            println!("course check failed: {err}");
            ExitCode::FAILURE
        }
    }
}
