use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Datelike, Local};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tracing::info;

use abi_radar::assessment::{
    assess, assess_profile, assessment_router, CourseType, ExamType, RiskReport, Semester,
    Severity, Subject, UserInputProfile,
};
use abi_radar::config::AppConfig;
use abi_radar::error::AppError;
use abi_radar::telemetry;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Abitur Risk Radar",
    about = "Assess Abitur qualification risk from the command line or as an HTTP service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Assess a profile JSON file and print the risk report
    Assess(AssessArgs),
    /// Render a sample assessment for demos
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct AssessArgs {
    /// Path to a serialized profile (JSON)
    #[arg(long)]
    input: PathBuf,
    /// Emit the raw report as pretty-printed JSON instead of text
    #[arg(long)]
    json: bool,
    /// Include the per-subject score breakdown in the output
    #[arg(long)]
    subjects: bool,
}

#[derive(Args, Debug, Default)]
struct DemoArgs {
    /// Include the per-subject score breakdown in the output
    #[arg(long)]
    subjects: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Assess(args) => run_assess(args),
        Command::Demo(args) => run_demo(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .merge(assessment_router())
        .layer(prometheus_layer)
        .layer(Extension(state));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "abitur risk radar ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.input)?;
    let value: serde_json::Value = serde_json::from_str(&raw).map_err(|err| {
        AppError::Validation(abi_radar::assessment::ValidationErrors::malformed(
            err.to_string(),
        ))
    })?;

    match assess(value) {
        Ok(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                render_report(&report, args.subjects);
            }
            Ok(())
        }
        Err(errors) => {
            eprintln!("profile is not valid:");
            for violation in &errors.violations {
                eprintln!("- {violation}");
            }
            Err(AppError::Validation(errors))
        }
    }
}

fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let profile = demo_profile();
    let report = assess_profile(&profile);
    println!("Abitur risk assessment demo (graduation {})", profile.graduation_year);
    render_report(&report, args.subjects);
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn render_report(report: &RiskReport, list_subjects: bool) {
    println!(
        "Jurisdiction: {} | overall severity: {}",
        report.federal_state, report.overall_severity
    );
    println!(
        "Projected total: {} points, {} deficit semester(s)",
        report.stats.total_projected_points, report.stats.total_deficits
    );

    let risks: Vec<_> = report
        .findings
        .iter()
        .filter(|finding| finding.severity > Severity::Low)
        .collect();
    if risks.is_empty() {
        println!("\nRisk findings: none");
    } else {
        println!("\nRisk findings");
        for finding in risks {
            println!("- [{}] {}", finding.severity, finding.message);
        }
    }

    let positives: Vec<_> = report
        .findings
        .iter()
        .filter(|finding| finding.severity == Severity::Low)
        .collect();
    if positives.is_empty() {
        println!("\nPositive signals: none");
    } else {
        println!("\nPositive signals");
        for finding in positives {
            println!("- {}", finding.message);
        }
    }

    if list_subjects {
        println!("\nSubject breakdown");
        for score in &report.stats.subject_scores {
            println!(
                "- {} | {} course points | {} exam points | {} deficit(s)",
                score.subject_id, score.course_points, score.exam_points, score.deficits
            );
        }
    }
}

fn demo_subject(
    id: &str,
    name: &str,
    course_type: CourseType,
    grades: [u8; 4],
    exam: Option<(ExamType, u8)>,
    is_mandatory: bool,
) -> Subject {
    let semester_grades: BTreeMap<Semester, u8> = Semester::ALL
        .into_iter()
        .zip(grades)
        .collect();

    Subject {
        id: id.to_string(),
        name: name.to_string(),
        course_type,
        is_mandatory,
        is_belegpflichtig: true,
        semester_grades,
        final_exam_grade: exam.map(|(_, grade)| grade),
        confidence: Some(7),
        stress_factors: Default::default(),
        is_exam_subject: exam.is_some(),
        exam_type: exam.map(|(exam_type, _)| exam_type).unwrap_or_default(),
    }
}

/// A well-formed Nordrhein-Westfalen profile: 2 LK, 4 exam subjects, one
/// plain enrollment subject.
fn demo_profile() -> UserInputProfile {
    let graduation_year = (Local::now().year() + 1) as u16;

    UserInputProfile {
        federal_state: abi_radar::assessment::FederalState::NordrheinWestfalen,
        graduation_year,
        subjects: vec![
            demo_subject(
                "de",
                "Deutsch",
                CourseType::Leistungskurs,
                [11, 12, 10, 12],
                Some((ExamType::Written, 11)),
                true,
            ),
            demo_subject(
                "ma",
                "Mathematik",
                CourseType::Leistungskurs,
                [9, 10, 11, 10],
                Some((ExamType::Written, 10)),
                true,
            ),
            demo_subject(
                "en",
                "Englisch",
                CourseType::Grundkurs,
                [12, 11, 12, 13],
                Some((ExamType::Written, 12)),
                false,
            ),
            demo_subject(
                "ge",
                "Geschichte",
                CourseType::Grundkurs,
                [8, 9, 8, 10],
                Some((ExamType::Oral, 9)),
                false,
            ),
            demo_subject(
                "bi",
                "Biologie",
                CourseType::Grundkurs,
                [10, 10, 9, 11],
                None,
                false,
            ),
        ],
        rules_config: None,
    }
}
