use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tracing::info;

use estate_score::config::AppConfig;
use estate_score::domain::{
    Activity, ActivityId, ActivityStatus, ActivityType, Deal, DealId, DealStage, Lead, LeadId,
    Property, PropertyId, PropertyKind, PropertyStatus, TenantId,
};
use estate_score::engine::{engine_router, ScoringEngine};
use estate_score::error::AppError;
use estate_score::gateway::InMemoryGateway;
use estate_score::telemetry;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "estate-score",
    about = "Scoring and forecasting engine for a multi-tenant real-estate CRM",
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
    /// Run the engine over seeded sample data and print the results
    Demo,
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
        Command::Demo => run_demo(),
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

    let (gateway, _) = seeded_gateway(Utc::now());
    let engine = Arc::new(ScoringEngine::new(Arc::new(gateway)));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(engine_router(engine))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "scoring engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
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

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn run_demo() -> Result<(), AppError> {
    let now = Utc::now();
    let (gateway, tenant) = seeded_gateway(now);
    let engine = ScoringEngine::new(Arc::new(gateway));

    println!("Scoring engine demo (tenant '{}')", tenant.0);

    println!("\nLead scores");
    for lead_id in ["lead-100", "lead-101"] {
        let score = engine.score_lead(&LeadId(lead_id.to_string()), &tenant, now)?;
        println!(
            "- {}: {} ({}) [engagement {}, budget {}, timeline {}, source {}, property interest {}]",
            lead_id,
            score.total,
            score.recommendation,
            score.factors.engagement,
            score.factors.budget,
            score.factors.timeline,
            score.factors.source,
            score.factors.property_interest
        );
    }

    let prediction = engine.predict_deal(&DealId("deal-500".to_string()), &tenant, now)?;
    println!("\nDeal deal-500 prediction");
    println!(
        "- {}% probability, predicted close {}",
        prediction.probability, prediction.predicted_close
    );
    for risk in &prediction.risk_factors {
        println!("- risk: {risk}");
    }
    for action in &prediction.recommendations {
        println!("- action: {action}");
    }

    let matches = engine.recommend_properties(&LeadId("lead-100".to_string()), &tenant, None)?;
    println!("\nProperty matches for lead-100");
    for entry in &matches {
        println!(
            "- {} ({}): {} [{}]",
            entry.property_id.0,
            entry.title,
            entry.score,
            entry.reasons.join("; ")
        );
    }

    let forecast = engine.forecast_revenue(&tenant, now.date_naive(), 3)?;
    println!("\nRevenue forecast (confidence {:.1})", forecast.confidence);
    println!(
        "- trailing 12 months: {}",
        forecast
            .monthly_actuals
            .iter()
            .map(|value| format!("{value:.0}"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "- next 3 months: {}",
        forecast
            .projected
            .iter()
            .map(|value| format!("{value:.0}"))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let insights = engine.insights(&tenant)?;
    println!("\nLead insights");
    println!(
        "- {} leads, {} converted ({:.1}%)",
        insights.total_leads, insights.converted_leads, insights.conversion_rate_pct
    );
    for (source, stats) in &insights.by_source {
        println!(
            "- {source}: {}/{} converted ({:.1}%)",
            stats.converted, stats.total, stats.conversion_rate_pct
        );
    }
    for recommendation in &insights.recommendations {
        println!("- {recommendation}");
    }

    Ok(())
}

/// Sample tenant with enough records to exercise every engine component.
fn seeded_gateway(now: DateTime<Utc>) -> (InMemoryGateway, TenantId) {
    let gateway = InMemoryGateway::new();
    let tenant = TenantId("sunrise-realty".to_string());
    let today = now.date_naive();

    gateway.insert_lead(
        &tenant,
        Lead {
            id: LeadId("lead-100".to_string()),
            name: "Dana Whitfield".to_string(),
            notes: "Urgent relocation, wants a luxury apartment near the river".to_string(),
            source: "Referral".to_string(),
            budget: Some(1_000_000.0),
            location_preference: "Downtown Austin riverfront".to_string(),
            kind_preference: Some(PropertyKind::Apartment),
            deal_ids: vec![DealId("deal-500".to_string())],
        },
    );
    gateway.insert_lead(
        &tenant,
        Lead {
            id: LeadId("lead-101".to_string()),
            name: "Miles Okafor".to_string(),
            notes: "Browsing, no timeline yet".to_string(),
            source: "Cold Call".to_string(),
            budget: None,
            location_preference: String::new(),
            kind_preference: None,
            deal_ids: Vec::new(),
        },
    );

    gateway.insert_deal(
        &tenant,
        Deal {
            id: DealId("deal-500".to_string()),
            lead_id: Some(LeadId("lead-100".to_string())),
            stage: DealStage::Negotiation,
            probability: Some(55.0),
            amount: 950_000.0,
            expected_close: Some(today + Duration::days(12)),
            actual_close: None,
            activity_count: 6,
            created_at: today - Duration::days(40),
        },
    );

    // One closed-won deal per trailing month gives the forecaster a clean
    // upward trend.
    for month_back in 0..12i64 {
        let closed_on = today - Duration::days(30 * month_back + 10);
        gateway.insert_deal(
            &tenant,
            Deal {
                id: DealId(format!("deal-won-{month_back}")),
                lead_id: None,
                stage: DealStage::ClosedWon,
                probability: Some(100.0),
                amount: 400_000.0 - month_back as f64 * 15_000.0,
                expected_close: Some(closed_on),
                actual_close: Some(closed_on),
                activity_count: 8,
                created_at: closed_on - Duration::days(45),
            },
        );
    }

    for (index, days_ago, activity_type, status) in [
        (0, 1, ActivityType::Call, ActivityStatus::Completed),
        (1, 2, ActivityType::SiteVisit, ActivityStatus::Completed),
        (2, 4, ActivityType::SiteVisit, ActivityStatus::Completed),
        (3, 6, ActivityType::Email, ActivityStatus::Completed),
        (4, 12, ActivityType::Meeting, ActivityStatus::Completed),
        (5, 20, ActivityType::WhatsApp, ActivityStatus::Scheduled),
    ] {
        gateway.insert_activity(
            &tenant,
            Activity {
                id: ActivityId(format!("act-{index}")),
                activity_type,
                status,
                created_at: now - Duration::days(days_ago),
                lead_id: Some(LeadId("lead-100".to_string())),
                deal_id: Some(DealId("deal-500".to_string())),
            },
        );
    }

    let properties = [
        ("prop-1", "Riverside Tower 18B", Some(1_050_000.0), "Austin", PropertyKind::Apartment, PropertyStatus::Available, true),
        ("prop-2", "Oak Valley Craftsman", Some(685_000.0), "Austin", PropertyKind::Villa, PropertyStatus::Available, false),
        ("prop-3", "Hill Country Estate", Some(2_150_000.0), "Bee Cave", PropertyKind::Villa, PropertyStatus::Available, false),
        ("prop-4", "Lakeside Plot 7", None, "Lakeway", PropertyKind::Plot, PropertyStatus::Available, false),
        ("prop-5", "Downtown Loft 4A", Some(910_000.0), "Austin", PropertyKind::Apartment, PropertyStatus::Sold, false),
    ];
    for (id, title, price, city, kind, status, featured) in properties {
        gateway.insert_property(
            &tenant,
            Property {
                id: PropertyId(id.to_string()),
                title: title.to_string(),
                price,
                city: city.to_string(),
                kind,
                status,
                featured,
            },
        );
    }

    (gateway, tenant)
}
