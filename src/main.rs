use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use seat_booking::{
    config::Config,
    layout::GridCell,
    models::{PerformanceId, RoundId},
    BackendClient, BookingSession, SeatStatus,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::load().context("Failed to load configuration")?;

    let json = config.app.log_json;
    tracing_subscriber::registry()
        .with(EnvFilter::new(&config.app.rust_log))
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(performance_id), Some(round_id)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: seat_booking <performance_id> <round_id>");
    };

    info!("Starting seat booking client ({})", config.app.environment);

    let client = BackendClient::from_config(&config)?;
    let mut session = BookingSession::open(
        &client,
        &config,
        PerformanceId::new(performance_id),
        RoundId::new(round_id),
    )
    .await?;

    info!(
        "{} / {}",
        session.detail().title,
        session.round().start_text().unwrap_or_else(|| "-".to_string())
    );
    for (idx, info) in session.catalog().iter().enumerate() {
        info!("Grade #{} {} {}원 {}", idx + 1, info.grade.name, info.grade.price, info.color);
    }

    let Some(area_id) = session.areas().first().map(|a| a.id.clone()) else {
        warn!("Performance has no seat areas");
        return Ok(());
    };
    session.enter_area(&area_id).await?;

    let layout = session.layout()?;
    let (mut available, mut unavailable, mut unknown) = (0, 0, 0);
    for (_, _, cell) in layout.cells() {
        if let GridCell::Seat(seat) = cell {
            match session.seat_status(&seat.id) {
                SeatStatus::Available | SeatStatus::Selected => available += 1,
                SeatStatus::Unavailable => unavailable += 1,
                SeatStatus::Unknown => unknown += 1,
            }
        }
    }

    info!(
        "Area {}: {} available, {} unavailable, {} without ticket",
        layout.area().display_name(),
        available,
        unavailable,
        unknown
    );

    let (state, failures) = client.circuit_breaker_status();
    info!("Circuit breaker: {:?} ({} failures)", state, failures);
    Ok(())
}
