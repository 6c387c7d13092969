use anyhow::Result;
use echowx_core::Config;
use echowx_ui::render::{alerts_text, forecast_text};
use echowx_ui::{EchoWxApp, HeadlessMap, MapEvent};
use echowx_weather::{spc_outlook_url, Location};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    echowx_core::init()?;

    let (config, _validation) = Config::load_validated()?;

    let center = Location::new(config.ui.initial_center.lat, config.ui.initial_center.lng);
    let map = HeadlessMap::new(center, config.ui.initial_zoom);

    let mut app = EchoWxApp::new(config, Box::new(map))?;
    app.start().await;
    tracing::info!("EchoWx started");

    // Without a map widget: look up the place named on the command line,
    // or the initial map center.
    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        app.controller()
            .handle_map_event(MapEvent::Click(app.initial_center()))
            .await;
    } else if let Err(e) = app.controller().search(&query).await {
        eprintln!("{}", e.user_message());
    }

    let session = app.controller().session();
    let header = if session.header.is_empty() {
        "Unknown location"
    } else {
        session.header.as_str()
    };
    println!("EchoWx - {}", header);
    if let Some(conditions) = &session.conditions {
        println!("{}\n", conditions);
    }
    println!("{}\n", forecast_text(&session.forecast, 7));
    match alerts_text(&session.alerts) {
        Some(alerts) => println!("Active Alerts\n{}", alerts),
        None => println!("No active alerts."),
    }
    if let Some(url) = spc_outlook_url(1) {
        println!("\nSPC Day 1 outlook: {}", url);
    }
    println!("Favorites: {}", app.favorites().rows().len());

    // Graceful shutdown
    app.shutdown().await;

    Ok(())
}
