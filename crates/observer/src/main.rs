use std::sync::Arc;

use darkest_hour_core::DEFAULT_MAP_CENTER;
use observer::{
    get_config_info, parse_command, render_search, render_viewport, setup_logger,
    FixedGeolocator, Geolocator, HttpGeolocator, NominatimClient, OpenMeteoClient,
    SearchDebouncer, SearchHandle, TerminalCommand, TerminalMap, ViewportController,
    ViewportHandle, HELP,
};
use slog::{info, warn, Logger};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = get_config_info();
    let logger = setup_logger(&cli);

    info!(logger, "Darkest Hour observer starting...");
    info!(logger, "  Forecasts: {}", cli.forecast_url());
    info!(logger, "  Search: {}", cli.search_url());

    let timeout = cli.request_timeout();
    let user_agent = cli.user_agent();
    let forecasts = Arc::new(OpenMeteoClient::new(
        cli.forecast_url(),
        &user_agent,
        timeout,
    )?);
    let places = Arc::new(NominatimClient::new(
        cli.search_url(),
        &user_agent,
        timeout,
    )?);
    let geolocator: Arc<dyn Geolocator> = match cli.start_location() {
        Some(start) => {
            info!(logger, "  Start location: {}", start);
            Arc::new(FixedGeolocator(Some(start)))
        }
        None => {
            info!(logger, "  Geolocation: {}", cli.geo_url());
            Arc::new(HttpGeolocator::new(
                cli.geo_url(),
                &user_agent,
                timeout,
                logger.clone(),
            ))
        }
    };

    let map = Arc::new(TerminalMap::new(DEFAULT_MAP_CENTER));
    let viewport = ViewportController::spawn(
        cli.viewport_settings(),
        map.clone(),
        geolocator,
        forecasts,
        logger.clone(),
    );
    let search = SearchDebouncer::spawn(
        cli.search_debounce(),
        places,
        viewport.clone(),
        logger.clone(),
    );

    println!("{}", HELP);
    let result = run_terminal(&map, &viewport, &search, &logger).await;
    viewport.teardown();
    result
}

async fn run_terminal(
    map: &TerminalMap,
    viewport: &ViewportHandle,
    search: &SearchHandle,
    logger: &Logger,
) -> Result<(), anyhow::Error> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut viewport_rx = viewport.subscribe();
    let mut search_rx = search.subscribe();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(TerminalCommand::Pan(center)) => {
                        map.pan(center);
                        viewport.move_end(center);
                    }
                    Ok(TerminalCommand::Search(query)) => search.set_query(query),
                    Ok(TerminalCommand::Pick(index)) => search.select(index),
                    Ok(TerminalCommand::Clear) => search.set_query(""),
                    Ok(TerminalCommand::Help) => println!("{}", HELP),
                    Ok(TerminalCommand::Quit) => break,
                    Err(msg) if msg.is_empty() => {}
                    Err(msg) => println!("{}", msg),
                }
            }
            changed = viewport_rx.changed() => {
                if changed.is_err() {
                    warn!(logger, "viewport stopped");
                    break;
                }
                let state = viewport_rx.borrow_and_update().clone();
                println!("\n{}", render_viewport(&state));
            }
            changed = search_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = search_rx.borrow_and_update().clone();
                let text = render_search(&state);
                if !text.is_empty() {
                    println!("{}", text);
                }
            }
            _ = signal::ctrl_c() => {
                info!(logger, "interrupted");
                break;
            }
        }
    }
    Ok(())
}
