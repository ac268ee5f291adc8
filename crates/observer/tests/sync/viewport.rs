use std::sync::Arc;
use std::time::Duration;

use darkest_hour_core::{Coordinate, DEFAULT_MAP_CENTER};
use observer::{FetchError, FixedGeolocator, Phase, ViewportController};
use tokio::time::sleep;

use crate::helpers::{
    forecast_for, logger, settings, still_map, temperature, wait_until, MockMap,
    ScriptedForecasts, FLY,
};

const HOME: Coordinate = Coordinate::new(-111.65, 35.2);
const AWAY: Coordinate = Coordinate::new(2.35, 48.85);
const SLOW: Coordinate = Coordinate::new(-155.47, 19.82);
const FAST: Coordinate = Coordinate::new(-70.4, -24.6);

#[tokio::test(start_paused = true)]
async fn settles_on_default_center_without_geolocation() {
    let forecasts = ScriptedForecasts::instant();
    let viewport = ViewportController::spawn(
        settings(),
        Arc::new(still_map(DEFAULT_MAP_CENTER)),
        Arc::new(FixedGeolocator(None)),
        forecasts.clone(),
        logger(),
    );

    let state = wait_until(&viewport, |s| s.conditions.is_some()).await;

    assert_eq!(state.phase, Phase::Settled);
    assert_eq!(state.settled_center, Some(DEFAULT_MAP_CENTER));
    assert_eq!(state.pending_target, None);
    assert!(!state.conditions_loading);
    assert_eq!(temperature(&state), Some(DEFAULT_MAP_CENTER.latitude));
    assert_eq!(forecasts.calls(), vec![DEFAULT_MAP_CENTER]);
}

#[tokio::test(start_paused = true)]
async fn located_view_flies_then_settles_on_timeout() {
    let mut map = MockMap::new();
    map.expect_move_to()
        .withf(|center, duration| *center == HOME && *duration == FLY)
        .times(1)
        .return_const(());
    // The map never reports moveEnd; the timeout reads where it ended up
    map.expect_center().return_const(HOME);

    let forecasts = ScriptedForecasts::instant();
    let viewport = ViewportController::spawn(
        settings(),
        Arc::new(map),
        Arc::new(FixedGeolocator(Some(HOME))),
        forecasts.clone(),
        logger(),
    );

    sleep(Duration::from_millis(1900)).await;
    let state = viewport.state();
    assert_eq!(state.phase, Phase::Flying);
    assert_eq!(state.pending_target, Some(HOME));
    assert!(forecasts.calls().is_empty());

    let state = wait_until(&viewport, |s| s.conditions.is_some()).await;
    assert_eq!(state.phase, Phase::Settled);
    assert_eq!(state.settled_center, Some(HOME));
    assert_eq!(state.pending_target, None);
    assert_eq!(forecasts.calls(), vec![HOME]);
}

#[tokio::test(start_paused = true)]
async fn move_end_during_flight_settles_early() {
    let mut map = MockMap::new();
    map.expect_move_to().times(1).return_const(());
    map.expect_center().times(0);

    let forecasts = ScriptedForecasts::instant();
    let viewport = ViewportController::spawn(
        settings(),
        Arc::new(map),
        Arc::new(FixedGeolocator(Some(HOME))),
        forecasts.clone(),
        logger(),
    );
    wait_until(&viewport, |s| s.phase == Phase::Flying).await;

    viewport.move_end(AWAY);
    let state = wait_until(&viewport, |s| s.phase == Phase::Settled).await;
    assert_eq!(state.settled_center, Some(AWAY));

    // Well past the original deadline, which must not fire a second settle
    sleep(FLY * 3).await;
    assert_eq!(forecasts.calls(), vec![AWAY]);
    assert_eq!(viewport.state().settled_center, Some(AWAY));
}

#[tokio::test(start_paused = true)]
async fn burst_of_pans_fetches_once_for_last_center() {
    let forecasts = ScriptedForecasts::instant();
    let viewport = ViewportController::spawn(
        settings(),
        Arc::new(still_map(DEFAULT_MAP_CENTER)),
        Arc::new(FixedGeolocator(None)),
        forecasts.clone(),
        logger(),
    );
    wait_until(&viewport, |s| s.conditions.is_some()).await;

    let pans: Vec<Coordinate> = (0..5)
        .map(|i| Coordinate::new(i as f64, 10.0 + i as f64))
        .collect();
    for pan in &pans {
        viewport.move_end(*pan);
        sleep(Duration::from_millis(200)).await;
    }
    sleep(Duration::from_secs(3)).await;

    let last = pans[4];
    assert_eq!(forecasts.calls(), vec![DEFAULT_MAP_CENTER, last]);
    let state = viewport.state();
    assert_eq!(state.settled_center, Some(last));
    assert_eq!(temperature(&state), Some(last.latitude));
    assert_eq!(state.request_epoch, 2);
}

#[tokio::test(start_paused = true)]
async fn slow_superseded_response_is_discarded() {
    let forecasts = ScriptedForecasts::new(|coord| {
        let delay = if coord == SLOW {
            Duration::from_secs(5)
        } else {
            Duration::from_millis(500)
        };
        (delay, Ok(forecast_for(coord)))
    });
    let viewport = ViewportController::spawn(
        settings(),
        Arc::new(still_map(DEFAULT_MAP_CENTER)),
        Arc::new(FixedGeolocator(None)),
        forecasts.clone(),
        logger(),
    );
    wait_until(&viewport, |s| s.conditions.is_some()).await;

    viewport.move_end(SLOW);
    sleep(Duration::from_millis(1500)).await;
    assert!(viewport.state().conditions_loading);

    viewport.move_end(FAST);
    sleep(Duration::from_secs(10)).await;

    assert_eq!(forecasts.calls(), vec![DEFAULT_MAP_CENTER, SLOW, FAST]);
    let state = viewport.state();
    assert_eq!(temperature(&state), Some(FAST.latitude));
    assert_eq!(state.settled_center, Some(FAST));
    assert!(!state.conditions_loading);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_keeps_previous_conditions() {
    let forecasts = ScriptedForecasts::new(|coord| {
        if coord == AWAY {
            (
                Duration::ZERO,
                Err(FetchError::Upstream("503 Service Unavailable".to_string())),
            )
        } else {
            (Duration::ZERO, Ok(forecast_for(coord)))
        }
    });
    let viewport = ViewportController::spawn(
        settings(),
        Arc::new(still_map(DEFAULT_MAP_CENTER)),
        Arc::new(FixedGeolocator(None)),
        forecasts.clone(),
        logger(),
    );
    let before = wait_until(&viewport, |s| s.conditions.is_some()).await;

    viewport.move_end(AWAY);
    sleep(Duration::from_secs(3)).await;

    let state = viewport.state();
    assert_eq!(forecasts.calls(), vec![DEFAULT_MAP_CENTER, AWAY]);
    assert_eq!(state.conditions, before.conditions);
    assert_eq!(state.settled_center, Some(AWAY));
    assert!(!state.conditions_loading);
    assert_eq!(state.request_epoch, 2);
}

#[tokio::test(start_paused = true)]
async fn teardown_drops_in_flight_response() {
    let forecasts = ScriptedForecasts::new(|coord| {
        let delay = if coord == SLOW {
            Duration::from_secs(5)
        } else {
            Duration::ZERO
        };
        (delay, Ok(forecast_for(coord)))
    });
    let viewport = ViewportController::spawn(
        settings(),
        Arc::new(still_map(DEFAULT_MAP_CENTER)),
        Arc::new(FixedGeolocator(None)),
        forecasts.clone(),
        logger(),
    );
    wait_until(&viewport, |s| s.conditions.is_some()).await;

    viewport.move_end(SLOW);
    sleep(Duration::from_millis(1500)).await;
    assert_eq!(forecasts.calls().len(), 2);

    viewport.teardown();
    sleep(Duration::from_secs(10)).await;

    let state = viewport.state();
    assert_eq!(state.phase, Phase::Terminated);
    assert_eq!(temperature(&state), Some(DEFAULT_MAP_CENTER.latitude));
    assert!(!state.conditions_loading);
}

#[tokio::test(start_paused = true)]
async fn teardown_cancels_pending_refresh() {
    let forecasts = ScriptedForecasts::instant();
    let viewport = ViewportController::spawn(
        settings(),
        Arc::new(still_map(DEFAULT_MAP_CENTER)),
        Arc::new(FixedGeolocator(None)),
        forecasts.clone(),
        logger(),
    );
    wait_until(&viewport, |s| s.conditions.is_some()).await;

    viewport.move_end(AWAY);
    sleep(Duration::from_millis(300)).await;
    viewport.teardown();
    sleep(Duration::from_secs(5)).await;

    assert_eq!(forecasts.calls(), vec![DEFAULT_MAP_CENTER]);
    assert_eq!(viewport.state().phase, Phase::Terminated);
}
