//! Satellite-uplink tracker: the headless stand-in for the dashboard map.
//!
//! Subscribes to the command-execution bridge; a `whois`/`intel`/`dossier`
//! dispatch carrying a target triggers a fire-and-forget geolocation fetch
//! and a `SAT_LOCK` acquisition log line, the way the map re-centers and
//! annotates on those verbs.

use std::sync::Arc;

use overwatch_net::client::HttpClient;
use overwatch_net::geo;
use overwatch_types::config::OverwatchConfig;
use overwatch_types::event::{CommandExecuted, EventBus, Subscription};

const TRACKED_VERBS: [&str; 3] = ["whois", "intel", "dossier"];

fn lock_target(event: &CommandExecuted) -> Option<&str> {
    if !TRACKED_VERBS.contains(&event.command.as_str()) {
        return None;
    }
    event.target.as_deref().filter(|t| !t.is_empty())
}

/// Attach the tracker to the bus. Dropping the returned subscription
/// detaches it.
pub fn spawn_listener(
    bus: &Arc<EventBus<CommandExecuted>>,
    http: HttpClient,
    config: Arc<OverwatchConfig>,
) -> Subscription<CommandExecuted> {
    bus.subscribe(move |event| {
        let Some(target) = lock_target(event) else {
            return;
        };
        let target = target.to_string();
        let http = http.clone();
        let base = config.endpoints.geo.clone();
        tokio::spawn(async move {
            match geo::lookup(&http, &base, &target).await {
                Ok(profile) => log::info!(
                    "SAT_LOCK: {} -> {}, {} ({})",
                    profile.ip,
                    profile.city,
                    profile.country,
                    profile.coordinates(),
                ),
                Err(e) => log::debug!("uplink trace failed for {target}: {e}"),
            }
        });
    })
}
