use std::collections::HashMap;
use std::sync::Arc;

use supply_chain_backend::domain::{PlayerAssignment, Position};
use supply_chain_backend::telemetry;
use supply_chain_backend::{
    AppError, EngineConfig, ErrorCode, GameEvent, GameEventHub, GameSessionCoordinator,
    InMemorySnapshotStore,
};
use tokio_stream::StreamExt;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Opening order of a scripted player before any demand is seen.
const OPENING_ORDER: u64 = 4;

#[tokio::main]
async fn main() {
    telemetry::init_tracing();

    if let Err(e) = run_demo().await {
        error!(code = %e.code(), error = %e, "Demo game failed");
        std::process::exit(1);
    }
}

/// Play one game on the classic chain. Human seats are driven by a scripted
/// client that orders whatever it was asked for in the previous round.
async fn run_demo() -> Result<(), AppError> {
    let config = EngineConfig::from_env()?;
    let store = Arc::new(InMemorySnapshotStore::new());
    let hub = Arc::new(GameEventHub::new());
    let coordinator = GameSessionCoordinator::new(store, hub.clone(), config.game_settings());

    let game_id = Uuid::new_v4();
    let topology = config.topology()?;
    let players: Vec<PlayerAssignment> = (0..config.demo_players)
        .map(|position| PlayerAssignment::new(Uuid::new_v4(), position))
        .collect();
    info!(
        game_id = %game_id,
        humans = players.len(),
        max_rounds = config.max_rounds,
        "Starting demo game"
    );

    let mut events = hub.subscribe(game_id, None).events;
    coordinator
        .create_session(game_id, topology, players.clone())
        .await?;

    let mut last_demand: HashMap<Position, u64> = HashMap::new();
    while let Some(event) = events.next().await {
        match event {
            GameEvent::RoundOpened { round, .. } => {
                for seat in &players {
                    let quantity = last_demand
                        .get(&seat.position)
                        .copied()
                        .unwrap_or(OPENING_ORDER);
                    let quantity = i64::try_from(quantity).unwrap_or(i64::MAX);
                    let placed = match coordinator
                        .submit_order_for_round(game_id, seat.player, round, quantity)
                        .await
                    {
                        // Out of money: sit the round out.
                        Err(e) if e.code() == ErrorCode::InsufficientFunds => coordinator
                            .submit_order_for_round(game_id, seat.player, round, 0)
                            .await
                            .map(|_| ()),
                        other => other.map(|_| ()),
                    };
                    if let Err(e) = placed {
                        warn!(round, position = seat.position, error = %e, "Scripted order failed");
                    }
                }
            }
            GameEvent::RoundResolved { snapshot, .. } => {
                for role in &snapshot.roles {
                    last_demand.insert(role.position, role.incoming_demand);
                }
            }
            GameEvent::EventMessage { round, message, .. } => {
                info!(round, %message, "Game event");
            }
            GameEvent::GameEnded { summary, .. } => {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                break;
            }
            _ => {}
        }
    }

    coordinator.end_session(game_id).await?;
    Ok(())
}
