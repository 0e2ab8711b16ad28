//! Commands for the energy and pump mini-games, plus the background ticker
//! that drives the pump simulation for each session.

use std::{sync::Arc, time::Duration};

use rand::{SeedableRng, rngs::StdRng};
use tokio::time::MissedTickBehavior;
use tracing::info;
use uuid::Uuid;

use crate::{
    dto::minigames::{
        EnergyConfigRequest, EnergySnapshot, PumpPowerRequest, PumpSnapshot, PumpValveRequest,
    },
    error::ServiceError,
    services::{session_service::require_member, sse_events},
    state::{
        SharedState,
        lifecycle::LifecyclePhase,
        minigames::pump::{TICK_INTERVAL_MS, TickOutcome},
        session::Session,
    },
};

/// Room completed by stabilizing the energy circuit.
const ENERGY_ROOM: &str = "Centrale électrique";
/// Room completed by repairing the pump station.
const PUMP_ROOM: &str = "Salle de traitement";

/// Read the energy circuit.
pub async fn energy_snapshot(
    state: &SharedState,
    code: &str,
) -> Result<EnergySnapshot, ServiceError> {
    let handle = state.session(code)?;
    let session = handle.session().read().await;
    Ok(EnergySnapshot::from(&session.energy))
}

/// Reconfigure the energy circuit on behalf of a player.
pub async fn energy_config(
    state: &SharedState,
    code: &str,
    request: EnergyConfigRequest,
) -> Result<EnergySnapshot, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    require_member(&session, request.player_id)?;
    require_playing(&session)?;
    let actor = session.players[&request.player_id].name.clone();
    let solved = session
        .energy
        .apply_config(request.voltage, &request.module_changes(), &actor);

    let snapshot = EnergySnapshot::from(&session.energy);
    let solved_room = solved
        .then(|| mark_linked_room(code, &mut session, ENERGY_ROOM))
        .flatten();
    drop(session);

    if solved {
        info!(%code, %actor, "energy circuit stabilized");
    }
    sse_events::broadcast_energy_updated(handle.events(), snapshot.clone());
    broadcast_room_progress(&handle, solved_room);
    Ok(snapshot)
}

/// Bring the grid back up after a blackout.
pub async fn energy_restart(
    state: &SharedState,
    code: &str,
    player_id: Uuid,
) -> Result<EnergySnapshot, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    require_member(&session, player_id)?;
    require_playing(&session)?;
    session.energy.restart();
    let snapshot = EnergySnapshot::from(&session.energy);
    drop(session);

    sse_events::broadcast_energy_updated(handle.events(), snapshot.clone());
    Ok(snapshot)
}

/// Read the pump station.
pub async fn pump_snapshot(state: &SharedState, code: &str) -> Result<PumpSnapshot, ServiceError> {
    let handle = state.session(code)?;
    let session = handle.session().read().await;
    Ok(PumpSnapshot::from(&session.pump))
}

/// Open or close one section valve.
pub async fn pump_set_valve(
    state: &SharedState,
    code: &str,
    request: PumpValveRequest,
) -> Result<PumpSnapshot, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    require_member(&session, request.player_id)?;
    require_playing(&session)?;
    if !session.pump.set_valve(request.valve, request.state) {
        return Err(ServiceError::InvalidState(
            "pump controls are locked while crashed or solved".into(),
        ));
    }
    let snapshot = PumpSnapshot::from(&session.pump);
    drop(session);

    sse_events::broadcast_pump_updated(handle.events(), snapshot.clone());
    Ok(snapshot)
}

/// Set the pump drive power.
pub async fn pump_set_power(
    state: &SharedState,
    code: &str,
    request: PumpPowerRequest,
) -> Result<PumpSnapshot, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    require_member(&session, request.player_id)?;
    require_playing(&session)?;
    if !session.pump.set_pump_power(request.power) {
        return Err(ServiceError::InvalidState(
            "pump controls are locked while crashed or solved".into(),
        ));
    }
    let snapshot = PumpSnapshot::from(&session.pump);
    drop(session);

    sse_events::broadcast_pump_updated(handle.events(), snapshot.clone());
    Ok(snapshot)
}

/// Restart the pump after a crash.
pub async fn pump_restart(
    state: &SharedState,
    code: &str,
    player_id: Uuid,
) -> Result<PumpSnapshot, ServiceError> {
    let handle = state.session(code)?;
    let mut session = handle.session().write().await;

    require_member(&session, player_id)?;
    require_playing(&session)?;
    if !session.pump.restart() {
        return Err(ServiceError::InvalidState(
            "the pump is not crashed".into(),
        ));
    }
    let snapshot = PumpSnapshot::from(&session.pump);
    drop(session);

    info!(%code, %player_id, "pump restarted after crash");
    sse_events::broadcast_pump_updated(handle.events(), snapshot.clone());
    Ok(snapshot)
}

/// Spawn the per-session pump ticker, replacing any previous one.
///
/// The task holds only a weak reference to the session so sweeping the
/// session tears the simulation down with it.
pub async fn spawn_pump_ticker(state: &SharedState, code: &str) {
    let Ok(handle) = state.session(code) else {
        return;
    };
    let weak = Arc::downgrade(&handle);
    let code = code.to_string();

    let ticker = tokio::spawn(async move {
        let mut rng = StdRng::from_os_rng();
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_INTERVAL_MS));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let Some(handle) = weak.upgrade() else {
                break;
            };

            let mut session = handle.session().write().await;
            let outcome = session.pump.step(&mut rng);
            let snapshot = PumpSnapshot::from(&session.pump);
            let solved_room = (outcome == TickOutcome::Solved)
                .then(|| mark_linked_room(&code, &mut session, PUMP_ROOM))
                .flatten();
            drop(session);

            sse_events::broadcast_pump_updated(handle.events(), snapshot);
            broadcast_room_progress(&handle, solved_room);

            match outcome {
                TickOutcome::Solved => {
                    info!(%code, "pump station repaired, stopping ticker");
                    break;
                }
                TickOutcome::Crashed => info!(%code, "pump crashed"),
                TickOutcome::SafetyTriggered => info!(%code, "pump overload safety triggered"),
                TickOutcome::Drift => {}
            }
        }
    });

    handle.install_pump_ticker(ticker).await;
}

/// Mini-game controls only exist during active gameplay; before that the
/// room board may not exist yet, so a premature solve could never mark its
/// linked room.
fn require_playing(session: &Session) -> Result<(), ServiceError> {
    if session.phase() != LifecyclePhase::Playing {
        return Err(ServiceError::InvalidState(
            "mini-games are only available during gameplay".into(),
        ));
    }
    Ok(())
}

/// Progress summary carried alongside a mini-game completion.
struct RoomProgress {
    room: String,
    solved: usize,
    total: usize,
    fraction: f64,
    complete: bool,
}

/// Mark the room tied to a mini-game as solved, if the board knows it.
///
/// Sessions configured without the default catalog simply skip the link.
fn mark_linked_room(code: &str, session: &mut Session, room: &str) -> Option<RoomProgress> {
    let newly = session.rooms.mark_solved(room).ok()?;
    if !newly {
        return None;
    }

    let (solved, total) = session.rooms.progress();
    info!(%code, room, solved, total, "room solved by mini-game");
    Some(RoomProgress {
        room: room.to_string(),
        solved,
        total,
        fraction: session.rooms.fraction(),
        complete: session.rooms.is_complete(),
    })
}

fn broadcast_room_progress(
    handle: &Arc<crate::state::SessionHandle>,
    progress: Option<RoomProgress>,
) {
    if let Some(progress) = progress {
        sse_events::broadcast_room_solved(
            handle.events(),
            progress.room,
            progress.solved,
            progress.total,
            progress.fraction,
            progress.complete,
        );
        if progress.complete {
            sse_events::broadcast_session_completed(
                handle.events(),
                progress.solved,
                progress.total,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dto::{
            minigames::EnergyModuleInput,
            session::{ChooseRoleRequest, CreateSessionRequest, JoinSessionRequest, RoleDto,
                VideoFinishedRequest},
        },
        services::{room_service, session_service},
        state::{AppState, minigames::energy::ModuleKind},
    };

    fn state() -> SharedState {
        AppState::new(AppConfig::default())
    }

    async fn staffed_lobby(state: &SharedState) -> (String, Uuid) {
        let created = session_service::create_session(
            state,
            CreateSessionRequest { name: "Ada".into() },
        )
        .await
        .unwrap();
        let joined = session_service::join_session(
            state,
            &created.code,
            JoinSessionRequest { name: "Ben".into() },
        )
        .await
        .unwrap();

        session_service::choose_role(
            state,
            &created.code,
            ChooseRoleRequest {
                player_id: created.player_id,
                role: Some(RoleDto::Energetician),
            },
        )
        .await
        .unwrap();
        session_service::choose_role(
            state,
            &created.code,
            ChooseRoleRequest {
                player_id: joined.player_id,
                role: Some(RoleDto::Hydrologist),
            },
        )
        .await
        .unwrap();

        (created.code, created.player_id)
    }

    fn winning_config(player_id: Uuid) -> EnergyConfigRequest {
        // Heat and pump at R=3 plus the greenhouse under 3 V: exactly 9 kW.
        EnergyConfigRequest {
            player_id,
            voltage: Some(3.0),
            modules: vec![EnergyModuleInput {
                module: ModuleKind::Serre,
                resistance: None,
                connected: Some(true),
            }],
        }
    }

    #[tokio::test]
    async fn energy_controls_are_locked_until_gameplay() {
        let state = state();
        let (code, host) = staffed_lobby(&state).await;

        let err = energy_config(&state, &code, winning_config(host))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let err = pump_set_power(
            &state,
            &code,
            PumpPowerRequest {
                player_id: host,
                power: 80,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn solving_the_energy_circuit_marks_its_room() {
        let state = state();
        let (code, host) = staffed_lobby(&state).await;

        session_service::start_game(&state, &code, host).await.unwrap();
        session_service::video_finished(
            &state,
            &code,
            VideoFinishedRequest {
                player_id: host,
                skip: true,
            },
        )
        .await
        .unwrap();

        let snapshot = energy_config(&state, &code, winning_config(host))
            .await
            .unwrap();
        assert!(snapshot.solved);
        assert_eq!(snapshot.total, 9.0);

        let board = room_service::board(&state, &code, None).await.unwrap();
        let energy_room = board
            .rooms
            .iter()
            .find(|room| room.name == ENERGY_ROOM)
            .expect("default catalog carries the energy room");
        assert!(energy_room.solved);
    }
}
