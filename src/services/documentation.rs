use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Svalbard Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::session::create_session,
        crate::routes::session::fetch_session,
        crate::routes::session::join_session,
        crate::routes::session::leave_session,
        crate::routes::session::choose_role,
        crate::routes::session::start_game,
        crate::routes::session::video_finished,
        crate::routes::session::finish_end_video,
        crate::routes::rooms::board,
        crate::routes::rooms::enter_room,
        crate::routes::rooms::leave_room,
        crate::routes::rooms::mark_solved,
        crate::routes::rooms::set_unlock_all,
        crate::routes::rooms::outcome,
        crate::routes::crisis::snapshot,
        crate::routes::crisis::submit_choice,
        crate::routes::crisis::advance,
        crate::routes::minigames::energy_snapshot,
        crate::routes::minigames::energy_config,
        crate::routes::minigames::energy_restart,
        crate::routes::minigames::pump_snapshot,
        crate::routes::minigames::pump_set_valve,
        crate::routes::minigames::pump_set_power,
        crate::routes::minigames::pump_restart,
        crate::routes::sse::session_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::session::RoleDto,
            crate::dto::session::PhaseDto,
            crate::dto::session::PlayerSummary,
            crate::dto::session::SessionSnapshot,
            crate::dto::session::CreateSessionRequest,
            crate::dto::session::JoinSessionRequest,
            crate::dto::session::SessionJoinedResponse,
            crate::dto::session::ChooseRoleRequest,
            crate::dto::session::PlayerActionRequest,
            crate::dto::session::VideoFinishedRequest,
            crate::dto::rooms::RoomSummary,
            crate::dto::rooms::RoomBoardResponse,
            crate::dto::rooms::RoomActionRequest,
            crate::dto::rooms::UnlockAllRequest,
            crate::dto::rooms::OutcomeResponse,
            crate::dto::crisis::ChoiceCard,
            crate::dto::crisis::CrisisSnapshot,
            crate::dto::crisis::CrisisChoiceRequest,
            crate::dto::minigames::EnergyModuleSummary,
            crate::dto::minigames::EnergySnapshot,
            crate::dto::minigames::EnergyModuleInput,
            crate::dto::minigames::EnergyConfigRequest,
            crate::dto::minigames::PumpSnapshot,
            crate::dto::minigames::PumpValveRequest,
            crate::dto::minigames::PumpPowerRequest,
            crate::dto::sse::Handshake,
            crate::state::crisis::CrisisPhase,
            crate::state::crisis::CrisisChoice,
            crate::state::crisis::Indicators,
            crate::state::minigames::energy::ModuleKind,
            crate::state::minigames::pump::Valve,
            crate::state::minigames::pump::ValveState,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "session", description = "Session lifecycle and membership"),
        (name = "rooms", description = "Room board, movement, and outcome"),
        (name = "crisis", description = "Crisis decision room"),
        (name = "minigames", description = "Energy and pump mini-games"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
