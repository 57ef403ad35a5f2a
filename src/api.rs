//! REST API: tournament registration, bracket generation and result reporting.

use crate::logic::{
    close_registration, import_teams_csv, open_registration, set_match_status, BracketPolicy,
};
use crate::models::{
    ErrorKind, MatchKey, MatchStatus, TeamId, Tournament, TournamentError, TournamentId,
};
use crate::service;
use crate::store::{InMemoryStore, StoreError, TournamentStore};
use actix_web::{
    delete, get, post, put,
    web::{self, Bytes, Data, Json, Path},
    HttpResponse, Responder,
};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Shared server state.
pub struct AppState {
    pub store: InMemoryStore,
    /// Seeding RNG; fixed-seed when configured, otherwise from entropy.
    pub rng: Mutex<StdRng>,
    pub policy: BracketPolicy,
}

type State = Data<AppState>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

fn default_allow_byes() -> bool {
    true
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    max_participants: u32,
    #[serde(default = "default_allow_byes")]
    allow_byes: bool,
}

#[derive(Deserialize)]
struct RegisterTeamBody {
    name: String,
    clan_tag: String,
}

#[derive(Deserialize)]
struct ReportResultBody {
    winner: TeamId,
}

#[derive(Deserialize)]
struct MatchStatusBody {
    status: MatchStatus,
}

#[derive(Serialize)]
struct BracketResponse<'a> {
    layout: &'a Option<crate::logic::BracketLayout>,
    matches: Vec<&'a crate::models::Match>,
    champion: Option<TeamId>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and team id.
#[derive(Deserialize)]
struct TournamentTeamPath {
    id: TournamentId,
    team_id: TeamId,
}

/// Path segments: tournament id and match key (e.g. `U-R1-M2`).
#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    key: String,
}

/// Map an error to a JSON response; status follows the error class.
fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string(), "retryable": e.is_retryable() });
    match (e.kind(), e) {
        (_, TournamentError::Storage(StoreError::Conflict { .. })) => {
            HttpResponse::Conflict().json(body)
        }
        (ErrorKind::Precondition, TournamentError::InvalidState { .. }) => {
            HttpResponse::Conflict().json(body)
        }
        (ErrorKind::Precondition, _) => HttpResponse::BadRequest().json(body),
        (ErrorKind::Referential, TournamentError::NotAParticipant { .. }) => {
            HttpResponse::BadRequest().json(body)
        }
        (ErrorKind::Referential, _) => HttpResponse::NotFound().json(body),
        (ErrorKind::Storage, _) => HttpResponse::ServiceUnavailable().json(body),
        (ErrorKind::Internal, _) => HttpResponse::InternalServerError().json(body),
    }
}

fn respond<T: Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => {
            if e.kind() == ErrorKind::Internal {
                log::error!("{}", e);
            }
            error_response(&e)
        }
    }
}

/// Apply a change to one tournament and return the updated record.
fn mutate<F>(state: &State, id: TournamentId, f: F) -> HttpResponse
where
    F: FnOnce(&mut Tournament) -> Result<(), TournamentError>,
{
    respond(service::update(&state.store, id, f).map(|(_, t)| t))
}

fn parse_key(raw: &str) -> Result<MatchKey, HttpResponse> {
    raw.parse::<MatchKey>().map_err(|e| {
        HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string(), "retryable": false }))
    })
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "clan-bracket-web",
    })
}

/// Create a tournament in Draft.
#[post("/api/tournaments")]
async fn api_create_tournament(state: State, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    respond(
        Tournament::new(body.name, body.max_participants, body.allow_byes)
            .and_then(|t| service::create_tournament(&state.store, t)),
    )
}

#[get("/api/tournaments")]
async fn api_list_tournaments(state: State) -> HttpResponse {
    respond(state.store.list().map_err(TournamentError::from))
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: State, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.store.load(path.id).map_err(TournamentError::from))
}

#[post("/api/tournaments/{id}/registration/open")]
async fn api_open_registration(state: State, path: Path<TournamentPath>) -> HttpResponse {
    mutate(&state, path.id, open_registration)
}

#[post("/api/tournaments/{id}/registration/close")]
async fn api_close_registration(state: State, path: Path<TournamentPath>) -> HttpResponse {
    mutate(&state, path.id, close_registration)
}

#[post("/api/tournaments/{id}/cancel")]
async fn api_cancel_tournament(state: State, path: Path<TournamentPath>) -> HttpResponse {
    mutate(&state, path.id, Tournament::cancel)
}

/// Register a team (RegistrationOpen only).
#[post("/api/tournaments/{id}/teams")]
async fn api_register_team(
    state: State,
    path: Path<TournamentPath>,
    body: Json<RegisterTeamBody>,
) -> HttpResponse {
    let body = body.into_inner();
    mutate(&state, path.id, |t| {
        t.register_team(body.name, &body.clan_tag).map(|_| ())
    })
}

/// Register teams from a `name,clan_tag` CSV body.
#[post("/api/tournaments/{id}/teams/import")]
async fn api_import_teams(state: State, path: Path<TournamentPath>, body: Bytes) -> HttpResponse {
    respond(
        service::update(&state.store, path.id, |t| import_teams_csv(t, body.as_ref()))
            .map(|(report, _)| report),
    )
}

#[delete("/api/tournaments/{id}/teams/{team_id}")]
async fn api_withdraw_team(state: State, path: Path<TournamentTeamPath>) -> HttpResponse {
    mutate(&state, path.id, |t| t.withdraw_team(path.team_id))
}

#[post("/api/tournaments/{id}/teams/{team_id}/approve")]
async fn api_approve_team(state: State, path: Path<TournamentTeamPath>) -> HttpResponse {
    mutate(&state, path.id, |t| t.approve_team(path.team_id))
}

#[post("/api/tournaments/{id}/teams/{team_id}/reject")]
async fn api_reject_team(state: State, path: Path<TournamentTeamPath>) -> HttpResponse {
    mutate(&state, path.id, |t| t.reject_team(path.team_id))
}

#[get("/api/tournaments/{id}/teams/{team_id}/stats")]
async fn api_team_stats(state: State, path: Path<TournamentTeamPath>) -> HttpResponse {
    respond(
        state
            .store
            .load(path.id)
            .map_err(TournamentError::from)
            .and_then(|t| t.team_stats(path.team_id)),
    )
}

/// Generate the bracket from the approved teams (RegistrationClosed only).
#[post("/api/tournaments/{id}/bracket")]
async fn api_generate_bracket(state: State, path: Path<TournamentPath>) -> HttpResponse {
    let approved = match state.store.load(path.id) {
        Ok(t) => t.approved_team_ids(),
        Err(e) => return error_response(&TournamentError::from(e)),
    };
    let mut rng = match state.rng.lock() {
        Ok(guard) => guard,
        Err(_) => {
            log::error!("Seeding RNG lock poisoned");
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "lock error", "retryable": false }));
        }
    };
    respond(service::generate_bracket(
        &state.store,
        path.id,
        &approved,
        &state.policy,
        &mut *rng,
    ))
}

#[get("/api/tournaments/{id}/bracket")]
async fn api_get_bracket(state: State, path: Path<TournamentPath>) -> HttpResponse {
    match state.store.load(path.id) {
        Ok(t) => HttpResponse::Ok().json(BracketResponse {
            layout: &t.layout,
            matches: t.matches.values().collect(),
            champion: t.champion,
        }),
        Err(e) => error_response(&TournamentError::from(e)),
    }
}

/// Report the winner of a match. Reporting a completed match again is a no-op.
#[put("/api/tournaments/{id}/matches/{key}/result")]
async fn api_report_result(
    state: State,
    path: Path<TournamentMatchPath>,
    body: Json<ReportResultBody>,
) -> HttpResponse {
    let key = match parse_key(&path.key) {
        Ok(key) => key,
        Err(resp) => return resp,
    };
    respond(service::report_match_result(
        &state.store,
        path.id,
        key,
        body.winner,
    ))
}

/// Mark a match scheduled or live.
#[put("/api/tournaments/{id}/matches/{key}/status")]
async fn api_set_match_status(
    state: State,
    path: Path<TournamentMatchPath>,
    body: Json<MatchStatusBody>,
) -> HttpResponse {
    let key = match parse_key(&path.key) {
        Ok(key) => key,
        Err(resp) => return resp,
    };
    mutate(&state, path.id, |t| set_match_status(t, key, body.status))
}

/// Register every route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_health)
        .service(api_create_tournament)
        .service(api_list_tournaments)
        .service(api_get_tournament)
        .service(api_open_registration)
        .service(api_close_registration)
        .service(api_cancel_tournament)
        .service(api_import_teams)
        .service(api_register_team)
        .service(api_withdraw_team)
        .service(api_approve_team)
        .service(api_reject_team)
        .service(api_team_stats)
        .service(api_generate_bracket)
        .service(api_get_bracket)
        .service(api_report_result)
        .service(api_set_match_status);
}
