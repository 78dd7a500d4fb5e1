use std::sync::Arc;
use rocket::{
    delete, get, post,
    http::Status,
    request::{FromRequest, Outcome, Request},
    response::stream::{Event, EventStream},
    serde::json::Json,
    tokio::{select, sync::broadcast::error::RecvError},
    Shutdown, State,
};
use tracing::{debug, instrument, warn};
use shared::{
    models::*,
    tally::ElectionResult,
    Clock, Principal,
};

use crate::{
    config::{Config, DEFAULT_ADMIN_ROLE},
    error::ApiError,
    processor::ElectionProcessor,
    store::ElectionStore,
    utils::parse_election_id,
};

pub struct AppState {
    pub processor: Arc<ElectionProcessor>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn ElectionStore>, clock: Arc<dyn Clock>, config: Config) -> Self {
        Self {
            processor: Arc::new(ElectionProcessor::new(store, clock, &config)),
            config,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingPrincipal,
    NotAdmin,
}

/// A principal holding the configured administrative role.
#[derive(Debug, Clone)]
pub struct Admin(pub Principal);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Admin {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let principal = match req.guard::<Principal>().await {
            Outcome::Success(principal) => principal,
            Outcome::Error((status, _)) => return Outcome::Error((status, AuthError::MissingPrincipal)),
            Outcome::Forward(status) => return Outcome::Forward(status),
        };

        let admin_role = req
            .rocket()
            .state::<AppState>()
            .map_or(DEFAULT_ADMIN_ROLE, |state| state.config.admin_role.as_str());

        if principal.has_role(admin_role) {
            Outcome::Success(Admin(principal))
        } else {
            warn!("Principal {} lacks the {} role", principal.identity, admin_role);
            Outcome::Error((Status::Forbidden, AuthError::NotAdmin))
        }
    }
}

#[get("/elections")]
pub async fn list_elections(state: &State<AppState>, principal: Option<Principal>) -> Result<Json<Vec<ElectionView>>, ApiError> {
    let viewer = principal.as_ref().map(|p| p.identity.as_str());
    Ok(Json(state.processor.views(viewer).await?))
}

#[get("/elections/summary")]
pub async fn election_summary(state: &State<AppState>) -> Result<Json<ElectionSummary>, ApiError> {
    Ok(Json(state.processor.summary().await?))
}

#[get("/elections/<id>")]
pub async fn get_election(state: &State<AppState>, id: &str, principal: Option<Principal>) -> Result<Json<ElectionView>, ApiError> {
    let id = parse_election_id(id)?;
    let viewer = principal.as_ref().map(|p| p.identity.as_str());
    Ok(Json(state.processor.view(id, viewer).await?))
}

#[get("/elections/<id>/result")]
pub async fn get_result(state: &State<AppState>, id: &str) -> Result<Json<ElectionResult>, ApiError> {
    let id = parse_election_id(id)?;
    Ok(Json(state.processor.result(id).await?))
}

#[instrument(skip(state, admin, request), fields(admin = %admin.0.identity))]
#[post("/elections", format = "json", data = "<request>")]
pub async fn create_election(
    state: &State<AppState>,
    admin: Admin,
    request: Json<CreateElectionRequest>,
) -> Result<(Status, Json<ElectionView>), ApiError> {
    let election = state.processor.create_election(&request).await?;
    let view = ElectionView::at(&election, state.processor.now(), Some(&admin.0.identity));
    Ok((Status::Created, Json(view)))
}

#[instrument(skip(state, admin), fields(admin = %admin.0.identity))]
#[delete("/elections/<id>")]
pub async fn delete_election(state: &State<AppState>, admin: Admin, id: &str) -> Result<Status, ApiError> {
    let id = parse_election_id(id)?;
    state.processor.delete_election(id).await?;
    Ok(Status::NoContent)
}

#[instrument(skip(state, principal, ballot), fields(election_id = %id))]
#[post("/elections/<id>/votes", format = "json", data = "<ballot>")]
pub async fn cast_vote(
    state: &State<AppState>,
    principal: Principal,
    id: &str,
    ballot: Json<CastVoteRequest>,
) -> Result<Json<ElectionView>, ApiError> {
    let id = parse_election_id(id)?;
    debug!("Casting vote for candidate {}", ballot.candidate_index);
    let election = state.processor.cast_vote(id, &principal.identity, ballot.candidate_index).await?;
    Ok(Json(ElectionView::at(&election, state.processor.now(), Some(&principal.identity))))
}

/// Server-sent events: one `electionsChanged` event per change. Clients
/// re-fetch whatever they display.
#[get("/events")]
pub fn events(state: &State<AppState>, mut shutdown: Shutdown) -> EventStream![] {
    let mut rx = state.processor.notifier().subscribe();
    EventStream! {
        loop {
            select! {
                msg = rx.recv() => match msg {
                    Ok(_) | Err(RecvError::Lagged(_)) => (),
                    Err(RecvError::Closed) => break,
                },
                _ = &mut shutdown => break,
            };
            yield Event::data("electionsChanged").event("electionsChanged");
        }
    }
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}

pub fn routes() -> Vec<rocket::Route> {
    rocket::routes![
        list_elections,
        election_summary,
        get_election,
        get_result,
        create_election,
        delete_election,
        cast_vote,
        events,
        all_options,
    ]
}
