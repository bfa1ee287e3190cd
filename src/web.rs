use actix_files::Files;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::matching::{
    generate_draft, move_participant, Draft, Group, HistoryRecord, RuleBucket,
    DEFAULT_GROUP_SIZE,
};
use crate::roster::{self, Participant, ParticipantId};

// In-memory storage for the shared state (in production, use a database)
pub struct AppState {
    pub roster: Mutex<Vec<Participant>>,
    pub draft: Mutex<Draft>,
    pub history: Mutex<Vec<HistoryRecord>>,
    pub rules: Mutex<Vec<RuleBucket>>,
    pub date_label: Mutex<String>,
    pub admin_password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    name: String,
    password: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRequest {
    name: String,
    team: Option<String>,
    is_new_hire: Option<bool>,
    buddy_id: Option<ParticipantId>,
    is_participating: Option<bool>,
}

#[derive(Deserialize)]
pub struct BulkImportRequest {
    lines: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationRequest {
    is_participating: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    use_rules: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    participant_id: ParticipantId,
    from_group: usize,
    to_group: usize,
}

#[derive(Deserialize)]
pub struct PublishRequest {
    date: Option<String>,
}

#[derive(Deserialize)]
pub struct DateRequest {
    date: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    total_members: usize,
    active_members: usize,
    team_counts: HashMap<String, TeamStats>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    members: u32,
    active: u32,
    new_hires: u32,
}

fn session_user(session: &Session) -> Option<String> {
    session.get::<String>("user").ok().flatten()
}

fn is_admin(session: &Session) -> bool {
    session.get::<bool>("admin").ok().flatten().unwrap_or(false)
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized()
        .json(serde_json::json!({"success": false, "error": "Admin access required"}))
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({"success": false, "error": message}))
}

// Login endpoint: any roster member may log in; the admin password elevates
// the session
async fn login(
    req: web::Json<LoginRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Ok(bad_request("Name is required".to_string()));
    }
    {
        let roster = state.roster.lock().unwrap();
        if !roster.iter().any(|p| p.name == name) {
            return Ok(HttpResponse::NotFound()
                .json(serde_json::json!({"success": false, "error": "Not a registered member"})));
        }
    }

    let admin = req.password.as_deref() == Some(state.admin_password.as_str());
    session.insert("user", &name)?;
    session.insert("admin", admin)?;
    log::info!("{} logged in{}", name, if admin { " as admin" } else { "" });
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "admin": admin})))
}

async fn logout(session: Session) -> Result<HttpResponse> {
    session.purge();
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

async fn get_roster(state: web::Data<AppState>) -> Result<HttpResponse> {
    let roster = state.roster.lock().unwrap();
    Ok(HttpResponse::Ok().json(&*roster))
}

async fn add_participant(
    req: web::Json<ParticipantRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let mut roster = state.roster.lock().unwrap();
    if let Err(message) = roster::validate_participant(&roster, None, &req.name, req.buddy_id) {
        return Ok(bad_request(message));
    }

    let team = match req.team.as_deref().map(str::trim) {
        Some(team) if !team.is_empty() => team.to_string(),
        _ => roster::UNASSIGNED_TEAM.to_string(),
    };
    let participant = Participant {
        id: roster::next_id(&roster),
        name: req.name.trim().to_string(),
        team,
        is_participating: req.is_participating.unwrap_or(true),
        is_new_hire: req.is_new_hire.unwrap_or(false),
        buddy_id: req.buddy_id,
    };
    log::info!("roster add: {} ({})", participant.name, participant.team);
    roster.push(participant.clone());
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "participant": participant})))
}

async fn update_participant(
    path: web::Path<ParticipantId>,
    req: web::Json<ParticipantRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let id = path.into_inner();
    let mut roster = state.roster.lock().unwrap();
    let position = match roster.iter().position(|p| p.id == id) {
        Some(position) => position,
        None => return Ok(bad_request("No such roster member".to_string())),
    };
    if let Err(message) = roster::validate_participant(&roster, Some(id), &req.name, req.buddy_id) {
        return Ok(bad_request(message));
    }

    let entry = &mut roster[position];
    entry.name = req.name.trim().to_string();
    if let Some(team) = req.team.as_deref().map(str::trim) {
        if !team.is_empty() {
            entry.team = team.to_string();
        }
    }
    if let Some(is_new_hire) = req.is_new_hire {
        entry.is_new_hire = is_new_hire;
    }
    if let Some(is_participating) = req.is_participating {
        entry.is_participating = is_participating;
    }
    entry.buddy_id = req.buddy_id;
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "participant": &*entry})))
}

// Deleting a member may leave a dangling buddy reference behind; the engine
// treats those as "no buddy", matching transient roster edits
async fn delete_participant(
    path: web::Path<ParticipantId>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let id = path.into_inner();
    let mut roster = state.roster.lock().unwrap();
    let before = roster.len();
    roster.retain(|p| p.id != id);
    if roster.len() == before {
        return Ok(bad_request("No such roster member".to_string()));
    }
    log::info!("roster delete: id {}", id);
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

async fn bulk_import(
    req: web::Json<BulkImportRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let mut roster = state.roster.lock().unwrap();
    let (added, errors) = roster::import_bulk(&mut roster, &req.lines);
    log::info!("bulk import: {} added, {} skipped", added, errors.len());
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "added": added,
        "errors": errors,
    })))
}

// Logged-in members toggle their own participation for the current round
async fn set_participation(
    req: web::Json<ParticipationRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let name = match session_user(&session) {
        Some(name) => name,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(serde_json::json!({"success": false, "error": "Login required"})));
        }
    };
    let mut roster = state.roster.lock().unwrap();
    match roster.iter_mut().find(|p| p.name == name) {
        Some(entry) => {
            entry.is_participating = req.is_participating;
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "isParticipating": entry.is_participating,
            })))
        }
        None => Ok(bad_request("Not on the roster any more".to_string())),
    }
}

async fn export_roster_csv(state: web::Data<AppState>) -> Result<HttpResponse> {
    let roster = state.roster.lock().unwrap();
    let mut buffer = Vec::new();
    roster::export_roster(&roster, &mut buffer)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Export failed: {}", e)))?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(("Content-Disposition", "attachment; filename=\"roster.csv\""))
        .body(buffer))
}

async fn get_rules(state: web::Data<AppState>) -> Result<HttpResponse> {
    let rules = state.rules.lock().unwrap();
    Ok(HttpResponse::Ok().json(&*rules))
}

// Replaces the ordered bucket list; blank labels and empty buckets are dropped
async fn save_rules(
    req: web::Json<Vec<RuleBucket>>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let cleaned: Vec<RuleBucket> = req
        .into_inner()
        .into_iter()
        .map(|bucket| {
            bucket
                .into_iter()
                .map(|team| team.trim().to_string())
                .filter(|team| !team.is_empty())
                .collect::<Vec<String>>()
        })
        .filter(|bucket| !bucket.is_empty())
        .collect();
    log::info!("rules saved: {} buckets", cleaned.len());
    *state.rules.lock().unwrap() = cleaned;
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

// Runs one matching round over a snapshot of the shared state and replaces
// the draft wholesale
async fn run_match(
    req: web::Json<MatchRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let roster = state.roster.lock().unwrap().clone();
    let history = state.history.lock().unwrap().clone();
    let rules = if req.use_rules {
        state.rules.lock().unwrap().clone()
    } else {
        Vec::new()
    };

    let draft = generate_draft(&roster, &history, &rules, &mut rand::thread_rng());
    log::info!(
        "matched {} active members into {} groups (rules: {})",
        roster.iter().filter(|p| p.is_participating).count(),
        draft.len(),
        req.use_rules,
    );
    *state.draft.lock().unwrap() = draft.clone();
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "groups": draft})))
}

async fn get_draft(state: web::Data<AppState>) -> Result<HttpResponse> {
    let draft = state.draft.lock().unwrap();
    let date_label = state.date_label.lock().unwrap();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "groups": &*draft,
        "dateLabel": &*date_label,
    })))
}

// Manual drag-and-drop contract: reject moves into a full buddy group,
// otherwise move and drop an emptied source group
async fn move_member(
    req: web::Json<MoveRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let mut draft = state.draft.lock().unwrap();
    match move_participant(&mut draft, req.participant_id, req.from_group, req.to_group) {
        Ok(()) => {
            Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "groups": &*draft})))
        }
        Err(message) => Ok(bad_request(message)),
    }
}

async fn add_empty_group(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let mut draft = state.draft.lock().unwrap();
    draft.push(Group::new(DEFAULT_GROUP_SIZE));
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "groups": &*draft})))
}

async fn clear_draft(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    state.draft.lock().unwrap().clear();
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

// Publishing snapshots the draft as the newest history record and clears it
async fn publish_draft(
    req: web::Json<PublishRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let mut draft = state.draft.lock().unwrap();
    if draft.is_empty() {
        return Ok(bad_request(
            "Nothing to publish; run a matching round first".to_string(),
        ));
    }

    let date = match req.date.clone() {
        Some(date) if !date.trim().is_empty() => date,
        _ => state.date_label.lock().unwrap().clone(),
    };
    let record = HistoryRecord {
        date: date.clone(),
        groups: draft.iter().map(|g| g.members.clone()).collect(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    };
    log::info!("published draft as \"{}\" ({} groups)", date, record.groups.len());
    state.history.lock().unwrap().insert(0, record);
    draft.clear();
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

async fn get_history(state: web::Data<AppState>) -> Result<HttpResponse> {
    let history = state.history.lock().unwrap();
    Ok(HttpResponse::Ok().json(&*history))
}

async fn delete_history_record(
    path: web::Path<usize>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    let index = path.into_inner();
    let mut history = state.history.lock().unwrap();
    if index >= history.len() {
        return Ok(bad_request("No such history record".to_string()));
    }
    history.remove(index);
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

async fn clear_history(session: Session, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    state.history.lock().unwrap().clear();
    log::warn!("history cleared; repeat-pairing avoidance resets");
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

async fn get_date_label(state: web::Data<AppState>) -> Result<HttpResponse> {
    let date_label = state.date_label.lock().unwrap();
    Ok(HttpResponse::Ok().json(serde_json::json!({"date": &*date_label})))
}

async fn set_date_label(
    req: web::Json<DateRequest>,
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !is_admin(&session) {
        return Ok(unauthorized());
    }
    *state.date_label.lock().unwrap() = req.date.clone();
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

// Stats endpoint
async fn get_stats(state: web::Data<AppState>) -> Result<HttpResponse> {
    let roster = state.roster.lock().unwrap();
    let mut team_counts: HashMap<String, TeamStats> = HashMap::new();

    for participant in roster.iter() {
        let stats = team_counts
            .entry(participant.team.clone())
            .or_insert_with(|| TeamStats {
                members: 0,
                active: 0,
                new_hires: 0,
            });
        stats.members += 1;
        if participant.is_participating {
            stats.active += 1;
        }
        if participant.is_new_hire {
            stats.new_hires += 1;
        }
    }

    Ok(HttpResponse::Ok().json(StatsResponse {
        total_members: roster.len(),
        active_members: roster.iter().filter(|p| p.is_participating).count(),
        team_counts,
    }))
}

pub async fn start_server(
    port: u16,
    admin_password: String,
    initial_roster: Vec<Participant>,
) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        roster: Mutex::new(initial_roster),
        draft: Mutex::new(Vec::new()),
        history: Mutex::new(Vec::new()),
        rules: Mutex::new(Vec::new()),
        date_label: Mutex::new(String::new()),
        admin_password,
    });
    let session_key = Key::generate();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .service(Files::new("/static", "static").show_files_listing())
            .route("/api/login", web::post().to(login))
            .route("/api/logout", web::post().to(logout))
            .route("/api/roster", web::get().to(get_roster))
            .route("/api/roster", web::post().to(add_participant))
            .route("/api/roster/bulk", web::post().to(bulk_import))
            .route("/api/roster/export", web::get().to(export_roster_csv))
            .route("/api/roster/{id}", web::put().to(update_participant))
            .route("/api/roster/{id}", web::delete().to(delete_participant))
            .route("/api/participation", web::post().to(set_participation))
            .route("/api/rules", web::get().to(get_rules))
            .route("/api/rules", web::put().to(save_rules))
            .route("/api/match", web::post().to(run_match))
            .route("/api/draft", web::get().to(get_draft))
            .route("/api/draft", web::delete().to(clear_draft))
            .route("/api/draft/move", web::post().to(move_member))
            .route("/api/draft/group", web::post().to(add_empty_group))
            .route("/api/history/publish", web::post().to(publish_draft))
            .route("/api/history", web::get().to(get_history))
            .route("/api/history", web::delete().to(clear_history))
            .route("/api/history/{index}", web::delete().to(delete_history_record))
            .route("/api/date", web::get().to(get_date_label))
            .route("/api/date", web::put().to(set_date_label))
            .route("/api/stats", web::get().to(get_stats))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
