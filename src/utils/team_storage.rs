// sporty-service/src/utils/team_storage.rs
use crate::models::{ServiceError, Team};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

const TEAMS_DIR: &str = "./storage/teams";

// Global registry of per-team mutation locks. Every read-modify-write on a
// team document runs under that team's lock, so concurrent mutations of the
// same team serialize and each one re-reads a fresh snapshot.
lazy_static::lazy_static! {
    static ref TEAM_LOCKS: Mutex<HashMap<String, Arc<Mutex<()>>>> = Mutex::new(HashMap::new());
}

fn team_lock(team_id: &str) -> Result<Arc<Mutex<()>>, ServiceError> {
    let mut locks = TEAM_LOCKS.lock().map_err(|e| {
        error!("Team lock registry poisoned: {:?}", e);
        ServiceError::InternalServerError
    })?;

    Ok(locks
        .entry(team_id.to_string())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone())
}

// Initialize teams directory
pub fn ensure_teams_dir() -> std::io::Result<()> {
    let dir = Path::new(TEAMS_DIR);
    if !dir.exists() {
        info!("Creating teams directory");
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn team_path(team_id: &str) -> String {
    format!("{}/{}.json", TEAMS_DIR, team_id)
}

// Save a team document. Written to a temp file and renamed into place so a
// team document is never observed half-written.
pub fn save_team(team: &Team) -> Result<(), ServiceError> {
    ensure_teams_dir().map_err(|e| {
        error!("Failed to create teams directory: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let path = team_path(&team.id);
    let tmp_path = format!("{}.tmp", path);

    let team_json = serde_json::to_string_pretty(team).map_err(|e| {
        error!("Failed to serialize team: {:?}", e);
        ServiceError::InternalServerError
    })?;

    fs::write(&tmp_path, team_json).map_err(|e| {
        error!("Failed to write team file: {:?}", e);
        ServiceError::InternalServerError
    })?;

    fs::rename(&tmp_path, &path).map_err(|e| {
        error!("Failed to move team file into place: {:?}", e);
        ServiceError::InternalServerError
    })?;

    debug!("Saved team: {}", team.id);
    Ok(())
}

// Find a team by ID
pub fn find_team_by_id(team_id: &str) -> Result<Option<Team>, ServiceError> {
    let path_string = team_path(team_id);
    let path = Path::new(&path_string);

    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to read team file: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let team: Team = serde_json::from_str(&content).map_err(|e| {
        error!("Failed to parse team JSON: {:?}", e);
        ServiceError::InternalServerError
    })?;

    Ok(Some(team))
}

// Get all teams
pub fn all_teams() -> Result<Vec<Team>, ServiceError> {
    ensure_teams_dir().map_err(|e| {
        error!("Failed to ensure teams directory: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let mut teams = Vec::new();

    for entry_result in fs::read_dir(TEAMS_DIR).map_err(|e| {
        error!("Failed to read teams directory: {:?}", e);
        ServiceError::InternalServerError
    })? {
        let entry = entry_result.map_err(|e| {
            error!("Failed to read directory entry: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            let content = fs::read_to_string(&path).map_err(|e| {
                error!("Failed to read team file: {:?}", e);
                ServiceError::InternalServerError
            })?;

            match serde_json::from_str::<Team>(&content) {
                Ok(team) => teams.push(team),
                Err(e) => {
                    warn!("Failed to parse team JSON: {:?}", e);
                    continue;
                }
            }
        }
    }

    Ok(teams)
}

// Get all teams whose members or managers list contains the given user
pub fn teams_containing_user(user_id: &str) -> Result<Vec<Team>, ServiceError> {
    Ok(all_teams()?
        .into_iter()
        .filter(|team| team.is_member(user_id) || team.is_manager(user_id))
        .collect())
}

// Apply a mutation to a team document as an atomic read-modify-write.
// The closure returns whether it changed anything; unchanged documents are
// not rewritten, so no-op requests leave storage untouched.
pub fn update_team<F>(team_id: &str, apply: F) -> Result<(Team, bool), ServiceError>
where
    F: FnOnce(&mut Team) -> bool,
{
    let lock = team_lock(team_id)?;
    let _guard = lock.lock().map_err(|e| {
        error!("Team lock poisoned for team {}: {:?}", team_id, e);
        ServiceError::InternalServerError
    })?;

    // Fresh snapshot under the lock; the delta commits against current state
    let mut team = match find_team_by_id(team_id)? {
        Some(team) => team,
        None => return Err(ServiceError::NotFound),
    };

    let changed = apply(&mut team);

    if changed {
        save_team(&team)?;
    }

    Ok((team, changed))
}
