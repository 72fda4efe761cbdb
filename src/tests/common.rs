// Shared fixtures for service and route tests. Everything is keyed by fresh
// uuids so tests can run in parallel against the same storage directory.
use crate::models::{Role, Team, TeamData, User};
use crate::services::team_membership;
use crate::utils::user_storage;
use chrono::Utc;
use uuid::Uuid;

pub fn make_user(role: Role) -> User {
    let id = Uuid::new_v4().to_string();
    User {
        id: id.clone(),
        name: format!("user-{}", &id[..8]),
        email: format!("{}@example.com", id),
        password_hash: String::new(),
        role,
        created_at: Utc::now(),
    }
}

pub fn seed_user(role: Role) -> User {
    let user = make_user(role);
    user_storage::save_user(&user).unwrap();
    user
}

pub fn seed_team(admin_id: &str, name: &str) -> Team {
    team_membership::create_team(
        admin_id,
        &TeamData {
            name: name.to_string(),
            age_range: None,
            description: None,
        },
    )
    .unwrap()
}
