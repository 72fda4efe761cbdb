use super::common::{seed_team, seed_user};
use crate::models::{Role, ServiceError, TeamAccess, TeamData};
use crate::services::team_membership;
use crate::utils::team_storage;
use uuid::Uuid;

#[test]
fn create_team_requires_admin() {
    let caller = seed_user(Role::Member);

    let result = team_membership::create_team(
        &caller.id,
        &TeamData {
            name: "U14 Hawks".to_string(),
            age_range: None,
            description: None,
        },
    );
    assert!(matches!(result, Err(ServiceError::Forbidden)));
}

#[test]
fn create_team_rejects_blank_name() {
    let admin = seed_user(Role::Admin);

    let result = team_membership::create_team(
        &admin.id,
        &TeamData {
            name: "   ".to_string(),
            age_range: None,
            description: None,
        },
    );
    assert!(matches!(result, Err(ServiceError::BadRequest(_))));
}

#[test]
fn create_team_starts_empty() {
    let admin = seed_user(Role::Admin);
    let team = seed_team(&admin.id, "U10 Owls");

    assert!(team.members.is_empty());
    assert!(team.managers.is_empty());
    assert_eq!(team.created_by, admin.id);
}

// The end-to-end scenario: create, add, promote, remove
#[test]
fn member_lifecycle_keeps_sets_consistent() {
    let admin = seed_user(Role::Admin);
    let team = seed_team(&admin.id, "U12 Eagles");
    let u1 = format!("u1-{}", Uuid::new_v4());

    let (team_state, added) = team_membership::add_member(&admin.id, &team.id, &u1).unwrap();
    assert!(added);
    assert_eq!(team_state.members, vec![u1.clone()]);
    assert!(team_state.managers.is_empty());

    let (team_state, promoted) =
        team_membership::promote_to_manager(&admin.id, &team.id, &u1).unwrap();
    assert!(promoted);
    assert_eq!(team_state.members, vec![u1.clone()]);
    assert_eq!(team_state.managers, vec![u1.clone()]);

    let (team_state, removed) = team_membership::remove_member(&admin.id, &team.id, &u1).unwrap();
    assert!(removed);
    assert!(team_state.members.is_empty());
    assert!(team_state.managers.is_empty());
}

#[test]
fn add_member_twice_is_noop() {
    let admin = seed_user(Role::Admin);
    let team = seed_team(&admin.id, "U16 Lions");
    let user_id = Uuid::new_v4().to_string();

    let (_, first) = team_membership::add_member(&admin.id, &team.id, &user_id).unwrap();
    let (team_state, second) = team_membership::add_member(&admin.id, &team.id, &user_id).unwrap();

    assert!(first);
    assert!(!second);
    assert_eq!(team_state.members, vec![user_id]);
}

#[test]
fn remove_nonmember_is_noop() {
    let admin = seed_user(Role::Admin);
    let team = seed_team(&admin.id, "U16 Tigers");

    let (team_state, removed) =
        team_membership::remove_member(&admin.id, &team.id, &Uuid::new_v4().to_string()).unwrap();
    assert!(!removed);
    assert!(team_state.members.is_empty());
}

#[test]
fn remove_member_strips_manager_status() {
    let admin = seed_user(Role::Admin);
    let team = seed_team(&admin.id, "U18 Bears");
    let user_id = Uuid::new_v4().to_string();

    team_membership::add_member(&admin.id, &team.id, &user_id).unwrap();
    team_membership::promote_to_manager(&admin.id, &team.id, &user_id).unwrap();

    let (team_state, _) = team_membership::remove_member(&admin.id, &team.id, &user_id).unwrap();
    assert!(!team_state.is_member(&user_id));
    assert!(!team_state.is_manager(&user_id));
}

#[test]
fn promoting_nonmember_makes_them_a_member_too() {
    let admin = seed_user(Role::Admin);
    let team = seed_team(&admin.id, "U12 Wolves");
    let user_id = Uuid::new_v4().to_string();

    let (team_state, promoted) =
        team_membership::promote_to_manager(&admin.id, &team.id, &user_id).unwrap();
    assert!(promoted);
    assert!(team_state.is_member(&user_id));
    assert!(team_state.is_manager(&user_id));
}

#[test]
fn promote_to_manager_is_idempotent() {
    let admin = seed_user(Role::Admin);
    let team = seed_team(&admin.id, "U12 Foxes");
    let user_id = Uuid::new_v4().to_string();

    let (after_first, _) =
        team_membership::promote_to_manager(&admin.id, &team.id, &user_id).unwrap();
    let (after_second, promoted) =
        team_membership::promote_to_manager(&admin.id, &team.id, &user_id).unwrap();

    assert!(!promoted);
    assert_eq!(after_first.members, after_second.members);
    assert_eq!(after_first.managers, after_second.managers);
}

#[test]
fn managers_stay_subset_of_members() {
    let admin = seed_user(Role::Admin);
    let team = seed_team(&admin.id, "U14 Sharks");
    let a = Uuid::new_v4().to_string();
    let b = Uuid::new_v4().to_string();
    let c = Uuid::new_v4().to_string();

    team_membership::add_member(&admin.id, &team.id, &a).unwrap();
    team_membership::promote_to_manager(&admin.id, &team.id, &b).unwrap();
    team_membership::add_member(&admin.id, &team.id, &c).unwrap();
    team_membership::promote_to_manager(&admin.id, &team.id, &a).unwrap();
    team_membership::remove_member(&admin.id, &team.id, &b).unwrap();
    team_membership::promote_to_manager(&admin.id, &team.id, &a).unwrap(); // no-op

    let team_state = team_storage::find_team_by_id(&team.id).unwrap().unwrap();
    for manager in &team_state.managers {
        assert!(
            team_state.is_member(manager),
            "manager {} is not a member",
            manager
        );
    }
}

#[test]
fn concurrent_adds_on_one_team_lose_no_updates() {
    let admin = seed_user(Role::Admin);
    let team = seed_team(&admin.id, "U14 Swifts");

    let mut handles = Vec::new();
    for _ in 0..8 {
        let admin_id = admin.id.clone();
        let team_id = team.id.clone();
        handles.push(std::thread::spawn(move || {
            let user_id = Uuid::new_v4().to_string();
            team_membership::add_member(&admin_id, &team_id, &user_id).unwrap();
            user_id
        }));
    }

    let added: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Each mutation committed against a fresh snapshot, so every add survives
    let team_state = team_storage::find_team_by_id(&team.id).unwrap().unwrap();
    assert_eq!(team_state.members.len(), 8);
    for user_id in &added {
        assert!(team_state.is_member(user_id));
    }
}

#[test]
fn team_manager_can_manage_their_own_team() {
    let admin = seed_user(Role::Admin);
    let manager = seed_user(Role::Member);
    let team = seed_team(&admin.id, "U16 Comets");

    team_membership::promote_to_manager(&admin.id, &team.id, &manager.id).unwrap();

    // A plain member who manages this team can mutate it
    let newcomer = Uuid::new_v4().to_string();
    let (team_state, added) =
        team_membership::add_member(&manager.id, &team.id, &newcomer).unwrap();
    assert!(added);
    assert!(team_state.is_member(&newcomer));
}

#[test]
fn team_manager_cannot_touch_other_teams() {
    let admin = seed_user(Role::Admin);
    let manager = seed_user(Role::Member);
    let own_team = seed_team(&admin.id, "U16 Rockets");
    let other_team = seed_team(&admin.id, "U16 Planets");

    team_membership::promote_to_manager(&admin.id, &own_team.id, &manager.id).unwrap();

    let result = team_membership::add_member(&manager.id, &other_team.id, "someone");
    assert!(matches!(result, Err(ServiceError::Forbidden)));
}

#[test]
fn mutations_on_missing_team_are_not_found() {
    let admin = seed_user(Role::Admin);
    let ghost_team = Uuid::new_v4().to_string();

    assert!(matches!(
        team_membership::add_member(&admin.id, &ghost_team, "u1"),
        Err(ServiceError::NotFound)
    ));
    assert!(matches!(
        team_membership::remove_member(&admin.id, &ghost_team, "u1"),
        Err(ServiceError::NotFound)
    ));
    assert!(matches!(
        team_membership::promote_to_manager(&admin.id, &ghost_team, "u1"),
        Err(ServiceError::NotFound)
    ));
}

#[test]
fn teams_for_user_reports_manager_access() {
    let admin = seed_user(Role::Admin);
    let member_team = seed_team(&admin.id, "U10 Cubs");
    let managed_team = seed_team(&admin.id, "U10 Colts");
    let user_id = Uuid::new_v4().to_string();

    team_membership::add_member(&admin.id, &member_team.id, &user_id).unwrap();
    team_membership::promote_to_manager(&admin.id, &managed_team.id, &user_id).unwrap();

    let teams = team_membership::teams_for_user(&user_id).unwrap();
    assert_eq!(teams.len(), 2);

    let member_entry = teams.iter().find(|t| t.team.id == member_team.id).unwrap();
    let managed_entry = teams.iter().find(|t| t.team.id == managed_team.id).unwrap();

    assert_eq!(member_entry.access, TeamAccess::Member);
    // In both lists, so the manager label must win
    assert_eq!(managed_entry.access, TeamAccess::Manager);
}

#[test]
fn teams_for_unknown_user_is_empty() {
    let teams = team_membership::teams_for_user(&Uuid::new_v4().to_string()).unwrap();
    assert!(teams.is_empty());
}

#[test]
fn available_users_excludes_current_members() {
    let admin = seed_user(Role::Admin);
    let in_team = seed_user(Role::Member);
    let outside = seed_user(Role::Member);
    let team = seed_team(&admin.id, "U8 Sprouts");

    team_membership::add_member(&admin.id, &team.id, &in_team.id).unwrap();

    let available = team_membership::available_users(&team.id).unwrap();
    assert!(available.iter().any(|user| user.id == outside.id));
    assert!(!available.iter().any(|user| user.id == in_team.id));
}

#[test]
fn available_users_for_missing_team_is_not_found() {
    let result = team_membership::available_users(&Uuid::new_v4().to_string());
    assert!(matches!(result, Err(ServiceError::NotFound)));
}
