use actix_cors::Cors;
use actix_web::{App, HttpServer};
use log::info;
use sporty_service::routes::{auth_routes, team_routes, user_routes};
use sporty_service::utils::{team_storage, user_storage, Authentication};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    // Make sure the document store directories exist before serving
    user_storage::ensure_users_dir()?;
    team_storage::ensure_teams_dir()?;

    info!("🏀 Club service started at {}", address);

    HttpServer::new(|| {
        App::new()
            .wrap(Authentication)
            .wrap(Cors::permissive())
            .configure(auth_routes::init_routes)
            .configure(user_routes::init_routes)
            .configure(team_routes::init_routes)
    })
        .bind(address)?
        .run()
        .await
}
