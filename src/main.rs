// linkhub-backend/src/main.rs
mod auth_utils;
mod db;
mod error_handler;
mod handlers;
mod inference;
mod models;
pub mod schema;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpResponse, HttpServer};
use db::DbPool;
use std::env;

// Health check handler avec async
async fn health_check_handler(
    pool: web::Data<DbPool>,
) -> Result<HttpResponse, error_handler::ServiceError> {
    // Test de connexion au pool
    match pool.get().await {
        Ok(_conn) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "message": "Backend is running and DB pool accessible"
        }))),
        Err(e) => {
            log::error!("Failed to get connection from pool: {:?}", e);
            Err(error_handler::ServiceError::InternalServerError(
                "Failed to check DB pool".to_string(),
            ))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialiser le logger
    env_logger::init();

    // Charger les variables d'environnement
    if cfg!(debug_assertions) {
        match dotenvy::dotenv() {
            Ok(path) => log::info!(".env file loaded from path: {}", path.display()),
            Err(e) => log::warn!(
                "Could not load .env file: {}, using environment variables.",
                e
            ),
        }
    }

    // Récupérer DATABASE_URL
    let database_url = env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set in environment variables or .env file");

    // Créer le pool de connexions async
    let pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database connection pool.");

    // Client du fournisseur de modèle pour l'analyse de notes
    let notes_analyzer = web::Data::new(inference::NotesAnalyzer::from_env());

    log::info!("🚀 LinkHub Backend Service starting...");

    // Configuration des URLs pour CORS
    let frontend_url_prod = env::var("FRONTEND_URL_PROD")
        .unwrap_or_else(|_| "https://linkhub-app.vercel.app".to_string());

    let frontend_url_dev =
        env::var("FRONTEND_URL_DEV").unwrap_or_else(|_| "http://localhost:3000".to_string());

    // Port et host configuration
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .expect("PORT must be a valid number");

    log::info!("Server will start at http://{}:{}", host, port);

    // Démarrer le serveur HTTP
    HttpServer::new(move || {
        // Configuration CORS
        let cors = Cors::default()
            .allowed_origin(&frontend_url_prod)
            .allowed_origin(&frontend_url_dev)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(pool.clone()))
            .app_data(notes_analyzer.clone())
            .service(web::resource("/health").route(web::get().to(health_check_handler)))
            .service(
                // /shared avant /{id} : les routes sont essayées dans
                // l'ordre d'enregistrement
                web::scope("/collections")
                    .service(handlers::collection_handlers::list_shared_collections_handler)
                    .service(handlers::collection_handlers::create_collection_handler)
                    .service(handlers::collection_handlers::list_collections_handler)
                    .service(handlers::collection_handlers::get_collection_handler)
                    .service(handlers::collection_handlers::update_collection_handler)
                    .service(handlers::collection_handlers::delete_collection_handler)
                    .service(handlers::label_handlers::create_label_handler)
                    .service(handlers::label_handlers::list_labels_for_collection_handler),
            )
            .service(
                web::scope("/labels")
                    .service(handlers::label_handlers::get_label_handler)
                    .service(handlers::label_handlers::update_label_handler)
                    .service(handlers::label_handlers::delete_label_handler),
            )
            .service(
                web::scope("/projects")
                    .service(handlers::project_handlers::list_shared_projects_handler)
                    .service(handlers::project_handlers::create_project_handler)
                    .service(handlers::project_handlers::list_projects_handler)
                    .service(handlers::project_handlers::get_project_handler)
                    .service(handlers::project_handlers::update_project_handler)
                    .service(handlers::project_handlers::delete_project_handler)
                    .service(handlers::phase_handlers::create_phase_handler)
                    .service(handlers::phase_handlers::list_phases_handler)
                    .service(handlers::event_handlers::create_event_handler)
                    .service(handlers::event_handlers::list_events_handler),
            )
            .service(
                web::scope("/phases")
                    .service(handlers::phase_handlers::update_phase_handler)
                    .service(handlers::phase_handlers::delete_phase_handler),
            )
            .service(
                web::scope("/events")
                    .service(handlers::event_handlers::update_event_handler)
                    .service(handlers::event_handlers::delete_event_handler),
            )
            .service(
                web::scope("/links")
                    .service(handlers::link_handlers::link_entity_handler)
                    .service(handlers::link_handlers::list_linked_ids_handler)
                    .service(handlers::link_handlers::unlink_entity_handler),
            )
            .service(
                web::scope("/dashboard")
                    .service(handlers::dashboard_handlers::dashboard_collections_handler)
                    .service(handlers::dashboard_handlers::dashboard_projects_handler),
            )
            .service(
                web::scope("/analyze")
                    .service(handlers::analyze_handlers::analyze_meeting_notes_handler),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
