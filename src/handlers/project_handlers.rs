// linkhub-backend/src/project_handlers.rs
use crate::auth_utils::AuthenticatedUser;
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::models::{
    CreateProjectPayload, Event, NewProject, Phase, Project, ProjectApiResponse,
    UpdateProjectChangeset, UpdateProjectPayload,
};
use crate::schema::{
    events, phases,
    projects::{self, dsl::*},
};
use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde_json::json;
use uuid::Uuid;

// === POST /projects ===
#[post("")]
pub async fn create_project_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    payload: web::Json<CreateProjectPayload>,
) -> Result<HttpResponse, ServiceError> {
    let new_project_data = NewProject {
        owner_id: authenticated_user.id,
        name: payload.name.clone(),
        description: payload.description.clone(),
    };

    // Obtenir une connexion du pool
    let mut conn = pool.get().await?;

    let project = diesel::insert_into(projects::table)
        .values(&new_project_data)
        .get_result::<Project>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Created().json(project))
}

// === GET /projects ===
#[get("")]
pub async fn list_projects_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;

    let mut conn = pool.get().await?;

    let project_list = projects
        .filter(owner_id.eq(user_uuid))
        .order(created_at.desc())
        .select(Project::as_select())
        .load::<Project>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(project_list))
}

// === GET /projects/shared ===
// Enregistré avant /{project_id_path} dans main.rs.
#[get("/shared")]
pub async fn list_shared_projects_handler(
    pool: web::Data<DbPool>,
    _authenticated_user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    let mut conn = pool.get().await?;

    let shared_list = projects
        .filter(is_shared.eq(true))
        .order(created_at.desc())
        .select(Project::as_select())
        .load::<Project>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(shared_list))
}

// === GET /projects/{project_id_path} ===
// Phases puis événements attachés par des lectures successives ;
// lisible par les non-propriétaires (projets partagés/liés).
#[get("/{project_id_path}")]
pub async fn get_project_handler(
    pool: web::Data<DbPool>,
    _authenticated_user: AuthenticatedUser,
    project_id_path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let project_to_find_id = project_id_path.into_inner();

    let mut conn = pool.get().await?;

    let project_option = projects
        .filter(id.eq(project_to_find_id))
        .select(Project::as_select())
        .first::<Project>(&mut conn)
        .await
        .optional()
        .map_err(ServiceError::from)?;

    let project = match project_option {
        Some(p) => p,
        None => {
            return Err(ServiceError::NotFound(format!(
                "Project with id {} not found",
                project_to_find_id
            )))
        }
    };

    let project_phases = phases::table
        .filter(phases::project_id.eq(project.id))
        .order(phases::start_date.asc())
        .select(Phase::as_select())
        .load::<Phase>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    let project_events = events::table
        .filter(events::project_id.eq(project.id))
        .order(events::start_date.asc())
        .select(Event::as_select())
        .load::<Event>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    let mut response = ProjectApiResponse::from(project);
    response.phases = project_phases;
    response.events = project_events;

    Ok(HttpResponse::Ok().json(response))
}

// === PUT /projects/{project_id_path} ===
#[put("/{project_id_path}")]
pub async fn update_project_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    project_id_path: web::Path<Uuid>,
    payload: web::Json<UpdateProjectPayload>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let project_to_update_id = project_id_path.into_inner();

    let project_changes = UpdateProjectChangeset {
        name: payload.name.clone(),
        description: payload.description.clone(),
        is_shared: payload.is_shared,
        updated_at: Some(Utc::now().naive_utc()),
    };

    let mut conn = pool.get().await?;

    let updated_project = diesel::update(
        projects
            .filter(id.eq(project_to_update_id))
            .filter(owner_id.eq(user_uuid)),
    )
    .set(&project_changes)
    .get_result::<Project>(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(updated_project))
}

// === DELETE /projects/{project_id_path} ===
// Phases, événements et projet supprimés dans une même transaction.
#[delete("/{project_id_path}")]
pub async fn delete_project_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    project_id_path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let project_to_delete_id = project_id_path.into_inner();

    let mut conn = pool.get().await?;

    // Vérifier la propriété avant de toucher aux enfants
    let owned_check = projects
        .filter(id.eq(project_to_delete_id))
        .filter(owner_id.eq(user_uuid))
        .select(id)
        .first::<Uuid>(&mut conn)
        .await
        .optional()
        .map_err(ServiceError::from)?;

    if owned_check.is_none() {
        return Err(ServiceError::NotFound(format!(
            "Project with id {} not found or not owned by user to delete",
            project_to_delete_id
        )));
    }

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        async move {
            diesel::delete(phases::table.filter(phases::project_id.eq(project_to_delete_id)))
                .execute(conn)
                .await?;

            diesel::delete(events::table.filter(events::project_id.eq(project_to_delete_id)))
                .execute(conn)
                .await?;

            diesel::delete(
                projects::table
                    .filter(projects::id.eq(project_to_delete_id))
                    .filter(projects::owner_id.eq(user_uuid)),
            )
            .execute(conn)
            .await?;

            Ok(())
        }
        .scope_boxed()
    })
    .await
    .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": format!("Project with id {} deleted successfully", project_to_delete_id)
    })))
}
