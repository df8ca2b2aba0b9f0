// linkhub-backend/src/phase_handlers.rs
use crate::auth_utils::AuthenticatedUser;
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::models::{
    CreatePhasePayload, NewPhase, Phase, UpdatePhaseChangeset, UpdatePhasePayload,
};
use crate::schema::{
    phases::{self, dsl::*},
    projects,
};
use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::json;
use uuid::Uuid;

// === POST /projects/{project_id_path}/phases ===
// Le calendrier d'un projet est géré par son propriétaire : la création
// exige que le projet parent appartienne à l'appelant.
#[post("/{project_id_path}/phases")]
pub async fn create_phase_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    project_id_path: web::Path<Uuid>,
    payload: web::Json<CreatePhasePayload>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let parent_project_id = project_id_path.into_inner();

    let mut conn = pool.get().await?;

    // Vérifier que le projet appartient à l'utilisateur
    let parent_check = projects::table
        .filter(projects::id.eq(parent_project_id))
        .filter(projects::owner_id.eq(user_uuid))
        .select(projects::id)
        .first::<Uuid>(&mut conn)
        .await
        .optional()
        .map_err(ServiceError::from)?;

    if parent_check.is_none() {
        return Err(ServiceError::NotFound(format!(
            "Project with id {} not found or not owned by user",
            parent_project_id
        )));
    }

    let new_phase_data = NewPhase {
        project_id: parent_project_id,
        owner_id: user_uuid,
        name: payload.name.clone(),
        start_date: payload.start_date,
        end_date: payload.end_date,
    };

    let phase = diesel::insert_into(phases::table)
        .values(&new_phase_data)
        .get_result::<Phase>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Created().json(phase))
}

// === GET /projects/{project_id_path}/phases ===
#[get("/{project_id_path}/phases")]
pub async fn list_phases_handler(
    pool: web::Data<DbPool>,
    _authenticated_user: AuthenticatedUser,
    project_id_path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let parent_project_id = project_id_path.into_inner();

    let mut conn = pool.get().await?;

    let parent_check = projects::table
        .filter(projects::id.eq(parent_project_id))
        .select(projects::id)
        .first::<Uuid>(&mut conn)
        .await
        .optional()
        .map_err(ServiceError::from)?;

    if parent_check.is_none() {
        return Err(ServiceError::NotFound(format!(
            "Project with id {} not found",
            parent_project_id
        )));
    }

    let phase_list = phases
        .filter(project_id.eq(parent_project_id))
        .order(start_date.asc())
        .select(Phase::as_select())
        .load::<Phase>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(phase_list))
}

// === PUT /phases/{phase_id_path} ===
#[put("/{phase_id_path}")]
pub async fn update_phase_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    phase_id_path: web::Path<Uuid>,
    payload: web::Json<UpdatePhasePayload>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let phase_to_update_id = phase_id_path.into_inner();

    let phase_changes = UpdatePhaseChangeset {
        name: payload.name.clone(),
        start_date: payload.start_date,
        end_date: payload.end_date,
        updated_at: Some(Utc::now().naive_utc()),
    };

    let mut conn = pool.get().await?;

    let updated_phase = diesel::update(
        phases
            .filter(id.eq(phase_to_update_id))
            .filter(owner_id.eq(user_uuid)),
    )
    .set(&phase_changes)
    .get_result::<Phase>(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(updated_phase))
}

// === DELETE /phases/{phase_id_path} ===
#[delete("/{phase_id_path}")]
pub async fn delete_phase_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    phase_id_path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let phase_to_delete_id = phase_id_path.into_inner();

    let mut conn = pool.get().await?;

    let num_deleted = diesel::delete(
        phases
            .filter(owner_id.eq(user_uuid))
            .filter(id.eq(phase_to_delete_id)),
    )
    .execute(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    if num_deleted > 0 {
        Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": format!("Phase with id {} deleted successfully", phase_to_delete_id)
        })))
    } else {
        Err(ServiceError::NotFound(format!(
            "Phase with id {} not found or not owned by user to delete",
            phase_to_delete_id
        )))
    }
}
