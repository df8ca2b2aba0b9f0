// linkhub-backend/src/event_handlers.rs
use crate::auth_utils::AuthenticatedUser;
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::models::{
    CreateEventPayload, Event, NewEvent, UpdateEventChangeset, UpdateEventPayload,
};
use crate::schema::{
    events::{self, dsl::*},
    projects,
};
use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::json;
use uuid::Uuid;

// === POST /projects/{project_id_path}/events ===
#[post("/{project_id_path}/events")]
pub async fn create_event_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    project_id_path: web::Path<Uuid>,
    payload: web::Json<CreateEventPayload>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let parent_project_id = project_id_path.into_inner();

    log::info!(
        "User {} creating event in project {}: {:?}",
        user_uuid,
        parent_project_id,
        payload
    );

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

    let new_event_data = NewEvent {
        project_id: parent_project_id,
        owner_id: user_uuid,
        name: payload.name.clone(),
        start_date: payload.start_date,
        end_date: payload.end_date,
        location: payload.location.clone(),
        guest_emails: payload.guest_emails.clone(),
        is_shared: payload.is_shared,
    };

    let event = diesel::insert_into(events::table)
        .values(&new_event_data)
        .get_result::<Event>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Created().json(event))
}

// === GET /projects/{project_id_path}/events ===
#[get("/{project_id_path}/events")]
pub async fn list_events_handler(
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

    let event_list = events
        .filter(project_id.eq(parent_project_id))
        .order(start_date.asc())
        .select(Event::as_select())
        .load::<Event>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(event_list))
}

// === PUT /events/{event_id_path} ===
#[put("/{event_id_path}")]
pub async fn update_event_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    event_id_path: web::Path<Uuid>,
    payload: web::Json<UpdateEventPayload>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let event_to_update_id = event_id_path.into_inner();

    let event_changes = UpdateEventChangeset {
        name: payload.name.clone(),
        start_date: payload.start_date,
        end_date: payload.end_date,
        location: payload.location.clone(),
        guest_emails: payload.guest_emails.clone(),
        is_shared: payload.is_shared,
        updated_at: Some(Utc::now().naive_utc()),
    };

    let mut conn = pool.get().await?;

    let updated_event = diesel::update(
        events
            .filter(id.eq(event_to_update_id))
            .filter(owner_id.eq(user_uuid)),
    )
    .set(&event_changes)
    .get_result::<Event>(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(updated_event))
}

// === DELETE /events/{event_id_path} ===
#[delete("/{event_id_path}")]
pub async fn delete_event_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    event_id_path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let event_to_delete_id = event_id_path.into_inner();

    let mut conn = pool.get().await?;

    let num_deleted = diesel::delete(
        events
            .filter(owner_id.eq(user_uuid))
            .filter(id.eq(event_to_delete_id)),
    )
    .execute(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    if num_deleted > 0 {
        Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": format!("Event with id {} deleted successfully", event_to_delete_id)
        })))
    } else {
        Err(ServiceError::NotFound(format!(
            "Event with id {} not found or not owned by user to delete",
            event_to_delete_id
        )))
    }
}
