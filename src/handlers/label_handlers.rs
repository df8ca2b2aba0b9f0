// linkhub-backend/src/label_handlers.rs
use crate::auth_utils::AuthenticatedUser;
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::models::{
    is_valid_assign_permission_type, CreateLabelPayload, Label, NewLabel, UpdateLabelChangeset,
    UpdateLabelPayload, ASSIGN_PERMISSION_TYPES,
};
use crate::schema::{
    collections,
    labels::{self, dsl::*},
};
use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::json;
use uuid::Uuid;

// === POST /collections/{collection_id_path}/labels ===
// La collection parente doit exister ; la politique d'assignation est
// validée avant toute écriture. Le label appartient à l'appelant.
#[post("/{collection_id_path}/labels")]
pub async fn create_label_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    collection_id_path: web::Path<Uuid>,
    payload: web::Json<CreateLabelPayload>,
) -> Result<HttpResponse, ServiceError> {
    let parent_collection_id = collection_id_path.into_inner();

    log::info!("Create label payload received: {:?}", payload);

    if !is_valid_assign_permission_type(&payload.assign_permissions_type) {
        return Err(ServiceError::BadRequest(format!(
            "Invalid assign permission type '{}'. Expected one of: {}.",
            payload.assign_permissions_type,
            ASSIGN_PERMISSION_TYPES.join(", ")
        )));
    }

    // Obtenir une connexion du pool
    let mut conn = pool.get().await?;

    // Vérifier que la collection parente existe
    let parent_check = collections::table
        .filter(collections::id.eq(parent_collection_id))
        .select(collections::id)
        .first::<Uuid>(&mut conn)
        .await
        .optional()
        .map_err(ServiceError::from)?;

    if parent_check.is_none() {
        return Err(ServiceError::NotFound(format!(
            "Collection with id {} not found",
            parent_collection_id
        )));
    }

    let new_label_data = NewLabel {
        collection_id: parent_collection_id,
        owner_id: authenticated_user.id,
        name: payload.name.clone(),
        color: payload.color.clone(),
        icon: payload.icon.clone(),
        description: payload.description.clone(),
        assign_permissions_type: payload.assign_permissions_type.clone(),
        assign_allowed_ids: payload.assign_allowed_ids.clone(),
    };

    let created_label = diesel::insert_into(labels::table)
        .values(&new_label_data)
        .get_result::<Label>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    log::info!("Label created successfully: {:?}", created_label);
    Ok(HttpResponse::Created().json(created_label))
}

// === GET /collections/{collection_id_path}/labels ===
#[get("/{collection_id_path}/labels")]
pub async fn list_labels_for_collection_handler(
    pool: web::Data<DbPool>,
    _authenticated_user: AuthenticatedUser,
    collection_id_path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let parent_collection_id = collection_id_path.into_inner();

    let mut conn = pool.get().await?;

    let parent_check = collections::table
        .filter(collections::id.eq(parent_collection_id))
        .select(collections::id)
        .first::<Uuid>(&mut conn)
        .await
        .optional()
        .map_err(ServiceError::from)?;

    if parent_check.is_none() {
        return Err(ServiceError::NotFound(format!(
            "Collection with id {} not found",
            parent_collection_id
        )));
    }

    let label_list = labels
        .filter(collection_id.eq(parent_collection_id))
        .order(name.asc())
        .select(Label::as_select())
        .load::<Label>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(label_list))
}

// === GET /labels/{label_id_path} ===
#[get("/{label_id_path}")]
pub async fn get_label_handler(
    pool: web::Data<DbPool>,
    _authenticated_user: AuthenticatedUser,
    label_id_path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let label_to_find_id = label_id_path.into_inner();

    let mut conn = pool.get().await?;

    let label_option = labels
        .filter(id.eq(label_to_find_id))
        .select(Label::as_select())
        .first::<Label>(&mut conn)
        .await
        .optional()
        .map_err(ServiceError::from)?;

    match label_option {
        Some(label) => Ok(HttpResponse::Ok().json(label)),
        None => Err(ServiceError::NotFound(format!(
            "Label with id {} not found",
            label_to_find_id
        ))),
    }
}

// === PUT /labels/{label_id_path} ===
#[put("/{label_id_path}")]
pub async fn update_label_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    label_id_path: web::Path<Uuid>,
    payload: web::Json<UpdateLabelPayload>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let label_to_update_id = label_id_path.into_inner();

    if let Some(permission_type) = &payload.assign_permissions_type {
        if !is_valid_assign_permission_type(permission_type) {
            return Err(ServiceError::BadRequest(format!(
                "Invalid assign permission type '{}'. Expected one of: {}.",
                permission_type,
                ASSIGN_PERMISSION_TYPES.join(", ")
            )));
        }
    }

    let label_changes = UpdateLabelChangeset {
        name: payload.name.clone(),
        color: payload.color.clone(),
        icon: payload.icon.clone(),
        description: payload.description.clone(),
        assign_permissions_type: payload.assign_permissions_type.clone(),
        assign_allowed_ids: payload.assign_allowed_ids.clone(),
        updated_at: Some(Utc::now().naive_utc()),
    };

    let mut conn = pool.get().await?;

    let updated_label = diesel::update(
        labels
            .filter(id.eq(label_to_update_id))
            .filter(owner_id.eq(user_uuid)),
    )
    .set(&label_changes)
    .get_result::<Label>(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(updated_label))
}

// === DELETE /labels/{label_id_path} ===
#[delete("/{label_id_path}")]
pub async fn delete_label_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    label_id_path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let label_to_delete_id = label_id_path.into_inner();

    let mut conn = pool.get().await?;

    let num_deleted = diesel::delete(
        labels
            .filter(owner_id.eq(user_uuid))
            .filter(id.eq(label_to_delete_id)),
    )
    .execute(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    if num_deleted > 0 {
        Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": format!("Label with id {} deleted successfully", label_to_delete_id)
        })))
    } else {
        Err(ServiceError::NotFound(format!(
            "Label with id {} not found or not owned by user to delete",
            label_to_delete_id
        )))
    }
}
