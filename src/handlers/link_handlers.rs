// linkhub-backend/src/link_handlers.rs
//
// Link registry: one row per (user, entity), tracking which shared
// entities a user has pulled into their personal view.
use crate::auth_utils::AuthenticatedUser;
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::models::{
    is_valid_linkable_entity_type, LinkEntityPayload, LinkedEntity, NewLinkedEntity,
    LINKABLE_ENTITY_TYPES,
};
use crate::schema::linked_entities::{self, dsl::*};
use actix_web::{delete, get, post, web, HttpResponse, Result as ActixResult};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

// DTO for the listing query parameters
#[derive(Deserialize, Debug)]
pub struct ListLinksQuery {
    pub entity_type: String,
}

// === POST /links ===
// Upsert keyed on (user_id, entity_id): re-linking an already-linked
// entity only refreshes the timestamp.
#[post("")]
pub async fn link_entity_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    payload: web::Json<LinkEntityPayload>,
) -> ActixResult<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;

    if !is_valid_linkable_entity_type(&payload.entity_type) {
        return Err(ServiceError::BadRequest(format!(
            "Invalid entity type '{}'. Expected one of: {}.",
            payload.entity_type,
            LINKABLE_ENTITY_TYPES.join(", ")
        )));
    }

    log::info!(
        "User {} linking {} {}",
        user_uuid,
        payload.entity_type,
        payload.entity_id
    );

    let now = Utc::now();
    let new_link = NewLinkedEntity {
        user_id: user_uuid,
        entity_id: payload.entity_id,
        entity_type: payload.entity_type.clone(),
        linked_at: now,
    };

    let mut conn = pool.get().await?;

    let link_row = diesel::insert_into(linked_entities::table)
        .values(&new_link)
        .on_conflict((linked_entities::user_id, linked_entities::entity_id))
        .do_update()
        .set((
            linked_entities::entity_type.eq(&payload.entity_type),
            linked_entities::linked_at.eq(now),
        ))
        .get_result::<LinkedEntity>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Created().json(link_row))
}

// === GET /links?entity_type=... ===
// The set of entity ids the caller has linked for the given type.
#[get("")]
pub async fn list_linked_ids_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    query: web::Query<ListLinksQuery>,
) -> ActixResult<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;

    if !is_valid_linkable_entity_type(&query.entity_type) {
        return Err(ServiceError::BadRequest(format!(
            "Invalid entity type '{}'. Expected one of: {}.",
            query.entity_type,
            LINKABLE_ENTITY_TYPES.join(", ")
        )));
    }

    let mut conn = pool.get().await?;

    let linked_ids = linked_entities
        .filter(user_id.eq(user_uuid))
        .filter(entity_type.eq(&query.entity_type))
        .select(entity_id)
        .load::<Uuid>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(linked_ids))
}

// === DELETE /links/{entity_id_path} ===
// Unlinking an entity that was never linked is a no-op, not an error.
#[delete("/{entity_id_path}")]
pub async fn unlink_entity_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    entity_id_path: web::Path<Uuid>,
) -> ActixResult<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let entity_to_unlink_id = entity_id_path.into_inner();

    let mut conn = pool.get().await?;

    let num_deleted = diesel::delete(
        linked_entities
            .filter(user_id.eq(user_uuid))
            .filter(entity_id.eq(entity_to_unlink_id)),
    )
    .execute(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    if num_deleted == 0 {
        log::debug!(
            "User {} unlinked {} which was not linked",
            user_uuid,
            entity_to_unlink_id
        );
    }

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": format!("Entity {} unlinked", entity_to_unlink_id)
    })))
}
