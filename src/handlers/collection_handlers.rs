// linkhub-backend/src/collection_handlers.rs
use crate::auth_utils::AuthenticatedUser;
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::models::{
    Collection, CollectionApiResponse, CreateCollectionPayload, Label, NewCollection,
    UpdateCollectionChangeset, UpdateCollectionPayload,
};
use crate::schema::{
    collections::{self, dsl::*},
    labels,
};
use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde_json::json;
use uuid::Uuid;

// === POST /collections ===
#[post("")]
pub async fn create_collection_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    payload: web::Json<CreateCollectionPayload>,
) -> Result<HttpResponse, ServiceError> {
    let new_collection_data = NewCollection {
        owner_id: authenticated_user.id,
        name: payload.name.clone(),
        description: payload.description.clone(),
    };

    // Obtenir une connexion du pool
    let mut conn = pool.get().await?;

    let collection = diesel::insert_into(collections::table)
        .values(&new_collection_data)
        .get_result::<Collection>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Created().json(collection))
}

// === GET /collections ===
// Les collections possédées par l'appelant.
#[get("")]
pub async fn list_collections_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;

    let mut conn = pool.get().await?;

    let collection_list = collections
        .filter(owner_id.eq(user_uuid))
        .order(created_at.desc())
        .select(Collection::as_select())
        .load::<Collection>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(collection_list))
}

// === GET /collections/shared ===
// Le pool partagé : toutes les collections marquées is_shared, quel que
// soit le propriétaire. Enregistré avant /{collection_id_path} dans main.rs.
#[get("/shared")]
pub async fn list_shared_collections_handler(
    pool: web::Data<DbPool>,
    _authenticated_user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    let mut conn = pool.get().await?;

    let shared_list = collections
        .filter(is_shared.eq(true))
        .order(created_at.desc())
        .select(Collection::as_select())
        .load::<Collection>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(shared_list))
}

// === GET /collections/{collection_id_path} ===
// Pas de filtre propriétaire : les collections partagées/liées restent
// lisibles par les non-propriétaires. Les labels sont attachés par une
// seconde lecture, sans garantie de cohérence entre les deux.
#[get("/{collection_id_path}")]
pub async fn get_collection_handler(
    pool: web::Data<DbPool>,
    _authenticated_user: AuthenticatedUser,
    collection_id_path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let collection_to_find_id = collection_id_path.into_inner();

    let mut conn = pool.get().await?;

    let collection_option = collections
        .filter(id.eq(collection_to_find_id))
        .select(Collection::as_select())
        .first::<Collection>(&mut conn)
        .await
        .optional()
        .map_err(ServiceError::from)?;

    let collection = match collection_option {
        Some(c) => c,
        None => {
            return Err(ServiceError::NotFound(format!(
                "Collection with id {} not found",
                collection_to_find_id
            )))
        }
    };

    let collection_labels = labels::table
        .filter(labels::collection_id.eq(collection.id))
        .order(labels::name.asc())
        .select(Label::as_select())
        .load::<Label>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    let mut response = CollectionApiResponse::from(collection);
    response.labels = collection_labels;

    Ok(HttpResponse::Ok().json(response))
}

// === PUT /collections/{collection_id_path} ===
#[put("/{collection_id_path}")]
pub async fn update_collection_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    collection_id_path: web::Path<Uuid>,
    payload: web::Json<UpdateCollectionPayload>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let collection_to_update_id = collection_id_path.into_inner();

    let collection_changes = UpdateCollectionChangeset {
        name: payload.name.clone(),
        description: payload.description.clone(),
        is_shared: payload.is_shared,
        updated_at: Some(Utc::now().naive_utc()),
    };

    let mut conn = pool.get().await?;

    let updated_collection = diesel::update(
        collections
            .filter(id.eq(collection_to_update_id))
            .filter(owner_id.eq(user_uuid)),
    )
    .set(&collection_changes)
    .get_result::<Collection>(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(updated_collection))
}

// === DELETE /collections/{collection_id_path} ===
// Labels enfants et collection parente supprimés dans une même transaction :
// un échec sur le parent annule aussi la suppression des enfants.
#[delete("/{collection_id_path}")]
pub async fn delete_collection_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    collection_id_path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let collection_to_delete_id = collection_id_path.into_inner();

    let mut conn = pool.get().await?;

    // Vérifier la propriété avant de toucher aux enfants
    let owned_check = collections
        .filter(id.eq(collection_to_delete_id))
        .filter(owner_id.eq(user_uuid))
        .select(id)
        .first::<Uuid>(&mut conn)
        .await
        .optional()
        .map_err(ServiceError::from)?;

    if owned_check.is_none() {
        return Err(ServiceError::NotFound(format!(
            "Collection with id {} not found or not owned by user to delete",
            collection_to_delete_id
        )));
    }

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        async move {
            diesel::delete(
                labels::table.filter(labels::collection_id.eq(collection_to_delete_id)),
            )
            .execute(conn)
            .await?;

            diesel::delete(
                collections::table
                    .filter(collections::id.eq(collection_to_delete_id))
                    .filter(collections::owner_id.eq(user_uuid)),
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
        "message": format!("Collection with id {} deleted successfully", collection_to_delete_id)
    })))
}
