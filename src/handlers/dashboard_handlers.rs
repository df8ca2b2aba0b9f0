// linkhub-backend/src/dashboard_handlers.rs
//
// "My items" views: entities the caller owns plus entities they linked
// from the shared pool, deduplicated when both apply.
use crate::auth_utils::AuthenticatedUser;
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::models::{Collection, DashboardCollectionItem, DashboardProjectItem, Project};
use crate::schema::{collections, linked_entities, projects};
use actix_web::{get, web, HttpResponse};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use std::collections::HashSet;
use uuid::Uuid;

/// Split `linked` into the entities not already present in `owned`.
/// Owned entities win: an owner who also linked their own item must see it
/// exactly once, without the linked marker. Owned-first order is preserved.
pub fn merge_owned_and_linked<T, F>(owned: Vec<T>, linked: Vec<T>, id_of: F) -> (Vec<T>, Vec<T>)
where
    F: Fn(&T) -> Uuid,
{
    let owned_ids: HashSet<Uuid> = owned.iter().map(&id_of).collect();
    let unique_linked: Vec<T> = linked
        .into_iter()
        .filter(|entity| !owned_ids.contains(&id_of(entity)))
        .collect();
    (owned, unique_linked)
}

// === GET /dashboard/collections ===
#[get("/collections")]
pub async fn dashboard_collections_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;

    let mut conn = pool.get().await?;

    let owned = collections::table
        .filter(collections::owner_id.eq(user_uuid))
        .order(collections::created_at.desc())
        .select(Collection::as_select())
        .load::<Collection>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    let linked_ids = linked_entities::table
        .filter(linked_entities::user_id.eq(user_uuid))
        .filter(linked_entities::entity_type.eq("collection"))
        .select(linked_entities::entity_id)
        .load::<Uuid>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    // Stale links (target deleted) simply drop out of the id-in-set fetch.
    let linked = if linked_ids.is_empty() {
        Vec::new()
    } else {
        collections::table
            .filter(collections::id.eq_any(&linked_ids))
            .select(Collection::as_select())
            .load::<Collection>(&mut conn)
            .await
            .map_err(ServiceError::from)?
    };

    let (owned, unique_linked) = merge_owned_and_linked(owned, linked, |c| c.id);

    let mut items: Vec<DashboardCollectionItem> =
        owned.into_iter().map(DashboardCollectionItem::from).collect();
    items.extend(
        unique_linked
            .into_iter()
            .map(|c| DashboardCollectionItem::from(c).linked()),
    );

    Ok(HttpResponse::Ok().json(items))
}

// === GET /dashboard/projects ===
#[get("/projects")]
pub async fn dashboard_projects_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;

    let mut conn = pool.get().await?;

    let owned = projects::table
        .filter(projects::owner_id.eq(user_uuid))
        .order(projects::created_at.desc())
        .select(Project::as_select())
        .load::<Project>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    let linked_ids = linked_entities::table
        .filter(linked_entities::user_id.eq(user_uuid))
        .filter(linked_entities::entity_type.eq("project"))
        .select(linked_entities::entity_id)
        .load::<Uuid>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    let linked = if linked_ids.is_empty() {
        Vec::new()
    } else {
        projects::table
            .filter(projects::id.eq_any(&linked_ids))
            .select(Project::as_select())
            .load::<Project>(&mut conn)
            .await
            .map_err(ServiceError::from)?
    };

    let (owned, unique_linked) = merge_owned_and_linked(owned, linked, |p| p.id);

    let mut items: Vec<DashboardProjectItem> =
        owned.into_iter().map(DashboardProjectItem::from).collect();
    items.extend(
        unique_linked
            .into_iter()
            .map(|p| DashboardProjectItem::from(p).linked()),
    );

    Ok(HttpResponse::Ok().json(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: Uuid,
        name: &'static str,
    }

    fn item(name: &'static str) -> Item {
        Item {
            id: Uuid::new_v4(),
            name,
        }
    }

    #[test]
    fn linked_duplicates_of_owned_are_dropped() {
        let shared = item("both");
        let owned = vec![item("mine"), shared.clone()];
        let linked = vec![shared.clone(), item("theirs")];

        let (owned, unique_linked) = merge_owned_and_linked(owned, linked, |i| i.id);

        assert_eq!(owned.len(), 2);
        assert_eq!(unique_linked.len(), 1);
        assert_eq!(unique_linked[0].name, "theirs");
    }

    #[test]
    fn owned_order_is_preserved_and_comes_first() {
        let owned = vec![item("a"), item("b"), item("c")];
        let owned_ids: Vec<Uuid> = owned.iter().map(|i| i.id).collect();
        let linked = vec![item("x")];

        let (merged_owned, unique_linked) = merge_owned_and_linked(owned, linked, |i| i.id);

        let merged_ids: Vec<Uuid> = merged_owned.iter().map(|i| i.id).collect();
        assert_eq!(merged_ids, owned_ids);
        assert_eq!(unique_linked.len(), 1);
    }

    #[test]
    fn empty_inputs_merge_to_empty_outputs() {
        let (owned, linked) =
            merge_owned_and_linked(Vec::<Item>::new(), Vec::<Item>::new(), |i| i.id);
        assert!(owned.is_empty());
        assert!(linked.is_empty());
    }

    #[test]
    fn owned_items_never_carry_the_linked_marker() {
        let collection = Collection {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Alpha".to_string(),
            description: Some("Deliverables".to_string()),
            is_shared: false,
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            updated_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        };

        let owned_item = DashboardCollectionItem::from(collection.clone());
        assert!(!owned_item.is_linked);

        let linked_item = DashboardCollectionItem::from(collection).linked();
        assert!(linked_item.is_linked);
    }
}
