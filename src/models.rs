use crate::schema::{collections, events, labels, linked_entities, phases, projects};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// --- Fonctions Helper pour la Désérialisation des Champs Optionnels/Nullables ---
// Un champ absent du JSON reste `None` (pas de changement), un `null` explicite
// devient `Some(None)` (mise à NULL en base).

// Pour Option<Option<String>>
fn deserialize_opt_opt_string<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer) {
        Ok(Some(s)) => Ok(Some(Some(s))),
        Ok(None) => Ok(Some(None)), // JSON null -> Some(None)
        Err(e) => Err(e),
    }
}

// Pour Option<Option<Vec<String>>>
fn deserialize_opt_opt_string_vec<'de, D>(
    deserializer: D,
) -> Result<Option<Option<Vec<String>>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Vec<String>>::deserialize(deserializer) {
        Ok(Some(v)) => Ok(Some(Some(v))),
        Ok(None) => Ok(Some(None)),
        Err(e) => Err(e),
    }
}

// --- Politique d'assignation des labels ---

// Valeurs autorisées pour labels.assign_permissions_type.
pub const ASSIGN_PERMISSION_TYPES: [&str; 4] =
    ["anyone", "specific_users", "team_admins", "team_members"];

pub fn is_valid_assign_permission_type(value: &str) -> bool {
    ASSIGN_PERMISSION_TYPES.contains(&value)
}

// Types d'entités acceptés par le registre de liens.
pub const LINKABLE_ENTITY_TYPES: [&str; 3] = ["collection", "project", "task"];

pub fn is_valid_linkable_entity_type(value: &str) -> bool {
    LINKABLE_ENTITY_TYPES.contains(&value)
}

// --- Collection Model ---
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = collections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Collection {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_shared: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = collections)]
pub struct NewCollection {
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    // is_shared absent: la colonne a DEFAULT FALSE, une collection naît privée
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = collections)]
pub struct UpdateCollectionChangeset {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub is_shared: Option<bool>,
    pub updated_at: Option<NaiveDateTime>,
}

// Réponse API pour GET /collections/{id} : la collection avec ses labels
// attachés (deux lectures successives, voir collection_handlers).
#[derive(Serialize, Debug, Clone)]
pub struct CollectionApiResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_shared: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub labels: Vec<Label>,
}

impl From<Collection> for CollectionApiResponse {
    fn from(collection_db: Collection) -> Self {
        CollectionApiResponse {
            id: collection_db.id,
            owner_id: collection_db.owner_id,
            name: collection_db.name,
            description: collection_db.description,
            is_shared: collection_db.is_shared,
            created_at: collection_db.created_at,
            updated_at: collection_db.updated_at,
            labels: Vec::new(), // peuplé dans le handler
        }
    }
}

// --- Label Model ---
#[derive(
    Queryable, Selectable, Identifiable, Associations, Serialize, Deserialize, Debug, Clone,
    PartialEq,
)]
#[diesel(table_name = labels)]
#[diesel(belongs_to(Collection, foreign_key = collection_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Label {
    pub id: Uuid,
    pub collection_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub description: Option<String>,
    pub assign_permissions_type: String,
    pub assign_allowed_ids: Option<Vec<String>>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = labels)]
pub struct NewLabel {
    pub collection_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub description: Option<String>,
    pub assign_permissions_type: String,
    pub assign_allowed_ids: Option<Vec<String>>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = labels)]
pub struct UpdateLabelChangeset {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub description: Option<Option<String>>,
    pub assign_permissions_type: Option<String>,
    pub assign_allowed_ids: Option<Option<Vec<String>>>,
    pub updated_at: Option<NaiveDateTime>,
}

// --- Project Model ---
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Project {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_shared: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = projects)]
pub struct NewProject {
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = projects)]
pub struct UpdateProjectChangeset {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub is_shared: Option<bool>,
    pub updated_at: Option<NaiveDateTime>,
}

// Réponse API pour GET /projects/{id} : le projet avec ses phases et
// événements attachés.
#[derive(Serialize, Debug, Clone)]
pub struct ProjectApiResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_shared: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub phases: Vec<Phase>,
    pub events: Vec<Event>,
}

impl From<Project> for ProjectApiResponse {
    fn from(project_db: Project) -> Self {
        ProjectApiResponse {
            id: project_db.id,
            owner_id: project_db.owner_id,
            name: project_db.name,
            description: project_db.description,
            is_shared: project_db.is_shared,
            created_at: project_db.created_at,
            updated_at: project_db.updated_at,
            phases: Vec::new(),
            events: Vec::new(),
        }
    }
}

// --- Phase Model ---
#[derive(
    Queryable, Selectable, Identifiable, Associations, Serialize, Deserialize, Debug, Clone,
    PartialEq,
)]
#[diesel(table_name = phases)]
#[diesel(belongs_to(Project, foreign_key = project_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Phase {
    pub id: Uuid,
    pub project_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = phases)]
pub struct NewPhase {
    pub project_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = phases)]
pub struct UpdatePhaseChangeset {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub updated_at: Option<NaiveDateTime>,
}

// --- Event Model ---
#[derive(
    Queryable, Selectable, Identifiable, Associations, Serialize, Deserialize, Debug, Clone,
    PartialEq,
)]
#[diesel(table_name = events)]
#[diesel(belongs_to(Project, foreign_key = project_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Event {
    pub id: Uuid,
    pub project_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: Option<String>,
    pub guest_emails: Option<Vec<String>>,
    pub is_shared: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Deserialize, Debug)]
#[diesel(table_name = events)]
pub struct NewEvent {
    pub project_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: Option<String>,
    pub guest_emails: Option<Vec<String>>,
    pub is_shared: Option<bool>,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = events)]
pub struct UpdateEventChangeset {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<Option<String>>,
    pub guest_emails: Option<Option<Vec<String>>>,
    pub is_shared: Option<bool>,
    pub updated_at: Option<NaiveDateTime>,
}

// --- LinkedEntity Model (registre de liens, clé (user_id, entity_id)) ---
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = linked_entities)]
#[diesel(primary_key(user_id, entity_id))]
pub struct LinkedEntity {
    pub user_id: Uuid,
    pub entity_id: Uuid,
    pub entity_type: String,
    pub linked_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = linked_entities)]
pub struct NewLinkedEntity {
    pub user_id: Uuid,
    pub entity_id: Uuid,
    pub entity_type: String,
    pub linked_at: DateTime<Utc>,
}

// --- Dashboard items : entité possédée ou liée, avec le marqueur is_linked ---
// Une entité possédée ne porte jamais is_linked = true, même si son
// propriétaire l'a aussi liée (dédoublonnage dans dashboard_handlers).

#[derive(Serialize, Debug, Clone)]
pub struct DashboardCollectionItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_shared: bool,
    pub is_linked: bool,
}

impl From<Collection> for DashboardCollectionItem {
    fn from(collection_db: Collection) -> Self {
        DashboardCollectionItem {
            id: collection_db.id,
            owner_id: collection_db.owner_id,
            name: collection_db.name,
            description: collection_db.description,
            is_shared: collection_db.is_shared,
            is_linked: false,
        }
    }
}

impl DashboardCollectionItem {
    pub fn linked(mut self) -> Self {
        self.is_linked = true;
        self
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct DashboardProjectItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_shared: bool,
    pub is_linked: bool,
}

impl From<Project> for DashboardProjectItem {
    fn from(project_db: Project) -> Self {
        DashboardProjectItem {
            id: project_db.id,
            owner_id: project_db.owner_id,
            name: project_db.name,
            description: project_db.description,
            is_shared: project_db.is_shared,
            is_linked: false,
        }
    }
}

impl DashboardProjectItem {
    pub fn linked(mut self) -> Self {
        self.is_linked = true;
        self
    }
}

// --- PAYLOAD DTOs ---

#[derive(Deserialize, Debug)]
pub struct CreateCollectionPayload {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateCollectionPayload {
    pub name: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_opt_string", default)]
    pub description: Option<Option<String>>,
    pub is_shared: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct CreateLabelPayload {
    pub name: String,
    pub color: String,
    pub icon: String,
    pub description: Option<String>,
    pub assign_permissions_type: String,
    pub assign_allowed_ids: Option<Vec<String>>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateLabelPayload {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_opt_string", default)]
    pub description: Option<Option<String>>,
    pub assign_permissions_type: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_opt_string_vec", default)]
    pub assign_allowed_ids: Option<Option<Vec<String>>>,
}

#[derive(Deserialize, Debug)]
pub struct CreateProjectPayload {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateProjectPayload {
    pub name: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_opt_string", default)]
    pub description: Option<Option<String>>,
    pub is_shared: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct CreatePhasePayload {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Deserialize, Debug)]
pub struct UpdatePhasePayload {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Deserialize, Debug)]
pub struct CreateEventPayload {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub location: Option<String>,
    pub guest_emails: Option<Vec<String>>,
    pub is_shared: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateEventPayload {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(deserialize_with = "deserialize_opt_opt_string", default)]
    pub location: Option<Option<String>>,
    #[serde(deserialize_with = "deserialize_opt_opt_string_vec", default)]
    pub guest_emails: Option<Option<Vec<String>>>,
    pub is_shared: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct LinkEntityPayload {
    pub entity_id: Uuid,
    pub entity_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_permission_type_whitelist() {
        for value in ASSIGN_PERMISSION_TYPES {
            assert!(is_valid_assign_permission_type(value));
        }
        assert!(!is_valid_assign_permission_type("everyone"));
        assert!(!is_valid_assign_permission_type(""));
        assert!(!is_valid_assign_permission_type("Team_Admins"));
    }

    #[test]
    fn linkable_entity_type_whitelist() {
        assert!(is_valid_linkable_entity_type("collection"));
        assert!(is_valid_linkable_entity_type("project"));
        assert!(is_valid_linkable_entity_type("task"));
        assert!(!is_valid_linkable_entity_type("label"));
        assert!(!is_valid_linkable_entity_type("Collection"));
    }

    // Champ absent vs null explicite sur les mises à jour partielles.
    #[test]
    fn update_payload_absent_field_stays_none() {
        let payload: UpdateCollectionPayload = serde_json::from_str(r#"{"name":"Alpha"}"#).unwrap();
        assert_eq!(payload.name.as_deref(), Some("Alpha"));
        assert_eq!(payload.description, None);
        assert_eq!(payload.is_shared, None);
    }

    #[test]
    fn update_payload_explicit_null_clears_field() {
        let payload: UpdateCollectionPayload =
            serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(payload.description, Some(None));
    }

    #[test]
    fn update_event_payload_null_vs_absent_guest_emails() {
        let cleared: UpdateEventPayload =
            serde_json::from_str(r#"{"guest_emails":null}"#).unwrap();
        assert_eq!(cleared.guest_emails, Some(None));

        let untouched: UpdateEventPayload = serde_json::from_str(r#"{"name":"Kickoff"}"#).unwrap();
        assert_eq!(untouched.guest_emails, None);

        let replaced: UpdateEventPayload =
            serde_json::from_str(r#"{"guest_emails":["a@b.co","c@d.co"]}"#).unwrap();
        assert_eq!(
            replaced.guest_emails,
            Some(Some(vec!["a@b.co".to_string(), "c@d.co".to_string()]))
        );
    }

    #[test]
    fn create_event_payload_defaults() {
        let payload: CreateEventPayload = serde_json::from_str(
            r#"{"name":"Sync","start_date":"2026-05-15","end_date":"2026-05-15"}"#,
        )
        .unwrap();
        assert_eq!(payload.location, None);
        assert_eq!(payload.guest_emails, None);
        assert_eq!(payload.is_shared, None);
    }
}
