use std::sync::Arc;

use app_core::store::StoreError;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::Uuid;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::entity::prelude::Users;
use super::entity::users;
use super::repository::ProfileRepository;
use crate::domain::entity::profile::{NewProfile, ProfileUpdatePayload, Role, UserProfile};

/// `ProfileORM` is the SeaORM adapter of the `users` table.
///
/// Identity ids are stored as `uuid`; an id that does not parse is a fatal
/// store error since no row could ever match it.
pub struct ProfileORM {
    db: Arc<DatabaseConnection>,
}

impl ProfileORM {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn parse_id(id: &str) -> Result<Uuid, StoreError> {
        Uuid::parse_str(id).map_err(|e| StoreError::Fatal(format!("invalid user id {id:?}: {e}")))
    }

    fn to_profile(model: users::Model) -> UserProfile {
        let role = model.role.parse::<Role>().unwrap_or_else(|err| {
            tracing::warn!(user_id = %model.id, "Falling back to default role: {}", err);
            Role::default()
        });

        UserProfile {
            id: model.id.to_string(),
            email: model.email,
            full_name: model.full_name,
            avatar_url: model.avatar_url,
            role,
            created_at: model.created_at.to_utc(),
            updated_at: model.updated_at.to_utc(),
        }
    }
}

#[async_trait]
impl ProfileRepository for ProfileORM {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        let model = Users::find_by_id(Self::parse_id(id)?).one(self.db.as_ref()).await?;

        Ok(model.map(Self::to_profile))
    }

    async fn insert(&self, profile: &NewProfile) -> Result<UserProfile, StoreError> {
        let id = Self::parse_id(&profile.id)?;
        let now = Utc::now().fixed_offset();

        let model = users::ActiveModel {
            id: ActiveValue::Set(id),
            email: ActiveValue::Set(profile.email.clone()),
            full_name: ActiveValue::Set(Some(profile.full_name.clone())),
            avatar_url: ActiveValue::Set(Some(profile.avatar_url.clone())),
            role: ActiveValue::Set(profile.role.to_string()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let inserted = Users::insert(model)
            .on_conflict(OnConflict::column(users::Column::Id).do_nothing().to_owned())
            .exec_without_returning(self.db.as_ref())
            .await?;

        // ON CONFLICT DO NOTHING reports a duplicate id as zero inserted rows.
        if inserted == 0 {
            return Err(StoreError::Conflict(format!("users.id {id}")));
        }

        Ok(UserProfile {
            id: id.to_string(),
            email: profile.email.clone(),
            full_name: Some(profile.full_name.clone()),
            avatar_url: Some(profile.avatar_url.clone()),
            role: profile.role,
            created_at: now.to_utc(),
            updated_at: now.to_utc(),
        })
    }

    async fn update(&self, payload: ProfileUpdatePayload) -> Result<UserProfile, StoreError> {
        let id = Self::parse_id(&payload.id)?;

        let mut active_model = users::ActiveModel { ..Default::default() };

        if let Some(full_name) = payload.full_name {
            active_model.full_name = ActiveValue::Set(Some(full_name));
        }
        if let Some(avatar_url) = payload.avatar_url {
            active_model.avatar_url = ActiveValue::Set(Some(avatar_url));
        }
        active_model.updated_at = ActiveValue::Set(Utc::now().fixed_offset());

        let result = Users::update_many()
            .set(active_model)
            .filter(users::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound(format!("users.id {id}")));
        }

        self.find_by_id(&payload.id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("users.id {id}")))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let result = Users::delete_by_id(Self::parse_id(id)?).exec(self.db.as_ref()).await?;

        tracing::debug!(user_id = id, rows_affected = result.rows_affected, "Profile row deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr};

    use super::*;

    const USER_ID: &str = "0b7e1c2a-6a4f-4c55-9d0e-6f2f4f3b1a11";

    fn setup_mock_db(
        query_results: Option<Vec<Vec<users::Model>>>,
        exec_results: Option<Vec<MockExecResult>>,
        exec_errors: Option<Vec<DbErr>>,
    ) -> ProfileORM {
        let mut db = MockDatabase::new(DatabaseBackend::Postgres);

        if let Some(qr) = query_results {
            db = db.append_query_results(qr);
        }
        if let Some(er) = exec_results {
            db = db.append_exec_results(er);
        }
        if let Some(ee) = exec_errors {
            db = db.append_exec_errors(ee);
        }

        ProfileORM::new(Arc::new(db.into_connection()))
    }

    fn user_model(email: &str, role: &str) -> users::Model {
        let now = Utc::now().with_timezone(&FixedOffset::east_opt(0).unwrap());
        users::Model {
            id: Uuid::parse_str(USER_ID).unwrap(),
            email: email.to_string(),
            full_name: Some("Pro Player".to_string()),
            avatar_url: None,
            role: role.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn exec_result(rows_affected: u64) -> MockExecResult {
        MockExecResult { last_insert_id: 0, rows_affected }
    }

    fn new_profile() -> NewProfile {
        NewProfile {
            id: USER_ID.to_string(),
            email: "player@zonehub.gg".to_string(),
            full_name: "player".to_string(),
            avatar_url: "/placeholder.svg".to_string(),
            role: Role::Member,
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let repo = setup_mock_db(Some(vec![vec![user_model("player@zonehub.gg", "editor")], vec![]]), None, None);

        let profile = repo.find_by_id(USER_ID).await.unwrap().unwrap();
        assert_eq!(profile.id, USER_ID);
        assert_eq!(profile.email, "player@zonehub.gg");
        assert_eq!(profile.role, Role::Editor);

        let missing = repo.find_by_id(USER_ID).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_unknown_role_defaults_to_member() {
        let repo = setup_mock_db(Some(vec![vec![user_model("player@zonehub.gg", "owner")]]), None, None);

        let profile = repo.find_by_id(USER_ID).await.unwrap().unwrap();

        assert_eq!(profile.role, Role::Member);
    }

    #[tokio::test]
    async fn test_find_by_id_invalid_uuid() {
        let repo = setup_mock_db(None, None, None);

        let result = repo.find_by_id("u1").await;

        assert!(matches!(result, Err(StoreError::Fatal(_))));
    }

    #[tokio::test]
    async fn test_insert_success() {
        let repo = setup_mock_db(None, Some(vec![exec_result(1)]), None);

        let profile = repo.insert(&new_profile()).await.unwrap();

        assert_eq!(profile.id, USER_ID);
        assert_eq!(profile.full_name.as_deref(), Some("player"));
        assert_eq!(profile.avatar_url.as_deref(), Some("/placeholder.svg"));
        assert_eq!(profile.role, Role::Member);
    }

    #[tokio::test]
    async fn test_insert_duplicate_is_conflict() {
        let repo = setup_mock_db(None, Some(vec![exec_result(0)]), None);

        let result = repo.insert(&new_profile()).await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_insert_connection_error_is_transient() {
        let repo = setup_mock_db(None, None, Some(vec![DbErr::Conn(RuntimeErr::Internal("connection reset".into()))]));

        let result = repo.insert(&new_profile()).await;

        assert!(matches!(result, Err(StoreError::Transient(_))));
    }

    #[tokio::test]
    async fn test_update_success() {
        let mut updated = user_model("player@zonehub.gg", "member");
        updated.full_name = Some("New Name".to_string());

        let repo = setup_mock_db(Some(vec![vec![updated]]), Some(vec![exec_result(1)]), None);

        let profile = repo
            .update(ProfileUpdatePayload {
                id: USER_ID.to_string(),
                full_name: Some("New Name".to_string()),
                avatar_url: None,
            })
            .await
            .unwrap();

        assert_eq!(profile.full_name.as_deref(), Some("New Name"));
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let repo = setup_mock_db(None, Some(vec![exec_result(0)]), None);

        let result = repo
            .update(ProfileUpdatePayload { id: USER_ID.to_string(), full_name: Some("x".to_string()), avatar_url: None })
            .await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = setup_mock_db(None, Some(vec![exec_result(1), exec_result(0)]), None);

        assert!(repo.delete(USER_ID).await.is_ok());
        assert!(repo.delete(USER_ID).await.is_ok());
    }
}
