use super::{parent_uid, upsert, Applied, EntityHandler, EntityKind, ReconcileReport};
use crate::db::{Deletable, LinkStore, RowStore, Stores};
use crate::error::Result;
use crate::models::{
    LinkKey, LinkRow, UserCredentialsRow, UserOrganisationUnitRow, UserRoleRow, UserRow,
};
use crate::payload::{ObjectRef, Syncable, User, UserCredentials, UserRole};

#[derive(Debug, Clone, Copy)]
pub struct UserHandler<'c> {
    users: RowStore<'c, UserRow>,
    credentials: UserCredentialsHandler<'c>,
    organisation_units: UserOrganisationUnitHandler<'c>,
}

impl<'c> UserHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            users: stores.users,
            credentials: UserCredentialsHandler::new(stores),
            organisation_units: UserOrganisationUnitHandler::new(stores),
        }
    }
}

impl EntityHandler for UserHandler<'_> {
    type Entity = User;
    const KIND: EntityKind = EntityKind::User;

    fn delete(&self, _parent: Option<&str>, user: &User) -> Result<usize> {
        self.users.delete(user.uid())
    }

    fn write(&self, _parent: Option<&str>, user: &User) -> Result<Applied> {
        let identity = &user.identity;
        let row = UserRow {
            uid: identity.uid.clone(),
            code: identity.code.clone(),
            name: identity.name.clone(),
            display_name: identity.display_name.clone(),
            created: identity.created,
            last_updated: identity.last_updated,
            birthday: user.birthday.clone(),
            education: user.education.clone(),
            gender: user.gender.clone(),
            job_title: user.job_title.clone(),
            surname: user.surname.clone(),
            first_name: user.first_name.clone(),
            introduction: user.introduction.clone(),
            employer: user.employer.clone(),
            interests: user.interests.clone(),
            languages: user.languages.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            nationality: user.nationality.clone(),
        };
        upsert(&self.users, &row, user.uid())
    }

    fn handle_children(&self, user: &User, report: &mut ReconcileReport) -> Result<()> {
        let uid = Some(user.uid());
        self.credentials
            .handle(uid, user.user_credentials.as_slice(), report)?;
        self.organisation_units
            .handle(uid, &user.organisation_units, report)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UserCredentialsHandler<'c> {
    credentials: RowStore<'c, UserCredentialsRow>,
    roles: UserRoleHandler<'c>,
}

impl<'c> UserCredentialsHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            credentials: stores.user_credentials,
            roles: UserRoleHandler::new(stores),
        }
    }
}

impl EntityHandler for UserCredentialsHandler<'_> {
    type Entity = UserCredentials;
    const KIND: EntityKind = EntityKind::UserCredentials;

    fn delete(&self, _parent: Option<&str>, credentials: &UserCredentials) -> Result<usize> {
        self.credentials.delete(credentials.uid())
    }

    fn write(&self, parent: Option<&str>, credentials: &UserCredentials) -> Result<Applied> {
        let identity = &credentials.identity;
        let row = UserCredentialsRow {
            uid: identity.uid.clone(),
            code: identity.code.clone(),
            name: identity.name.clone(),
            display_name: identity.display_name.clone(),
            created: identity.created,
            last_updated: identity.last_updated,
            username: credentials.username.clone(),
            user: parent_uid(parent),
        };
        upsert(&self.credentials, &row, credentials.uid())
    }

    fn handle_children(
        &self,
        credentials: &UserCredentials,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        self.roles
            .handle(Some(credentials.uid()), &credentials.user_roles, report)
    }
}

/// Roles are stored once and shared; deleting a user leaves them in place.
#[derive(Debug, Clone, Copy)]
pub struct UserRoleHandler<'c> {
    roles: RowStore<'c, UserRoleRow>,
}

impl<'c> UserRoleHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            roles: stores.user_roles,
        }
    }
}

impl EntityHandler for UserRoleHandler<'_> {
    type Entity = UserRole;
    const KIND: EntityKind = EntityKind::UserRole;

    fn delete(&self, _parent: Option<&str>, role: &UserRole) -> Result<usize> {
        self.roles.delete(role.uid())
    }

    fn write(&self, _parent: Option<&str>, role: &UserRole) -> Result<Applied> {
        let identity = &role.identity;
        let row = UserRoleRow {
            uid: identity.uid.clone(),
            code: identity.code.clone(),
            name: identity.name.clone(),
            display_name: identity.display_name.clone(),
            created: identity.created,
            last_updated: identity.last_updated,
        };
        upsert(&self.roles, &row, role.uid())
    }
}

/// Assigns a user to the organisation units it may capture data for.
#[derive(Debug, Clone, Copy)]
pub struct UserOrganisationUnitHandler<'c> {
    links: LinkStore<'c, UserOrganisationUnitRow>,
}

impl<'c> UserOrganisationUnitHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            links: stores.user_organisation_units,
        }
    }
}

impl EntityHandler for UserOrganisationUnitHandler<'_> {
    type Entity = ObjectRef;
    const KIND: EntityKind = EntityKind::UserOrganisationUnit;

    fn delete(&self, parent: Option<&str>, unit: &ObjectRef) -> Result<usize> {
        self.links
            .delete(LinkKey::new(parent.unwrap_or_default(), &unit.id))
    }

    fn write(&self, parent: Option<&str>, unit: &ObjectRef) -> Result<Applied> {
        let row = UserOrganisationUnitRow {
            user: parent_uid(parent),
            organisation_unit: unit.id.clone(),
        };
        upsert(&self.links, &row, row.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, Insertable};
    use crate::handler::Counts;
    use crate::models::OrganisationUnitRow;
    use crate::payload::Identity;
    use pretty_assertions::assert_eq;

    fn role(uid: &str, name: &str) -> UserRole {
        UserRole {
            identity: Identity {
                name: Some(name.to_string()),
                ..Identity::new(uid)
            },
        }
    }

    fn user() -> User {
        User {
            identity: Identity {
                name: Some("John Traore".to_string()),
                ..Identity::new("DXyJmlo9rge")
            },
            first_name: Some("John".to_string()),
            user_credentials: Some(UserCredentials {
                identity: Identity::new("ZyjSDLHGPv4"),
                username: Some("admin".to_string()),
                user_roles: vec![role("Ufph3mGRmMo", "Superuser")],
            }),
            organisation_units: vec![ObjectRef::new("ImspTQPwCqd")],
            ..Default::default()
        }
    }

    #[test]
    fn user_with_credentials_and_units() {
        let db = Database::open_in_memory().unwrap();
        let stores = Stores::new(db.connection());
        stores
            .organisation_units
            .insert(&OrganisationUnitRow {
                uid: "ImspTQPwCqd".to_string(),
                ..Default::default()
            })
            .unwrap();

        let mut report = ReconcileReport::new();
        UserHandler::new(&stores)
            .handle(None, &[user()], &mut report)
            .unwrap();

        assert!(!report.has_failures());
        let credentials = stores.user_credentials.get("ZyjSDLHGPv4").unwrap().unwrap();
        assert_eq!(credentials.user, "DXyJmlo9rge");
        assert_eq!(credentials.username.as_deref(), Some("admin"));
        assert_eq!(
            stores.user_organisation_units.query_for("DXyJmlo9rge").unwrap(),
            vec![UserOrganisationUnitRow {
                user: "DXyJmlo9rge".to_string(),
                organisation_unit: "ImspTQPwCqd".to_string(),
            }]
        );
    }

    #[test]
    fn deleted_user_takes_credentials_along() {
        let db = Database::open_in_memory().unwrap();
        let stores = Stores::new(db.connection());
        let handler = UserHandler::new(&stores);

        let mut report = ReconcileReport::new();
        handler.handle(None, &[user()], &mut report).unwrap();
        // Unit is unknown locally, only the link fails
        assert_eq!(report.failures().len(), 1);
        assert_eq!(stores.user_credentials.count().unwrap(), 1);

        let mut deleted = user();
        deleted.identity.deleted = true;
        let mut report = ReconcileReport::new();
        handler.handle(None, &[deleted], &mut report).unwrap();

        assert_eq!(report.counts(EntityKind::User).deleted, 1);
        assert_eq!(stores.users.count().unwrap(), 0);
        assert_eq!(stores.user_credentials.count().unwrap(), 0);
    }

    #[test]
    fn roles_are_replayed_in_place_and_deleted_by_marker() {
        let db = Database::open_in_memory().unwrap();
        let stores = Stores::new(db.connection());
        let handler = UserHandler::new(&stores);

        handler
            .handle(None, &[user()], &mut ReconcileReport::new())
            .unwrap();
        assert_eq!(
            stores.user_roles.require("Ufph3mGRmMo").unwrap().name.as_deref(),
            Some("Superuser")
        );

        let mut renamed = user();
        if let Some(credentials) = renamed.user_credentials.as_mut() {
            credentials.user_roles = vec![role("Ufph3mGRmMo", "Administrator")];
        }
        let mut report = ReconcileReport::new();
        handler.handle(None, &[renamed.clone()], &mut report).unwrap();
        assert_eq!(
            report.counts(EntityKind::UserRole),
            Counts {
                updated: 1,
                ..Default::default()
            }
        );
        assert_eq!(stores.user_roles.count().unwrap(), 1);
        assert_eq!(
            stores.user_roles.require("Ufph3mGRmMo").unwrap().name.as_deref(),
            Some("Administrator")
        );

        if let Some(credentials) = renamed.user_credentials.as_mut() {
            credentials.user_roles[0].identity.deleted = true;
        }
        let mut report = ReconcileReport::new();
        handler.handle(None, &[renamed], &mut report).unwrap();
        assert_eq!(report.counts(EntityKind::UserRole).deleted, 1);
        assert_eq!(stores.user_roles.count().unwrap(), 0);
        assert_eq!(stores.user_credentials.count().unwrap(), 1);
    }

    #[test]
    fn deleting_a_user_keeps_shared_roles() {
        let db = Database::open_in_memory().unwrap();
        let stores = Stores::new(db.connection());
        let handler = UserHandler::new(&stores);
        handler
            .handle(None, &[user()], &mut ReconcileReport::new())
            .unwrap();

        let mut deleted = user();
        deleted.identity.deleted = true;
        handler
            .handle(None, &[deleted], &mut ReconcileReport::new())
            .unwrap();

        assert_eq!(stores.users.count().unwrap(), 0);
        assert_eq!(stores.user_roles.count().unwrap(), 1);
    }
}
