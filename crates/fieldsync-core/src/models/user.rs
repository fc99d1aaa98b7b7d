//! User rows: profile, credentials and roles, organisation-unit scope, authenticated session

use chrono::{DateTime, Utc};
use rusqlite::{params, ToSql};

use super::{require, Identifiable, LinkKey, LinkRow, Table};
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserRow {
    pub uid: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub birthday: Option<String>,
    pub education: Option<String>,
    pub gender: Option<String>,
    pub job_title: Option<String>,
    pub surname: Option<String>,
    pub first_name: Option<String>,
    pub introduction: Option<String>,
    pub employer: Option<String>,
    pub interests: Option<String>,
    pub languages: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub nationality: Option<String>,
}

impl Table for UserRow {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "code",
        "name",
        "display_name",
        "created",
        "last_updated",
        "birthday",
        "education",
        "gender",
        "job_title",
        "surname",
        "first_name",
        "introduction",
        "employer",
        "interests",
        "languages",
        "email",
        "phone_number",
        "nationality",
    ];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "uid", &self.uid)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.uid,
            self.code,
            self.name,
            self.display_name,
            self.created,
            self.last_updated,
            self.birthday,
            self.education,
            self.gender,
            self.job_title,
            self.surname,
            self.first_name,
            self.introduction,
            self.employer,
            self.interests,
            self.languages,
            self.email,
            self.phone_number,
            self.nationality,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            created: row.get(4)?,
            last_updated: row.get(5)?,
            birthday: row.get(6)?,
            education: row.get(7)?,
            gender: row.get(8)?,
            job_title: row.get(9)?,
            surname: row.get(10)?,
            first_name: row.get(11)?,
            introduction: row.get(12)?,
            employer: row.get(13)?,
            interests: row.get(14)?,
            languages: row.get(15)?,
            email: row.get(16)?,
            phone_number: row.get(17)?,
            nationality: row.get(18)?,
        })
    }
}

impl Identifiable for UserRow {
    fn uid(&self) -> &str {
        &self.uid
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserCredentialsRow {
    pub uid: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub username: Option<String>,
    pub user: String,
}

impl Table for UserCredentialsRow {
    const TABLE: &'static str = "user_credentials";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "code",
        "name",
        "display_name",
        "created",
        "last_updated",
        "username",
        "user",
    ];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "uid", &self.uid)?;
        require(Self::TABLE, "user", &self.user)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.uid,
            self.code,
            self.name,
            self.display_name,
            self.created,
            self.last_updated,
            self.username,
            self.user,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            created: row.get(4)?,
            last_updated: row.get(5)?,
            username: row.get(6)?,
            user: row.get(7)?,
        })
    }
}

impl Identifiable for UserCredentialsRow {
    fn uid(&self) -> &str {
        &self.uid
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserRoleRow {
    pub uid: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Table for UserRoleRow {
    const TABLE: &'static str = "user_roles";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "code",
        "name",
        "display_name",
        "created",
        "last_updated",
    ];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "uid", &self.uid)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.uid,
            self.code,
            self.name,
            self.display_name,
            self.created,
            self.last_updated,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            created: row.get(4)?,
            last_updated: row.get(5)?,
        })
    }
}

impl Identifiable for UserRoleRow {
    fn uid(&self) -> &str {
        &self.uid
    }
}

/// User ↔ organisation unit assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserOrganisationUnitRow {
    pub user: String,
    pub organisation_unit: String,
}

impl Table for UserOrganisationUnitRow {
    const TABLE: &'static str = "user_organisation_units";
    const COLUMNS: &'static [&'static str] = &["user", "organisation_unit"];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "user", &self.user)?;
        require(Self::TABLE, "organisation_unit", &self.organisation_unit)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![self.user, self.organisation_unit].to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            user: row.get(0)?,
            organisation_unit: row.get(1)?,
        })
    }
}

impl LinkRow for UserOrganisationUnitRow {
    const KEY: [&'static str; 2] = ["user", "organisation_unit"];

    fn key(&self) -> LinkKey<'_> {
        LinkKey::new(&self.user, &self.organisation_unit)
    }
}

/// The user currently signed in on this device.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthenticatedUserRow {
    pub user: String,
    /// Base64 `username:password`
    pub credentials: String,
}

impl std::fmt::Debug for AuthenticatedUserRow {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AuthenticatedUserRow")
            .field("user", &self.user)
            .field("credentials", &"[REDACTED]")
            .finish()
    }
}

impl Table for AuthenticatedUserRow {
    const TABLE: &'static str = "authenticated_users";
    const COLUMNS: &'static [&'static str] = &["user", "credentials"];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "user", &self.user)?;
        require(Self::TABLE, "credentials", &self.credentials)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![self.user, self.credentials].to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            user: row.get(0)?,
            credentials: row.get(1)?,
        })
    }
}

impl Identifiable for AuthenticatedUserRow {
    const UID_COLUMN: &'static str = "user";

    fn uid(&self) -> &str {
        &self.user
    }
}
