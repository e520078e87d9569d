use crate::api::{RoleRecord, User};

/// Role names granting admin rights, compared case-insensitively.
///
/// The CMS has no canonical role enum; check this list against the role
/// configuration of the deployment.
const ADMIN_ROLES: &[&str] = &["admin", "administrator", "super admin"];

/// The closed set of roles the client acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Authenticated,
    Public,
    /// Anything else, including a user without a populated role. Never admin.
    Unrecognized,
}

impl Role {
    pub fn from_record(record: Option<&RoleRecord>) -> Self {
        let Some(record) = record else {
            return Role::Unrecognized;
        };
        let kind = normalize(&record.kind);
        let name = normalize(&record.name);

        if [&kind, &name]
            .iter()
            .any(|value| ADMIN_ROLES.contains(&value.as_str()))
        {
            Role::Admin
        } else if kind == "authenticated" {
            Role::Authenticated
        } else if kind == "public" {
            Role::Public
        } else {
            Role::Unrecognized
        }
    }

    pub fn of(user: &User) -> Self {
        Self::from_record(user.role.as_ref())
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(name: &str, kind: &str) -> RoleRecord {
        RoleRecord {
            id: 1,
            name: name.to_string(),
            kind: kind.to_string(),
        }
    }

    #[rstest]
    #[case("Admin", "admin", Role::Admin)]
    #[case("Admin", "custom", Role::Admin)]
    #[case("Editors", "ADMINISTRATOR", Role::Admin)]
    #[case(" Super Admin ", "super-admin", Role::Admin)]
    #[case("Authenticated", "authenticated", Role::Authenticated)]
    #[case("Public", "public", Role::Public)]
    #[case("Moderator", "moderator", Role::Unrecognized)]
    #[case("admins", "superadmin", Role::Unrecognized)]
    fn role_from_record(#[case] name: &str, #[case] kind: &str, #[case] role: Role) {
        assert_eq!(Role::from_record(Some(&record(name, kind))), role);
    }

    #[test]
    fn missing_role_fails_safe() {
        assert_eq!(Role::from_record(None), Role::Unrecognized);
        assert!(!Role::from_record(None).is_admin());
    }

    #[test]
    fn only_admin_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Authenticated.is_admin());
        assert!(!Role::Public.is_admin());
        assert!(!Role::Unrecognized.is_admin());
    }
}
