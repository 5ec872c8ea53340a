//! Role keys and the role-aware dashboard mapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical (upper-case) role identifier used as the session map key.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleKey(String);

impl RoleKey {
    /// Upper-cases the input. Pure and total: unknown roles are kept as given.
    #[must_use]
    pub fn normalize(input: &str) -> Self {
        Self(input.to_uppercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The known role this key names, if any.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.as_str() == self.0)
    }

    /// Dashboard rendered for this role by the role-aware layout.
    #[must_use]
    pub fn dashboard(&self) -> Dashboard {
        self.role().map_or(Dashboard::Patient, Role::dashboard)
    }
}

impl fmt::Display for RoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Role> for RoleKey {
    fn from(role: Role) -> Self {
        Self(role.as_str().to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Doctor,
    Laboratory,
    DeliveryBoy,
    Admin,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::User,
        Role::Doctor,
        Role::Laboratory,
        Role::DeliveryBoy,
        Role::Admin,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Doctor => "DOCTOR",
            Role::Laboratory => "LABORATORY",
            Role::DeliveryBoy => "DELIVERY_BOY",
            Role::Admin => "ADMIN",
        }
    }

    #[must_use]
    pub const fn dashboard(self) -> Dashboard {
        match self {
            Role::User => Dashboard::Patient,
            Role::Doctor => Dashboard::Doctor,
            Role::Laboratory => Dashboard::Laboratory,
            Role::DeliveryBoy => Dashboard::Delivery,
            Role::Admin => Dashboard::Admin,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dashboard {
    Patient,
    Doctor,
    Laboratory,
    Delivery,
    Admin,
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dashboard::Patient => "patient",
            Dashboard::Doctor => "doctor",
            Dashboard::Laboratory => "laboratory",
            Dashboard::Delivery => "delivery",
            Dashboard::Admin => "admin",
        };
        f.write_str(name)
    }
}
