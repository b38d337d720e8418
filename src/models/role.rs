//! Roles del sistema
//!
//! Cada rol se resuelve una sola vez al abrir la sesión y expone
//! directamente las capacidades y la navegación que concede.

use serde::{Deserialize, Serialize};
use sqlx::Type;

/// Rol de usuario - mapea al ENUM user_role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Customer,
    Owner,
    Admin,
}

/// Entrada de navegación que el cliente muestra para un rol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
}

const fn nav(label: &'static str, path: &'static str) -> NavItem {
    NavItem { label, path }
}

const CUSTOMER_NAV: &[NavItem] = &[
    nav("Explorar autos", "/cars"),
    nav("Mis reservas", "/bookings"),
    nav("Ser propietario", "/apply"),
    nav("Perfil", "/profile"),
];

const OWNER_NAV: &[NavItem] = &[
    nav("Explorar autos", "/cars"),
    nav("Mi flota", "/owner/cars"),
    nav("Reservas de mi flota", "/owner/bookings"),
    nav("Mis reservas", "/bookings"),
    nav("Perfil", "/profile"),
];

const ADMIN_NAV: &[NavItem] = &[
    nav("Panel", "/admin"),
    nav("Usuarios", "/admin/users"),
    nav("Autos", "/admin/cars"),
    nav("Reservas", "/admin/bookings"),
    nav("Solicitudes", "/admin/applications"),
];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Owner => "owner",
            Role::Admin => "admin",
        }
    }

    /// Navegación concedida por el rol
    pub fn navigation(&self) -> &'static [NavItem] {
        match self {
            Role::Customer => CUSTOMER_NAV,
            Role::Owner => OWNER_NAV,
            Role::Admin => ADMIN_NAV,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Propietarios y administradores gestionan autos
    pub fn can_manage_fleet(&self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }

    /// Solo los clientes pueden solicitar ser propietarios
    pub fn can_apply_for_ownership(&self) -> bool {
        matches!(self, Role::Customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_per_role() {
        let customer: Vec<_> = Role::Customer.navigation().iter().map(|n| n.path).collect();
        assert!(customer.contains(&"/apply"));
        assert!(!customer.iter().any(|p| p.starts_with("/admin")));

        let owner: Vec<_> = Role::Owner.navigation().iter().map(|n| n.path).collect();
        assert!(owner.contains(&"/owner/cars"));
        assert!(!owner.contains(&"/apply"));

        assert!(Role::Admin
            .navigation()
            .iter()
            .all(|n| n.path.starts_with("/admin")));
    }

    #[test]
    fn test_capabilities() {
        assert!(!Role::Customer.can_manage_fleet());
        assert!(Role::Owner.can_manage_fleet());
        assert!(Role::Admin.can_manage_fleet());
        assert!(Role::Admin.is_admin());
        assert!(Role::Customer.can_apply_for_ownership());
        assert!(!Role::Owner.can_apply_for_ownership());
    }

    #[test]
    fn test_serde_uses_variant_names() {
        assert_eq!(serde_json::to_string(&Role::Owner).unwrap(), "\"Owner\"");
        assert_eq!(serde_json::from_str::<Role>("\"Admin\"").unwrap(), Role::Admin);
        assert_eq!(Role::Customer.as_str(), "customer");
    }
}
