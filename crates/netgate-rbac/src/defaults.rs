//! The four canonical role templates seeded at startup.
use crate::model::{RsrcPermissionScope, UserRolePermissionTemplate, resource};
use crate::types::{ResourceId, ResourceType};

pub const SUPER_ADMIN_ROLE: &str = "super-admin";
pub const ADMIN_ROLE: &str = "admin";
pub const NETWORK_ADMIN_ROLE: &str = "network-admin";
pub const NETWORK_USER_ROLE: &str = "network-user";

pub fn super_admin_template() -> UserRolePermissionTemplate {
    UserRolePermissionTemplate {
        default: true,
        full_access: true,
        ..UserRolePermissionTemplate::new(SUPER_ADMIN_ROLE)
    }
}

pub fn admin_template() -> UserRolePermissionTemplate {
    UserRolePermissionTemplate {
        default: true,
        full_access: true,
        ..UserRolePermissionTemplate::new(ADMIN_ROLE)
    }
}

pub fn network_admin_template() -> UserRolePermissionTemplate {
    UserRolePermissionTemplate {
        default: true,
        is_network_role: true,
        full_access: true,
        ..UserRolePermissionTemplate::new(NETWORK_ADMIN_ROLE)
    }
}

/// Read access to every remote access gateway, nothing else.
pub fn network_user_template() -> UserRolePermissionTemplate {
    UserRolePermissionTemplate {
        default: true,
        full_access: false,
        deny_dashboard_access: false,
        ..UserRolePermissionTemplate::new(NETWORK_USER_ROLE)
    }
    .grant(
        ResourceType::new(resource::REMOTE_ACCESS_GW),
        ResourceId::all(),
        RsrcPermissionScope::read_only(),
    )
}

pub fn default_templates() -> [UserRolePermissionTemplate; 4] {
    [
        super_admin_template(),
        admin_template(),
        network_admin_template(),
        network_user_template(),
    ]
}
