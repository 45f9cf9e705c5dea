//! Role types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique role identifier
pub type RoleId = u64;

/// Kind of role
///
/// Every type except `Staff` is a manager role that may hold a grantable
/// authorization scope and a subject scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    /// Platform-wide administrator
    SuperManager,
    /// Administrator of one or more integrated systems
    SystemManager,
    /// Grade manager holding a delegated slice of authority
    RatingManager,
    /// Ordinary user, never holds a scope
    Staff,
}

impl RoleType {
    /// Whether roles of this type may hold an authorization or subject scope
    pub fn can_hold_scope(&self) -> bool {
        !matches!(self, RoleType::Staff)
    }

    /// Management permissions granted to every role of this type
    pub fn default_permissions(&self) -> &'static [PermissionCode] {
        match self {
            RoleType::SuperManager => PermissionCode::ALL_CODES,
            RoleType::SystemManager => &[
                PermissionCode::ManageGroup,
                PermissionCode::ManageTemplate,
                PermissionCode::CreateRatingManager,
                PermissionCode::ManageRatingManagerMember,
                PermissionCode::Audit,
                PermissionCode::ConfigureApprovalProcess,
                PermissionCode::ManageSystemSetting,
                PermissionCode::ManageCommonAction,
                PermissionCode::ManageSystemManagerMember,
            ],
            RoleType::RatingManager => &[
                PermissionCode::ManageGroup,
                PermissionCode::ManageTemplate,
                PermissionCode::ManageRatingManagerMember,
                PermissionCode::ConfigureApprovalProcess,
                PermissionCode::ManageCommonAction,
            ],
            RoleType::Staff => &[],
        }
    }
}

impl fmt::Display for RoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoleType::SuperManager => "super_manager",
            RoleType::SystemManager => "system_manager",
            RoleType::RatingManager => "rating_manager",
            RoleType::Staff => "staff",
        };
        f.write_str(name)
    }
}

/// Management permission codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCode {
    ManageGroup,
    ManageTemplate,
    CreateRatingManager,
    ManageRatingManagerMember,
    Audit,
    ConfigureApprovalProcess,
    ManageSystemSetting,
    ManageCommonAction,
    ManageSystemManagerMember,
    ManageSuperManagerMember,
}

impl PermissionCode {
    /// Every known permission code, in declaration order
    pub const ALL_CODES: &'static [PermissionCode] = &[
        PermissionCode::ManageGroup,
        PermissionCode::ManageTemplate,
        PermissionCode::CreateRatingManager,
        PermissionCode::ManageRatingManagerMember,
        PermissionCode::Audit,
        PermissionCode::ConfigureApprovalProcess,
        PermissionCode::ManageSystemSetting,
        PermissionCode::ManageCommonAction,
        PermissionCode::ManageSystemManagerMember,
        PermissionCode::ManageSuperManagerMember,
    ];
}

/// A role as seen by the scope checkers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier
    pub id: RoleId,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Role type
    #[serde(rename = "type")]
    pub role_type: RoleType,
}

impl Role {
    /// Create a new role
    pub fn new(id: RoleId, name: impl Into<String>, role_type: RoleType) -> Self {
        Self {
            id,
            name: name.into(),
            role_type,
        }
    }

    /// The role every authenticated user acts under when they hold no manager role
    pub fn anonymous_staff() -> Self {
        Self::new(0, "STAFF", RoleType::Staff)
    }

    /// Whether this role is a plain staff role
    pub fn is_staff(&self) -> bool {
        !self.role_type.can_hold_scope()
    }

    /// Management permissions of this role
    pub fn permissions(&self) -> &'static [PermissionCode] {
        self.role_type.default_permissions()
    }
}
