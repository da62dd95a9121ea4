// Role matching table
//
// Maps member names and declared types to the native handle they probably
// hold. Heuristic, not a schema. A declared native type decides the role on
// its own; otherwise the first rule whose keywords match wins. A member fills
// at most one role.

use super::graph::{Member, MemberValue};

/// A native handle (or index) the bridge needs from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Instance,
    PhysicalDevice,
    Device,
    Queue,
    QueueFamilyIndex,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Instance,
        Role::PhysicalDevice,
        Role::Device,
        Role::Queue,
        Role::QueueFamilyIndex,
    ];

    /// Roles that must all be present before a GPU context may be built.
    pub const REQUIRED: [Role; 4] = [Role::Instance, Role::PhysicalDevice, Role::Device, Role::Queue];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Instance => "instance",
            Role::PhysicalDevice => "physical device",
            Role::Device => "device",
            Role::Queue => "queue",
            Role::QueueFamilyIndex => "queue family index",
        }
    }

    pub fn rule(self) -> &'static RoleRule {
        // ROLE_RULES is indexed in declaration order
        &ROLE_RULES[self as usize]
    }

    fn is_pointer(self) -> bool {
        !matches!(self, Role::QueueFamilyIndex)
    }
}

/// Name and type heuristics for one role.
#[derive(Debug)]
pub struct RoleRule {
    pub role: Role,
    /// A name matches if it contains every keyword of at least one group.
    pub keyword_groups: &'static [&'static [&'static str]],
    /// A name containing any of these never matches.
    pub exclude: &'static [&'static str],
    /// Native type names matched against the last segment of the declared type.
    pub native_types: &'static [&'static str],
}

pub static ROLE_RULES: [RoleRule; 5] = [
    RoleRule {
        role: Role::Instance,
        keyword_groups: &[&["instance"]],
        exclude: &["count", "extension", "layer", "version"],
        native_types: &["VkInstance"],
    },
    RoleRule {
        role: Role::PhysicalDevice,
        keyword_groups: &[&["physical", "device"]],
        exclude: &["count", "properties", "features", "type"],
        native_types: &["VkPhysicalDevice"],
    },
    RoleRule {
        role: Role::Device,
        keyword_groups: &[&["device"]],
        exclude: &["physical", "memory", "count", "type", "name", "index", "lost", "queue"],
        native_types: &["VkDevice"],
    },
    RoleRule {
        role: Role::Queue,
        keyword_groups: &[&["queue"]],
        exclude: &["family", "index", "count", "priority", "flags"],
        native_types: &["VkQueue"],
    },
    RoleRule {
        role: Role::QueueFamilyIndex,
        keyword_groups: &[&["queue", "family", "index"], &["graphics", "queue", "index"]],
        exclude: &[],
        native_types: &[],
    },
];

impl RoleRule {
    /// Does the member name or declared type suggest this role?
    ///
    /// A declared type that names a native handle overrides the name.
    pub fn matches_name(&self, name: &str, declared_type: &str) -> bool {
        if let Some(owner) = native_type_role(declared_type) {
            return owner == self.role;
        }

        let name = name.to_ascii_lowercase();
        if self.exclude.iter().any(|kw| name.contains(kw)) {
            return false;
        }
        self.keyword_groups
            .iter()
            .any(|group| group.iter().all(|kw| name.contains(kw)))
    }

    fn owns_type(&self, leaf: &str) -> bool {
        self.native_types.iter().any(|t| *t == leaf)
    }

    /// Extract this role's value from a member, if name and value both fit.
    pub fn extract(&self, member: &Member) -> Option<u64> {
        if !self.matches_name(&member.name, &member.declared_type) {
            return None;
        }

        match (&member.value, self.role.is_pointer()) {
            (MemberValue::Pointer(raw), true) if *raw != 0 => Some(*raw),
            (MemberValue::Integer(v), false) if *v <= u64::from(u32::MAX) => Some(*v),
            _ => None,
        }
    }
}

/// `Vortice.Vulkan.VkInstance` -> `VkInstance`; also strips generic/nullable noise.
fn type_leaf(declared_type: &str) -> &str {
    let trimmed = declared_type.trim_end_matches(['?', '*', '&']);
    trimmed.rsplit(['.', ':', '+']).next().unwrap_or(trimmed)
}

/// The role whose native type list contains the declared type, if any.
fn native_type_role(declared_type: &str) -> Option<Role> {
    let leaf = type_leaf(declared_type);
    ROLE_RULES.iter().find(|rule| rule.owns_type(leaf)).map(|rule| rule.role)
}

/// The single role a member fills, with its value.
pub fn role_for(member: &Member) -> Option<(Role, u64)> {
    ROLE_RULES
        .iter()
        .find_map(|rule| rule.extract(member).map(|v| (rule.role, v)))
}
