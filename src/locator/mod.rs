// Handle locator - finds borrowed Vulkan handles inside the host's device object
//
// graph   - host object model (trait + dynamic implementation)
// roles   - keyword/type table mapping members to handle roles
// search  - bounded, identity-keyed breadth-first walk
// handles - adapter trait and the resulting NativeHandleSet

pub mod graph;
pub mod handles;
pub mod roles;
pub mod search;

pub use graph::{DynamicObject, HostObject, Member, MemberValue, ObjectRef};
pub use handles::{HandleSource, LocatedHandles, NativeHandleSet};
pub use roles::{Role, RoleRule, ROLE_RULES};
pub use search::{HandleLocator, LocatorConfig, DEFAULT_STEP_BUDGET};
