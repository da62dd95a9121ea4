// Host object graph
//
// The host engine's device object is seen through this narrow interface:
// a type name plus a flat list of named members. Reads that fail on the host
// side surface as `MemberValue::Unreadable` instead of an error.

use std::cell::RefCell;
use std::rc::Rc;

/// Shared reference to a node in the host object graph.
pub type ObjectRef = Rc<dyn HostObject>;

/// An object exposed by the host engine.
pub trait HostObject {
    /// Fully qualified type name, e.g. `Engine.Graphics.GraphicsDevice`.
    fn type_name(&self) -> &str;

    /// Snapshot of the object's instance members.
    fn members(&self) -> Vec<Member>;
}

/// A named member (field or property) of a host object.
#[derive(Clone)]
pub struct Member {
    pub name: String,
    pub declared_type: String,
    pub value: MemberValue,
}

impl Member {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, value: MemberValue) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            value,
        }
    }
}

/// Value read from a member.
#[derive(Clone)]
pub enum MemberValue {
    Object(ObjectRef),
    /// Machine-word sized native handle.
    Pointer(u64),
    Integer(u64),
    Null,
    /// The host refused or failed the read.
    Unreadable(String),
}

impl std::fmt::Debug for MemberValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberValue::Object(obj) => write!(f, "Object({})", obj.type_name()),
            MemberValue::Pointer(raw) => write!(f, "Pointer({raw:#x})"),
            MemberValue::Integer(v) => write!(f, "Integer({v})"),
            MemberValue::Null => f.write_str("Null"),
            MemberValue::Unreadable(reason) => write!(f, "Unreadable({reason})"),
        }
    }
}

/// Identity of an object: its allocation address, not its value.
pub fn object_identity(obj: &ObjectRef) -> usize {
    Rc::as_ptr(obj) as *const () as usize
}

/// Mutable host object with a dynamic member list.
///
/// Members can be added after construction, which is how cyclic graphs
/// (child → parent back references) are built.
pub struct DynamicObject {
    type_name: String,
    members: RefCell<Vec<Member>>,
}

impl DynamicObject {
    pub fn new(type_name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            type_name: type_name.into(),
            members: RefCell::new(Vec::new()),
        })
    }

    pub fn push(&self, member: Member) {
        self.members.borrow_mut().push(member);
    }

    pub fn set_object(&self, name: &str, declared_type: &str, obj: ObjectRef) {
        self.push(Member::new(name, declared_type, MemberValue::Object(obj)));
    }

    pub fn set_pointer(&self, name: &str, declared_type: &str, raw: u64) {
        self.push(Member::new(name, declared_type, MemberValue::Pointer(raw)));
    }

    pub fn set_integer(&self, name: &str, declared_type: &str, value: u64) {
        self.push(Member::new(name, declared_type, MemberValue::Integer(value)));
    }

    /// Removes every member with the given name; returns how many were removed.
    pub fn remove(&self, name: &str) -> usize {
        let mut members = self.members.borrow_mut();
        let before = members.len();
        members.retain(|m| m.name != name);
        before - members.len()
    }

    /// Drops all members, breaking any cycles this object participates in.
    pub fn clear(&self) {
        self.members.borrow_mut().clear();
    }
}

impl HostObject for DynamicObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn members(&self) -> Vec<Member> {
        self.members.borrow().clone()
    }
}
