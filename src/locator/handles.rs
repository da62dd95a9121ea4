// Native handle set and the adapter interface used to obtain it

use ash::vk::{self, Handle};

use super::roles::Role;
use crate::error::BridgeError;

/// Typed access to the native handles a host can provide.
///
/// Hosts with a documented accessor API implement this directly; everyone
/// else goes through the graph locator, whose result implements it too.
pub trait HandleSource {
    fn try_instance_handle(&self) -> Option<vk::Instance>;
    fn try_physical_device_handle(&self) -> Option<vk::PhysicalDevice>;
    fn try_device_handle(&self) -> Option<vk::Device>;
    fn try_queue_handle(&self) -> Option<vk::Queue>;
    fn try_queue_family_index(&self) -> Option<u32>;
}

/// Raw values found by a locator run.
#[derive(Debug, Clone, Default)]
pub struct LocatedHandles {
    values: [Option<u64>; 5],
    /// Number of objects expanded.
    pub visited: usize,
    /// The search stopped because the step budget ran out.
    pub budget_exhausted: bool,
}

impl LocatedHandles {
    pub fn get(&self, role: Role) -> Option<u64> {
        self.values[role as usize]
    }

    /// Records a value unless the role is already filled. Returns true if recorded.
    pub fn record(&mut self, role: Role, raw: u64) -> bool {
        let slot = &mut self.values[role as usize];
        if slot.is_some() {
            return false;
        }
        *slot = Some(raw);
        true
    }

    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }
}

impl HandleSource for LocatedHandles {
    fn try_instance_handle(&self) -> Option<vk::Instance> {
        self.get(Role::Instance).map(vk::Instance::from_raw)
    }

    fn try_physical_device_handle(&self) -> Option<vk::PhysicalDevice> {
        self.get(Role::PhysicalDevice).map(vk::PhysicalDevice::from_raw)
    }

    fn try_device_handle(&self) -> Option<vk::Device> {
        self.get(Role::Device).map(vk::Device::from_raw)
    }

    fn try_queue_handle(&self) -> Option<vk::Queue> {
        self.get(Role::Queue).map(vk::Queue::from_raw)
    }

    fn try_queue_family_index(&self) -> Option<u32> {
        self.get(Role::QueueFamilyIndex).and_then(|v| u32::try_from(v).ok())
    }
}

/// Handles borrowed from the host engine. Never destroyed by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeHandleSet {
    pub instance: vk::Instance,
    pub physical_device: vk::PhysicalDevice,
    pub device: vk::Device,
    pub queue: vk::Queue,
    pub queue_family_index: u32,
}

impl NativeHandleSet {
    /// Collects all four pointer handles or reports every missing one.
    ///
    /// The queue family index is the only optional role: it defaults to 0.
    pub fn collect(source: &dyn HandleSource) -> Result<Self, BridgeError> {
        let instance = source.try_instance_handle().filter(|h| h.as_raw() != 0);
        let physical_device = source.try_physical_device_handle().filter(|h| h.as_raw() != 0);
        let device = source.try_device_handle().filter(|h| h.as_raw() != 0);
        let queue = source.try_queue_handle().filter(|h| h.as_raw() != 0);

        let (Some(instance), Some(physical_device), Some(device), Some(queue)) =
            (instance, physical_device, device, queue)
        else {
            let present = [
                instance.is_some(),
                physical_device.is_some(),
                device.is_some(),
                queue.is_some(),
            ];
            let roles = Role::REQUIRED
                .iter()
                .zip(present)
                .filter(|(_, ok)| !ok)
                .map(|(role, _)| *role)
                .collect();
            return Err(BridgeError::MissingMember { roles });
        };

        let queue_family_index = source.try_queue_family_index().unwrap_or_else(|| {
            log::warn!("Queue family index not found on host device; assuming 0");
            0
        });

        Ok(Self {
            instance,
            physical_device,
            device,
            queue,
            queue_family_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> LocatedHandles {
        let mut found = LocatedHandles::default();
        found.record(Role::Instance, 0x10);
        found.record(Role::PhysicalDevice, 0x20);
        found.record(Role::Device, 0x30);
        found.record(Role::Queue, 0x40);
        found.record(Role::QueueFamilyIndex, 3);
        found
    }

    #[test]
    fn record_keeps_first_value() {
        let mut found = LocatedHandles::default();
        assert!(found.record(Role::Queue, 1));
        assert!(!found.record(Role::Queue, 2));
        assert_eq!(found.get(Role::Queue), Some(1));
    }

    #[test]
    fn collect_full_set() {
        let set = NativeHandleSet::collect(&full()).unwrap();
        assert_eq!(set.instance.as_raw(), 0x10);
        assert_eq!(set.queue.as_raw(), 0x40);
        assert_eq!(set.queue_family_index, 3);
    }

    #[test]
    fn missing_index_defaults_to_zero() {
        let mut found = LocatedHandles::default();
        for (role, raw) in [
            (Role::Instance, 1),
            (Role::PhysicalDevice, 2),
            (Role::Device, 3),
            (Role::Queue, 4),
        ] {
            found.record(role, raw);
        }
        let set = NativeHandleSet::collect(&found).unwrap();
        assert_eq!(set.queue_family_index, 0);
    }

    #[test]
    fn partial_set_reports_missing_roles() {
        let mut found = LocatedHandles::default();
        found.record(Role::Instance, 1);
        found.record(Role::Queue, 4);
        match NativeHandleSet::collect(&found) {
            Err(BridgeError::MissingMember { roles }) => {
                assert_eq!(roles, vec![Role::PhysicalDevice, Role::Device]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
