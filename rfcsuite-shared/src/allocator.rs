//! Test payload id (TPLD) allocation.
//!
//! One allocator is created per test run and handed to whatever creates
//! streams. Allocation takes `&mut self`; callers creating streams from
//! several tasks wrap the allocator in their own lock.

use std::collections::HashMap;
use tracing::trace;

use crate::capabilities::TestPort;
use crate::constants::TidAllocationScope;
use crate::errors::{ConfigError, ConfigResult};
use crate::port::PortIdentity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TpldIdAllocator {
    scope: TidAllocationScope,
    current_id: u32,
    rx_port_ids: HashMap<PortIdentity, u32>,
}

impl TpldIdAllocator {
    pub fn new(scope: TidAllocationScope) -> Self {
        Self {
            scope,
            current_id: 0,
            rx_port_ids: HashMap::new(),
        }
    }

    pub fn scope(&self) -> TidAllocationScope {
        self.scope
    }

    /// Payload id for a new stream from `source` to `destination`.
    ///
    /// Fails with [`ConfigError::TpldIdExceed`] when the id does not fit the
    /// destination's payload-id table; the counter is left untouched then.
    pub fn allocate(&mut self, source: &TestPort, destination: &TestPort) -> ConfigResult<u32> {
        let max = destination.capabilities.max_tpld_stats;
        let id = match self.scope {
            TidAllocationScope::ConfigurationScope => self.current_id,
            TidAllocationScope::RxPortScope => self
                .rx_port_ids
                .get(&destination.identity)
                .copied()
                .unwrap_or(0),
            TidAllocationScope::SourcePortId => u32::from(source.identity.port_index),
        };
        if id > max {
            return Err(ConfigError::TpldIdExceed { current: id, max });
        }

        match self.scope {
            TidAllocationScope::ConfigurationScope => self.current_id += 1,
            TidAllocationScope::RxPortScope => {
                self.rx_port_ids.insert(destination.identity, id + 1);
            }
            TidAllocationScope::SourcePortId => {}
        }
        trace!(
            "Allocated TPLD id {} for {} -> {}",
            id,
            source.identity.name(),
            destination.identity.name()
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::PortCapabilities;

    fn test_port(port_index: u16, max_tpld_stats: u32) -> TestPort {
        TestPort::new(
            PortIdentity::new(0, 1, port_index),
            PortCapabilities {
                max_tpld_stats,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_config_scope_shares_one_counter() {
        let mut allocator = TpldIdAllocator::new(TidAllocationScope::ConfigurationScope);
        let src = test_port(0, 1024);
        let a = test_port(1, 1024);
        let b = test_port(2, 1024);

        assert_eq!(allocator.allocate(&src, &a).unwrap(), 0);
        assert_eq!(allocator.allocate(&src, &b).unwrap(), 1);
        assert_eq!(allocator.allocate(&src, &a).unwrap(), 2);
    }

    #[test]
    fn test_port_scope_counts_per_destination() {
        let mut allocator = TpldIdAllocator::new(TidAllocationScope::RxPortScope);
        let src = test_port(0, 1024);
        let a = test_port(1, 1024);
        let b = test_port(2, 1024);

        assert_eq!(allocator.allocate(&src, &a).unwrap(), 0);
        assert_eq!(allocator.allocate(&src, &a).unwrap(), 1);
        assert_eq!(allocator.allocate(&src, &b).unwrap(), 0);
        assert_eq!(allocator.allocate(&src, &a).unwrap(), 2);
    }

    #[test]
    fn test_source_port_id_scope_is_derived() {
        let mut allocator = TpldIdAllocator::new(TidAllocationScope::SourcePortId);
        let src = test_port(5, 1024);
        let dst = test_port(1, 1024);

        assert_eq!(allocator.allocate(&src, &dst).unwrap(), 5);
        assert_eq!(allocator.allocate(&src, &dst).unwrap(), 5);
    }

    #[test]
    fn test_exceeding_destination_capacity() {
        let mut allocator = TpldIdAllocator::new(TidAllocationScope::ConfigurationScope);
        let src = test_port(0, 1024);
        let dst = test_port(1, 1);

        assert_eq!(allocator.allocate(&src, &dst).unwrap(), 0);
        assert_eq!(allocator.allocate(&src, &dst).unwrap(), 1);
        assert_eq!(
            allocator.allocate(&src, &dst),
            Err(ConfigError::TpldIdExceed { current: 2, max: 1 })
        );
        // failed allocation does not advance
        assert_eq!(
            allocator.allocate(&src, &dst),
            Err(ConfigError::TpldIdExceed { current: 2, max: 1 })
        );

        let roomy = test_port(2, 1024);
        assert_eq!(allocator.allocate(&src, &roomy).unwrap(), 2);
    }
}
