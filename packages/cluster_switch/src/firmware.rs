//! Request/response bridge to the power management firmware coprocessor.

use tracing::error;

use crate::error::Result;
use crate::pal::{MessageKind, Platform, PlatformFacade};
use crate::{CpuId, CpuMask, SwitchError};

/// The firmware's answer to a cluster switch request: which logical CPU slots are resident in
/// the destination cluster. Produced once per switch and consumed immediately by the quiesce
/// dispatcher.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FirmwareResponse {
    resident: CpuMask,
}

impl FirmwareResponse {
    #[must_use]
    #[inline]
    pub(crate) fn resident(&self) -> CpuMask {
        self.resident
    }
}

/// Sends cluster switch requests to the firmware coprocessor.
///
/// The exchange is synchronous and atomic: it runs with interrupts disabled inside the
/// platform's mailbox primitive and either completes with a full response or fails as a unit.
/// A failed exchange aborts the switch before any state change.
#[derive(Debug)]
pub(crate) struct FirmwareBridge {
    pal: PlatformFacade,
}

impl FirmwareBridge {
    #[must_use]
    pub(crate) fn new(pal: PlatformFacade) -> Self {
        Self { pal }
    }

    /// Asks the firmware to migrate all logical CPUs to the other cluster.
    ///
    /// The initiating CPU is identified by its physical identifier so the firmware knows which
    /// core triggers the handoff by suspending last.
    pub(crate) fn request_switch(&self, initiating_physical_cpu: CpuId) -> Result<FirmwareResponse> {
        let request = initiating_physical_cpu.to_le_bytes();

        match self
            .pal
            .mailbox_exchange_atomic(MessageKind::SWITCH_CLUSTER, request)
        {
            Ok(reply) => {
                let resident = CpuMask::from_resident_word(u32::from_le_bytes(reply));

                Ok(FirmwareResponse { resident })
            }
            Err(fault) => {
                error!(
                    initiating_physical_cpu,
                    %fault,
                    "cluster switch request to the power management firmware failed; aborting the switch"
                );

                Err(SwitchError::FirmwareFault)
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::pal::{ExchangeError, MockPlatform};

    #[test]
    fn encodes_the_initiator_as_little_endian() {
        let mut platform = MockPlatform::new();

        platform
            .expect_mailbox_exchange_atomic()
            .with(eq(MessageKind::SWITCH_CLUSTER), eq(0x0102_0304_u32.to_le_bytes()))
            .times(1)
            .returning(|_, _| Ok(0b1111_u32.to_le_bytes()));

        let bridge = FirmwareBridge::new(PlatformFacade::from_mock(platform));

        let response = bridge.request_switch(0x0102_0304).unwrap();

        assert_eq!(response.resident().bits(), 0b1111);
    }

    #[test]
    fn decodes_the_resident_mask() {
        let mut platform = MockPlatform::new();

        platform
            .expect_mailbox_exchange_atomic()
            .returning(|_, _| Ok(0b0110_u32.to_le_bytes()));

        let bridge = FirmwareBridge::new(PlatformFacade::from_mock(platform));

        let response = bridge.request_switch(0).unwrap();

        assert_eq!(response.resident().iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn reserved_response_bits_are_discarded() {
        let mut platform = MockPlatform::new();

        platform
            .expect_mailbox_exchange_atomic()
            .returning(|_, _| Ok(0xdead_0003_u32.to_le_bytes()));

        let bridge = FirmwareBridge::new(PlatformFacade::from_mock(platform));

        let response = bridge.request_switch(0).unwrap();

        assert_eq!(response.resident().bits(), 0b0011);
    }

    #[test]
    fn incomplete_exchange_surfaces_as_firmware_fault() {
        let mut platform = MockPlatform::new();

        platform
            .expect_mailbox_exchange_atomic()
            .times(1)
            .returning(|_, _| Err(ExchangeError));

        let bridge = FirmwareBridge::new(PlatformFacade::from_mock(platform));

        let result = bridge.request_switch(2);

        assert!(matches!(result, Err(SwitchError::FirmwareFault)));
    }
}
