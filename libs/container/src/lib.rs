//! Wrapper over the host container engine used to back compute instances and
//! network bridges. The rest of the emulator depends only on [`ContainerDriver`];
//! [`BollardContainerDriver`] is the one production implementation, reached through
//! Docker's own API via `bollard`.

pub mod bollard_driver;
pub mod driver;
pub mod error;
pub mod types;

pub use bollard_driver::BollardContainerDriver;
pub use driver::ContainerDriver;
#[cfg(feature = "testing")]
pub use driver::MockContainerDriver;
pub use error::{ContainerError, ContainerResult};
pub use types::{ContainerSpec, ContainerState, ContainerStatus};
