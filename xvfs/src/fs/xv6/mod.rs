// SPDX-License-Identifier: MIT
pub mod checker;
pub mod constant;
pub mod device;
pub mod formatter;
pub mod injector;
pub mod layout;
pub mod meta;
pub mod types;

// Public Interface
pub mod traits {
    pub use super::checker::{Xv6CheckOptions, Xv6Checker};
    pub use super::device::Xv6BlockDevice;
    pub use super::formatter::Xv6Formatter;
    pub use super::injector::Xv6Injector;
    pub use super::layout::Xv6Layout;
    pub use super::meta::Xv6Meta;
}

pub mod prelude {
    pub use super::constant::*;
    pub use super::traits::*;
    pub use super::types::*;
    pub use crate::core::checker::{CheckPhase, CheckReport, Finding, Severity, WalkerStats};
    pub use crate::core::errors::*;
    pub use crate::core::traits::*;
    pub use xvio::prelude::*;
}
