// SPDX-License-Identifier: MIT

//! xv6 on-disk format: layout, record decoding, image building and an
//! offline consistency checker.

// Core Modules
pub mod core;
pub mod fs;

// Reusable types and traits
pub use crate::core::traits::*;

// Filesystem APIs
#[cfg(feature = "xv6")]
/// xv6 filesystem implementation.
///
/// See [`xv6::Xv6Checker`], [`xv6::Xv6Formatter`], and [`xv6::Xv6Injector`].
pub mod xv6 {
    pub use super::fs::xv6::prelude::*;
}
