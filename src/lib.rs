// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod config;
pub mod constants;
pub mod error;
pub mod kit;
pub mod opmask;

pub use error::{KitError, Result};
pub use opmask::OpMask;

#[cfg(test)]
pub mod test_utils;
