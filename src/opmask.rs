// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Object-store user operation masks.
//!
//! An op mask is written as a comma separated list of `read`, `write` and
//! `delete`, or the glob `*` for all three. It always renders in the order
//! `read, write, delete`, which is the form the RGW admin API reports back.

use crate::error::{KitError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const READ: &str = "read";
const WRITE: &str = "write";
const DELETE: &str = "delete";
const GLOB: &str = "*";
const SEPARATOR: &str = ", ";

const GLOB_COMBINED: &str = "glob \"*\" cannot be combined with other operations";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OpMask {
    read: bool,
    write: bool,
    delete: bool,
}

impl OpMask {
    pub const NONE: OpMask = OpMask {
        read: false,
        write: false,
        delete: false,
    };

    pub const ALL: OpMask = OpMask {
        read: true,
        write: true,
        delete: true,
    };

    pub const fn new(read: bool, write: bool, delete: bool) -> Self {
        Self {
            read,
            write,
            delete,
        }
    }

    /// Parse an op mask descriptor such as `"read, delete"` or `"*"`.
    ///
    /// Tokens are case sensitive, surrounding whitespace is ignored and
    /// duplicates are accepted. Empty elements are skipped, so an empty
    /// string parses to [`OpMask::NONE`].
    pub fn parse(input: &str) -> Result<Self> {
        let elements: Vec<&str> = input
            .split(',')
            .map(|e| e.trim_matches(|c: char| c.is_ascii_whitespace()))
            .collect();

        if elements.len() == 1 && elements[0] == GLOB {
            return Ok(Self::ALL);
        }

        let mut mask = Self::NONE;
        for element in elements {
            match element {
                "" => {}
                READ => mask.read = true,
                WRITE => mask.write = true,
                DELETE => mask.delete = true,
                GLOB => return Err(KitError::InvalidOpMask(GLOB_COMBINED.to_string())),
                other => {
                    return Err(KitError::InvalidOpMask(format!(
                        "unknown operation {:?} in op mask {:?}",
                        other, input
                    )))
                }
            }
        }

        Ok(mask)
    }

    pub fn read(&self) -> bool {
        self.read
    }

    pub fn write(&self) -> bool {
        self.write
    }

    pub fn delete(&self) -> bool {
        self.delete
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    /// Set operations in canonical order
    pub fn operations(&self) -> Vec<&'static str> {
        [(self.read, READ), (self.write, WRITE), (self.delete, DELETE)]
            .into_iter()
            .filter_map(|(set, op)| set.then_some(op))
            .collect()
    }
}

impl fmt::Display for OpMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.operations().join(SEPARATOR))
    }
}

impl FromStr for OpMask {
    type Err = KitError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for OpMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for OpMask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
