// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod env;
mod objects;
mod surface;

pub(crate) use env::{ADVANCE, TestEnv};
pub(crate) use objects::{Behavior, ObjectLog, TestObject};
pub(crate) use surface::{Event, RecordingSurface};
