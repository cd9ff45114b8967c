// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod test_document;
mod test_wrap;
pub(crate) mod utils;
