// Copyright 2024-2026 artifact-io Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI module for `artifact-io-cli` subcommands.
//!
//! ## Usage
//!
//! ```bash
//! artifact-io-cli inspect models/mnist/model.json
//! artifact-io-cli copy https://host/mnist/model.json ./mnist
//! artifact-io-cli config show
//! ```

pub mod config_cmd;
pub mod copy_cmd;
pub mod inspect_cmd;

/// Exit code for success.
pub const EXIT_OK: i32 = 0;
/// Exit code for a failed operation.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for bad arguments.
pub const EXIT_USAGE: i32 = 2;
