// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Register protocol shared between the robot and its I2C bus master.

pub mod notes;
pub mod record;
pub mod registers;

pub use notes::{NoteScript, NoteScriptError};
pub use record::{RecordBytes, SharedRecord};
pub use registers::{is_master_writable, reg, MASTER_WRITABLE, RECORD_LEN};
