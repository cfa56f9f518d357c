// SPDX-License-Identifier: MIT

//! Collaborator kit: the model, embedding and tool seams the advisor
//! workflow talks to, plus the shared error types.

pub mod embedding;
pub mod error;
pub mod model;
pub mod tool;
