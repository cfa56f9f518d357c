// SPDX-License-Identifier: MIT

pub mod config;
pub mod retriever;
pub mod server;
pub mod tools;
pub mod workflow;
