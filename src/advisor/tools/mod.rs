// SPDX-License-Identifier: MIT

pub mod tavily;
