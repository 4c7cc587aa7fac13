// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`astrodex-core`)
//!
//! HTTP surface that translates requests into application service calls.
//! All decisions are delegated to `crate::application`.

pub mod api;
