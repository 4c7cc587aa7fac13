// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod repositories;
pub mod db;
pub mod event_bus;
pub mod identity;

pub use event_bus::{EventBus, EventBusError, EventReceiver};
pub use identity::InMemoryIdentityProvider;
