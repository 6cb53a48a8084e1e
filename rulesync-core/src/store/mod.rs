// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Remote object store layer
//!
//! - **RemoteObjectStore trait**: list/download contract consumed by the
//!   sync service
//! - **MockObjectStore**: in-memory store for tests
//! - **HttpObjectStore**: reference HTTP adapter (`remote-store` feature)

#[cfg(feature = "remote-store")]
mod http;
mod mock;
mod remote;

#[cfg(feature = "remote-store")]
pub use http::HttpObjectStore;
pub use mock::MockObjectStore;
pub use remote::{RemoteObjectStore, TransportError, TransportResult};
