// ABOUTME: Shared test helpers for integration tests
// ABOUTME: Exports the axum request builder used by route tests
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod axum_test;
