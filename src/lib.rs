// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod aggregate;
pub mod app;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod remote;
pub mod session;
pub mod utils;
pub mod views;

pub use app::App;
pub use errors::ClientError;
