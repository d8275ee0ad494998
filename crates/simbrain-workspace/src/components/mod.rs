// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Built-in components

pub mod data_table;
pub mod network_component;
pub mod recorder;

pub use data_table::DataTableComponent;
pub use network_component::NetworkComponent;
pub use recorder::RecorderComponent;
