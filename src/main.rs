// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! OSM Canvas: an offline-capable OpenStreetMap vector renderer

use xilem::EventLoop;

fn main() -> anyhow::Result<()> {
    osm_canvas::run(EventLoop::with_user_event())
}
