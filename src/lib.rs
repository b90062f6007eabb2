// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! OSM Canvas: an offline-capable OpenStreetMap vector renderer built with
//! Xilem

use anyhow::Context;
use std::sync::Arc;
use winit::dpi::LogicalSize;
use xilem::core::fork;
use xilem::{EventLoopBuilder, WidgetView, WindowView, Xilem, window};

pub mod components;
pub mod data;
pub mod fetch;
pub mod model;
pub mod preferences;
pub mod render;
pub mod settings;
pub mod store;
pub mod style;
pub mod theme;
pub mod views;
pub mod worker;

use data::{AppState, MapLoader};
use fetch::OsmApi;
use preferences::Preferences;
use store::StoreBackend;
use views::map_view;
use worker::{FrameTick, LoaderEvent};

/// Entry point for the OSM Canvas application
pub fn run(event_loop: EventLoopBuilder) -> anyhow::Result<()> {
    // Initialize tracing subscriber (can be controlled via RUST_LOG env var)
    // Filter out noisy wgpu/naga shader compilation logs
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("osm_canvas=info".parse().unwrap())
                .add_directive("wgpu=warn".parse().unwrap())
                .add_directive("naga=warn".parse().unwrap())
                .add_directive("wgpu_core=warn".parse().unwrap())
                .add_directive("wgpu_hal=warn".parse().unwrap()),
        )
        .init();

    let source = OsmApi::new().context("Failed to create HTTP client")?;
    let loader = MapLoader::new(StoreBackend::platform_default(), source);
    let preferences = Preferences::in_config_dir();
    let initial_state = AppState::new(Arc::new(loader), preferences, region_from_args());

    let app = Xilem::new(initial_state, app_logic);
    app.run_in(event_loop)?;
    Ok(())
}

/// Optional first argument: the region to show in the region field
fn region_from_args() -> Option<String> {
    let region = std::env::args().nth(1)?;
    if let Err(e) = region.parse::<model::BoundingBox>() {
        tracing::warn!("Invalid region {:?}: {}", region, e);
        tracing::warn!("Usage: osm-canvas [min_lon,min_lat,max_lon,max_lat]");
    }
    Some(region)
}

/// Build the single-window UI
fn app_logic(state: &mut AppState) -> impl Iterator<Item = WindowView<AppState>> + use<> {
    let content = map_view_with_tasks(state);

    let window_size = LogicalSize::new(1280.0, 800.0);
    let window_view = window(state.main_window_id, "OSM Canvas", content);
    let window_with_options = window_view.with_options(|options| {
        options
            .with_initial_inner_size(window_size)
            .on_close(|state: &mut AppState| {
                state.save_view_preferences();
                state.running = false;
            })
    });

    std::iter::once(window_with_options)
}

/// Map view with the background loader and the frame ticker attached.
///
/// The loader serves `LoaderCommand`s queued by the app state, one at a
/// time. The ticker drives the render scheduler at the frame interval.
fn map_view_with_tasks(state: &mut AppState) -> impl WidgetView<AppState> + use<> {
    let inbox = state.inbox.clone();
    let loader = state.loader.clone();
    let view = map_view(state);

    let with_loader = fork(
        view,
        xilem::view::task_raw(
            move |proxy| {
                let inbox = inbox.clone();
                let loader = loader.clone();
                async move {
                    worker::run_loader(proxy, inbox, loader).await;
                }
            },
            |state: &mut AppState, event: LoaderEvent| {
                state.on_loader_event(event);
            },
        ),
    );

    fork(
        with_loader,
        xilem::view::task_raw(
            |proxy| async move {
                worker::frame_ticker(proxy).await;
            },
            |state: &mut AppState, _tick: FrameTick| {
                state.on_frame();
            },
        ),
    )
}
