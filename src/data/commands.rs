// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! User commands and their dispatch into AppState.
//!
//! Widgets and buttons never touch renderer state directly; they emit a
//! `Command` which is applied here.

use super::AppState;
use crate::model::EntityKind;
use kurbo::Size;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    ZoomIn,
    ZoomOut,
    /// Multiply the zoom by a factor (scroll)
    ZoomBy(f64),
    ResetView,
    /// Pan by a screen-space delta
    Pan { dx: f64, dy: f64 },
    BeginDrag,
    /// Drag offset since `BeginDrag`, in screen pixels
    DragTo { dx: f64, dy: f64 },
    EndDrag,
    ToggleVisible(EntityKind),
    Resize(Size),
    LoadRegion,
    ClearData,
    Export,
}

impl Command {
    /// Whether the command changes persisted view state
    fn changes_view(&self) -> bool {
        matches!(
            self,
            Self::ZoomIn
                | Self::ZoomOut
                | Self::ZoomBy(_)
                | Self::ResetView
                | Self::Pan { .. }
                | Self::EndDrag
                | Self::ToggleVisible(_)
        )
    }
}

/// Keyboard shortcut for a key, if any
pub fn command_for_key(key: &str) -> Option<Command> {
    let command = match key {
        "+" | "=" => Command::ZoomIn,
        "-" | "_" => Command::ZoomOut,
        "0" => Command::ResetView,
        "n" | "N" => Command::ToggleVisible(EntityKind::Node),
        "w" | "W" => Command::ToggleVisible(EntityKind::Way),
        "r" | "R" => Command::ToggleVisible(EntityKind::Relation),
        "l" | "L" => Command::LoadRegion,
        "c" | "C" => Command::ClearData,
        "e" | "E" => Command::Export,
        _ => return None,
    };
    Some(command)
}

impl AppState {
    pub fn dispatch(&mut self, command: Command) {
        tracing::debug!("Dispatching {:?}", command);
        match command {
            Command::ZoomIn => self.renderer.zoom_in(),
            Command::ZoomOut => self.renderer.zoom_out(),
            Command::ZoomBy(factor) => self.renderer.zoom_by(factor),
            Command::ResetView => self.renderer.reset_view(),
            Command::Pan { dx, dy } => self.renderer.pan(dx, dy),
            Command::BeginDrag => self.renderer.begin_drag(),
            Command::DragTo { dx, dy } => {
                self.renderer.drag_to(dx, dy, Instant::now());
            }
            Command::EndDrag => self.renderer.end_drag(),
            Command::ToggleVisible(kind) => self.renderer.toggle_visible(kind),
            Command::Resize(size) => self.renderer.set_canvas_size(size),
            Command::LoadRegion => self.load_region(),
            Command::ClearData => self.clear_data(),
            Command::Export => self.export_dialog(),
        }

        if command.changes_view() {
            self.save_view_preferences();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::app_state;
    use super::*;
    use crate::render::Phase;
    use crate::settings;

    #[test]
    fn test_key_bindings() {
        assert_eq!(command_for_key("+"), Some(Command::ZoomIn));
        assert_eq!(command_for_key("="), Some(Command::ZoomIn));
        assert_eq!(command_for_key("-"), Some(Command::ZoomOut));
        assert_eq!(command_for_key("0"), Some(Command::ResetView));
        assert_eq!(
            command_for_key("W"),
            Some(Command::ToggleVisible(EntityKind::Way))
        );
        assert_eq!(command_for_key("l"), Some(Command::LoadRegion));
        assert_eq!(command_for_key("x"), None);
    }

    #[test]
    fn test_zoom_commands_clamp() {
        let mut state = app_state();
        for _ in 0..200 {
            state.dispatch(Command::ZoomIn);
        }
        assert_eq!(state.renderer.zoom(), settings::view::MAX_ZOOM);
        state.dispatch(Command::ResetView);
        assert_eq!(state.renderer.zoom(), 1.0);
    }

    #[test]
    fn test_view_changes_update_preferences() {
        let mut state = app_state();
        state.dispatch(Command::ZoomBy(2.0));
        state.dispatch(Command::ToggleVisible(EntityKind::Node));
        assert_eq!(state.preferences.get("zoom"), Some("2"));
        assert_eq!(state.preferences.get("show_nodes"), Some("false"));
        assert_eq!(
            state.preferences.get("region"),
            Some(settings::region::DEFAULT)
        );
    }

    #[test]
    fn test_drag_commits_on_release() {
        let mut state = app_state();
        state.dispatch(Command::BeginDrag);
        state.dispatch(Command::DragTo { dx: 30.0, dy: 10.0 });
        state.dispatch(Command::EndDrag);
        assert_eq!(state.renderer.pan_offset(), kurbo::Vec2::new(30.0, -10.0));
        assert_eq!(state.preferences.get("pan_x"), Some("30"));
    }

    #[test]
    fn test_resize_schedules_render() {
        let mut state = app_state();
        state.on_frame();
        assert_eq!(state.renderer.scheduler().phase(), Phase::Idle);
        state.dispatch(Command::Resize(Size::new(640.0, 480.0)));
        assert_eq!(state.renderer.scheduler().phase(), Phase::Pending);
    }
}
