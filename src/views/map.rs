// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Map view - toolbar, map canvas and status bar

use masonry::properties::types::AsUnit;
use xilem::WidgetView;
use xilem::style::Style;
use xilem::view::{CrossAxisAlignment, FlexExt, button, flex_col, flex_row, label, sized_box};

use crate::components::map_canvas;
use crate::data::{AppState, Command};
use crate::model::{BboxError, EntityKind};
use crate::theme;

/// The single window content
pub fn map_view(state: &mut AppState) -> impl WidgetView<AppState> + use<> {
    flex_col((
        toolbar(state),
        map_canvas(state.frame.clone(), |state: &mut AppState, command| {
            state.dispatch(command);
        })
        .flex(1.0),
        status_bar(state),
    ))
    .gap(theme::size::GAP.px())
    .cross_axis_alignment(CrossAxisAlignment::Fill)
    .padding(theme::size::GAP * 2.0)
    .background_color(theme::app::BACKGROUND)
}

// ===== Toolbar =====

fn toolbar(state: &AppState) -> impl WidgetView<AppState> + use<> {
    sized_box(
        flex_row((
            region_input(state),
            toolbar_button("Load", Command::LoadRegion),
            toolbar_button("Clear", Command::ClearData),
            toolbar_button("Export", Command::Export),
            label("").flex(1.0),
            toolbar_button(&state.visibility_label(EntityKind::Node), Command::ToggleVisible(EntityKind::Node)),
            toolbar_button(&state.visibility_label(EntityKind::Way), Command::ToggleVisible(EntityKind::Way)),
            toolbar_button(
                &state.visibility_label(EntityKind::Relation),
                Command::ToggleVisible(EntityKind::Relation),
            ),
            toolbar_button("−", Command::ZoomOut),
            toolbar_button("+", Command::ZoomIn),
            toolbar_button("Reset", Command::ResetView),
        ))
        .gap(theme::size::GAP.px())
        .cross_axis_alignment(CrossAxisAlignment::Center),
    )
    .expand_width()
    .padding(8.0)
    .background_color(theme::panel::BACKGROUND)
    .border_color(theme::panel::OUTLINE)
    .border_width(theme::size::BORDER_WIDTH)
    .corner_radius(theme::size::PANEL_RADIUS)
}

/// Region text input with its validation message underneath
fn region_input(state: &AppState) -> impl WidgetView<AppState> + use<> {
    let input = sized_box(
        xilem::view::text_input(state.region.clone(), |state: &mut AppState, new_value| {
            state.region = new_value;
            state.region_error = None;
        })
        .placeholder("min lon, min lat, max lon, max lat"),
    )
    .width(theme::size::REGION_INPUT_WIDTH.px())
    .border_color(match state.region_error {
        Some(_) => theme::text::ERROR,
        None => theme::panel::INPUT_OUTLINE,
    })
    .border_width(theme::size::BORDER_WIDTH)
    .corner_radius(theme::size::BUTTON_RADIUS);

    let error = label(state.region_error.as_ref().map(region_error_text).unwrap_or_default())
        .text_size(12.0)
        .color(theme::text::ERROR);

    flex_col((input, error))
        .gap(2.px())
        .cross_axis_alignment(CrossAxisAlignment::Start)
}

fn region_error_text(error: &BboxError) -> String {
    match error.field() {
        Some(field) => format!("Check {}: {}", field, error),
        None => error.to_string(),
    }
}

fn toolbar_button(text: &str, command: Command) -> impl WidgetView<AppState> + use<> {
    button(
        label(text.to_string())
            .text_size(14.0)
            .color(theme::text::PRIMARY),
        move |state: &mut AppState| state.dispatch(command),
    )
    .background_color(theme::app::BACKGROUND)
    .border_color(theme::panel::OUTLINE)
    .border_width(theme::size::BORDER_WIDTH)
    .corner_radius(theme::size::BUTTON_RADIUS)
}

// ===== Status Bar =====

/// Counts and load time on the left, the last error or notice on the right
fn status_bar(state: &AppState) -> impl WidgetView<AppState> + use<> {
    let (message, color) = match (&state.error_message, &state.notice) {
        (Some(error), _) => (error.clone(), theme::text::ERROR),
        (None, notice) => (notice.clone().unwrap_or_default(), theme::text::NOTICE),
    };

    sized_box(
        flex_row((
            label(state.status_line())
                .text_size(14.0)
                .color(theme::text::SECONDARY),
            label("").flex(1.0),
            label(message).text_size(14.0).color(color),
        ))
        .cross_axis_alignment(CrossAxisAlignment::Center),
    )
    .expand_width()
    .padding(8.0)
    .background_color(theme::panel::BACKGROUND)
    .border_color(theme::panel::OUTLINE)
    .border_width(theme::size::BORDER_WIDTH)
    .corner_radius(theme::size::PANEL_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    #[test]
    fn test_region_error_names_field() {
        let err = "a,0,1,1".parse::<BoundingBox>().unwrap_err();
        assert!(region_error_text(&err).starts_with("Check min longitude:"));

        let err = "0,0,1".parse::<BoundingBox>().unwrap_err();
        assert_eq!(
            region_error_text(&err),
            "expected 4 comma-separated coordinates, found 3"
        );
    }
}
