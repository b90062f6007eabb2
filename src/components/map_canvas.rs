// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Map canvas widget - paints the latest rendered frame and turns pointer
//! and keyboard input into commands

use crate::data::{Command, command_for_key};
use crate::render::DisplayList;
use crate::settings;
use kurbo::{Affine, Point, Size};
use masonry::accesskit::{Node, Role};
use masonry::core::{
    AccessCtx, BoxConstraints, ChildrenIds, EventCtx, LayoutCtx, PaintCtx, PointerButton,
    PointerButtonEvent, PointerEvent, PointerScrollEvent, PointerUpdate, PropertiesMut,
    PropertiesRef, RegisterCtx, ScrollDelta, TextEvent, Update, UpdateCtx, Widget,
};
use masonry::util::fill_color;
use masonry::vello::Scene;
use std::marker::PhantomData;
use std::sync::Arc;
use xilem::core::{MessageContext, MessageResult, Mut, View, ViewMarker};
use xilem::{Pod, ViewCtx};

/// The map canvas widget
pub struct MapCanvasWidget {
    /// Frame to paint, replaced whenever the renderer produces a new one
    frame: Arc<DisplayList>,

    size: Size,

    /// Where the current drag started, in local coordinates
    drag_origin: Option<Point>,
}

impl MapCanvasWidget {
    pub fn new(frame: Arc<DisplayList>) -> Self {
        Self {
            frame,
            size: Size::ZERO,
            drag_origin: None,
        }
    }

    fn finish_drag(&mut self, ctx: &mut EventCtx<'_>) {
        if self.drag_origin.take().is_some() {
            ctx.release_pointer();
            ctx.submit_action::<Command>(Command::EndDrag);
        }
    }
}

/// Zoom command for a scroll, if the scroll is large enough to count.
/// Scrolling up zooms in.
fn scroll_command(delta: &ScrollDelta) -> Option<Command> {
    let scroll_y = match delta {
        ScrollDelta::LineDelta(_x, y) => *y as f64,
        ScrollDelta::PixelDelta(pos) => pos.y / 10.0,
        ScrollDelta::PageDelta(_x, y) => *y as f64 * 3.0,
    };

    if scroll_y.abs() < 0.001 {
        return None;
    }

    let factor = if scroll_y < 0.0 {
        settings::view::ZOOM_STEP
    } else {
        1.0 / settings::view::ZOOM_STEP
    };
    Some(Command::ZoomBy(factor))
}

impl Widget for MapCanvasWidget {
    type Action = Command;

    fn accepts_focus(&self) -> bool {
        true
    }

    fn register_children(&mut self, _ctx: &mut RegisterCtx<'_>) {}

    fn update(
        &mut self,
        _ctx: &mut UpdateCtx<'_>,
        _props: &mut PropertiesMut<'_>,
        _event: &Update,
    ) {
    }

    fn layout(
        &mut self,
        ctx: &mut LayoutCtx<'_>,
        _props: &mut PropertiesMut<'_>,
        bc: &BoxConstraints,
    ) -> Size {
        let size = bc.max();
        if size != self.size {
            self.size = size;
            ctx.submit_action::<Command>(Command::Resize(size));
        }
        size
    }

    fn paint(&mut self, ctx: &mut PaintCtx<'_>, _props: &PropertiesRef<'_>, scene: &mut Scene) {
        let bg_rect = ctx.size().to_rect();
        fill_color(scene, &bg_rect, crate::theme::map::BACKGROUND);
        self.frame.replay(scene, Affine::IDENTITY);
    }

    fn on_pointer_event(
        &mut self,
        ctx: &mut EventCtx<'_>,
        _props: &mut PropertiesMut<'_>,
        event: &PointerEvent,
    ) {
        // Always request focus on any pointer event so keyboard shortcuts work
        ctx.request_focus();

        match event {
            PointerEvent::Down(PointerButtonEvent {
                button: Some(PointerButton::Primary),
                state,
                ..
            }) => {
                ctx.capture_pointer();
                self.drag_origin = Some(ctx.local_position(state.position));
                ctx.submit_action::<Command>(Command::BeginDrag);
            }

            PointerEvent::Move(PointerUpdate { current, .. }) => {
                if let Some(origin) = self.drag_origin {
                    let offset = ctx.local_position(current.position) - origin;
                    ctx.submit_action::<Command>(Command::DragTo {
                        dx: offset.x,
                        dy: offset.y,
                    });
                }
            }

            PointerEvent::Up(PointerButtonEvent {
                button: Some(PointerButton::Primary),
                ..
            })
            | PointerEvent::Cancel(_) => {
                self.finish_drag(ctx);
            }

            PointerEvent::Scroll(PointerScrollEvent { delta, .. }) => {
                if let Some(command) = scroll_command(delta) {
                    ctx.submit_action::<Command>(command);
                }
            }

            _ => {}
        }
    }

    fn on_text_event(
        &mut self,
        ctx: &mut EventCtx<'_>,
        _props: &mut PropertiesMut<'_>,
        event: &TextEvent,
    ) {
        use masonry::core::keyboard::{Key, KeyState};

        let TextEvent::Keyboard(key_event) = event else {
            return;
        };
        if key_event.state != KeyState::Down {
            return;
        }
        if key_event.modifiers.meta() || key_event.modifiers.ctrl() {
            return;
        }

        if let Key::Character(c) = &key_event.key
            && let Some(command) = command_for_key(c)
        {
            ctx.submit_action::<Command>(command);
            ctx.set_handled();
        }
    }

    fn accessibility_role(&self) -> Role {
        Role::Canvas
    }

    fn accessibility(
        &mut self,
        _ctx: &mut AccessCtx<'_>,
        _props: &PropertiesRef<'_>,
        node: &mut Node,
    ) {
        node.set_label("Map");
    }

    fn children_ids(&self) -> ChildrenIds {
        ChildrenIds::new()
    }
}

// --- Xilem View Wrapper ---

/// Create a map canvas showing `frame`, with a callback for the commands
/// the canvas emits
pub fn map_canvas<State, F>(frame: Arc<DisplayList>, on_command: F) -> MapCanvasView<State, F>
where
    F: Fn(&mut State, Command),
{
    MapCanvasView {
        frame,
        on_command,
        phantom: PhantomData,
    }
}

/// The Xilem View for MapCanvasWidget
#[must_use = "View values do nothing unless provided to Xilem."]
pub struct MapCanvasView<State, F> {
    frame: Arc<DisplayList>,
    on_command: F,
    phantom: PhantomData<fn() -> State>,
}

impl<State, F> ViewMarker for MapCanvasView<State, F> {}

impl<State: 'static, F: Fn(&mut State, Command) + 'static> View<State, (), ViewCtx>
    for MapCanvasView<State, F>
{
    type Element = Pod<MapCanvasWidget>;
    type ViewState = ();

    fn build(&self, ctx: &mut ViewCtx, _app_state: &mut State) -> (Self::Element, Self::ViewState) {
        let widget = MapCanvasWidget::new(self.frame.clone());
        let pod = ctx.create_pod(widget);
        ctx.record_action(pod.new_widget.id());
        (pod, ())
    }

    fn rebuild(
        &self,
        prev: &Self,
        _view_state: &mut Self::ViewState,
        _ctx: &mut ViewCtx,
        mut element: Mut<'_, Self::Element>,
        _app_state: &mut State,
    ) {
        // A new frame is a new Arc; the same Arc means nothing to repaint
        if !Arc::ptr_eq(&self.frame, &prev.frame) {
            let mut widget = element.downcast::<MapCanvasWidget>();
            widget.widget.frame = self.frame.clone();
            widget.ctx.request_render();
        }
    }

    fn teardown(
        &self,
        _view_state: &mut Self::ViewState,
        _ctx: &mut ViewCtx,
        _element: Mut<'_, Self::Element>,
    ) {
    }

    fn message(
        &self,
        _view_state: &mut Self::ViewState,
        message: &mut MessageContext,
        _element: Mut<'_, Self::Element>,
        app_state: &mut State,
    ) -> MessageResult<()> {
        match message.take_message::<Command>() {
            Some(command) => {
                (self.on_command)(app_state, *command);
                MessageResult::Action(())
            }
            None => MessageResult::Stale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_up_zooms_in() {
        assert_eq!(
            scroll_command(&ScrollDelta::LineDelta(0.0, -1.0)),
            Some(Command::ZoomBy(settings::view::ZOOM_STEP))
        );
        assert_eq!(
            scroll_command(&ScrollDelta::LineDelta(0.0, 2.0)),
            Some(Command::ZoomBy(1.0 / settings::view::ZOOM_STEP))
        );
    }

    #[test]
    fn test_tiny_scroll_is_ignored() {
        assert_eq!(scroll_command(&ScrollDelta::LineDelta(3.0, 0.0)), None);
    }
}
