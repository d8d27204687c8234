use std::time::Instant;

use chrono::{Datelike, Duration, NaiveDate};
use egui::{Align2, Color32, Id, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};

use crate::model::{Event, EventId, Resource, ResourceId, TimelineConfig};
use crate::timeline::pointer::{self, ContainerRect, PointerSample};
use crate::timeline::{HoverTarget, Layout, Timeline, Viewport};
use crate::ui::theme;

#[derive(Debug, Clone)]
struct DragSnapshot {
    start: NaiveDate,
    end: NaiveDate,
    /// Days between the event start and the day that was grabbed.
    grab_offset: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum DragMode {
    Move,
    ResizeStart,
    ResizeEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventEdit {
    Move {
        id: EventId,
        start: NaiveDate,
    },
    Resize {
        id: EventId,
        start: NaiveDate,
        end: NaiveDate,
    },
}

/// Result details from interactions with the timeline.
#[derive(Debug, Clone, Default)]
pub struct TimelineInteraction {
    pub changed: bool,
    pub message: Option<String>,
}

/// Places layout coordinates on the painted canvas. Right-to-left layout
/// x values are negative and measured from the canvas' right edge.
#[derive(Debug, Clone, Copy)]
struct Canvas {
    origin: Pos2,
    width: f32,
    rtl: bool,
}

impl Canvas {
    /// Screen x of the left edge of a span `w` wide at layout position `x`.
    fn left(&self, x: f32, w: f32) -> f32 {
        if self.rtl {
            self.origin.x + self.width + x - w
        } else {
            self.origin.x + x
        }
    }

    fn span(&self, x: f32, top: f32, w: f32, h: f32) -> Rect {
        Rect::from_min_size(
            Pos2::new(self.left(x, w), self.origin.y + top),
            Vec2::new(w, h),
        )
    }
}

/// Container offset (always `0..=max` in egui) as a raw, direction-signed one.
pub fn raw_scroll_left(offset_x: f32, max_offset: f32, rtl: bool) -> f32 {
    if rtl {
        -(max_offset - offset_x)
    } else {
        offset_x
    }
}

pub fn offset_from_raw(raw: f32, max_offset: f32, rtl: bool) -> f32 {
    if rtl {
        max_offset + raw
    } else {
        raw
    }
}

/// Whether the container offset should be fed back as a scroll sample.
///
/// Frames that wrote an offset (a pending write or an animation step) or
/// queued one (drag autoscroll) already hold the controller's own value, and
/// the container has not caught up with it yet.
fn should_observe(requested: Option<f32>, autoscrolled: bool, raw: f32, last: f32) -> bool {
    requested.is_none() && !autoscrolled && raw != last
}

fn drag_id(event_id: EventId, mode: DragMode) -> Id {
    Id::new(("timeline-drag", event_id, mode))
}

/// Render the timeline and feed scroll, hover and drag input back into it.
pub fn show_timeline(
    timeline: &mut Timeline,
    selected: &mut Option<EventId>,
    ui: &mut Ui,
) -> TimelineInteraction {
    let now = Instant::now();
    let mut interaction = TimelineInteraction::default();
    let available = ui.available_size();

    if !timeline.is_attached() {
        timeline.attach(Viewport {
            width: available.x,
            height: available.y,
        });
        timeline.go_to_today(false, now);
    }
    let viewport_width = timeline
        .scroll()
        .viewport()
        .map_or(available.x, |v| v.width);

    let requested = timeline.poll_scroll(now);
    timeline.refresh();
    let config = *timeline.config();
    let rtl = config.is_rtl();
    let hovered = timeline.hovered();

    let Some(layout) = timeline.current_layout() else {
        return interaction;
    };
    let content = Vec2::new(
        layout.timeline_width.max(available.x),
        layout.timeline_height.max(available.y),
    );
    let max_offset = (content.x - viewport_width).max(0.0);

    let mut area = egui::ScrollArea::both().auto_shrink([false, false]);
    if let Some(raw) = requested {
        area = area.horizontal_scroll_offset(offset_from_raw(raw, max_offset, rtl));
    }

    let events = timeline.events();
    let resources = timeline.resources();
    let mut edit: Option<EventEdit> = None;
    let mut autoscroll_x: Option<f32> = None;
    let mut toggled: Option<ResourceId> = None;

    let output = area.show(ui, |ui| {
        let (response, painter) = ui.allocate_painter(content, Sense::click());
        let canvas = Canvas {
            origin: response.rect.min,
            width: content.x,
            rtl,
        };
        let clip = ui.clip_rect();
        let container = ContainerRect {
            left: clip.left(),
            top: clip.top(),
            width: clip.width(),
            scroll_left: raw_scroll_left(
                clip.left() - canvas.origin.x,
                content.x - clip.width(),
                rtl,
            ),
            scroll_top: clip.top() - canvas.origin.y,
        };
        let sample = |pos: Pos2| PointerSample {
            page_x: pos.x,
            page_y: pos.y,
        };
        let mut consumed_click = false;

        painter.rect_filled(response.rect, 0.0, theme::BG_DARK);
        draw_rows(&painter, canvas, layout, content.x);
        draw_weekends(&painter, canvas, layout, &config, content.y);
        draw_grid(&painter, canvas, layout, &config, clip, content.y);
        draw_hover(&painter, canvas, layout, &config, hovered);
        draw_resource_spans(&painter, canvas, layout);
        draw_today_line(&painter, canvas, layout, &config, content.y);

        for event in events {
            let Some(rect) = layout.event(event.id) else {
                continue;
            };
            let row = resources
                .iter()
                .position(|r| r.id == event.resource_id)
                .unwrap_or(0);
            let colour = theme::resource_color(
                resources.get(row).and_then(|r| r.colour.as_deref()),
                row,
            );
            let bar = canvas.span(
                rect.left,
                rect.top + theme::BAR_INSET,
                rect.width,
                config.row_height - theme::BAR_INSET * 2.0,
            );
            if !bar.intersects(clip) {
                continue;
            }
            let is_selected = *selected == Some(event.id);
            draw_event_bar(&painter, bar, event, colour, is_selected);

            let bar_response = ui.interact(
                bar,
                ui.make_persistent_id(("event-bar", event.id)),
                Sense::click_and_drag(),
            );
            let (start_edge, end_edge) = if rtl {
                (bar.right(), bar.left())
            } else {
                (bar.left(), bar.right())
            };
            let handle = |x: f32| {
                Rect::from_min_max(
                    Pos2::new(x - theme::HANDLE_WIDTH * 0.5, bar.top()),
                    Pos2::new(x + theme::HANDLE_WIDTH * 0.5, bar.bottom()),
                )
                .expand(4.0)
            };
            let start_response = ui.interact(
                handle(start_edge),
                ui.make_persistent_id(("event-resize-start", event.id)),
                Sense::drag(),
            );
            let end_response = ui.interact(
                handle(end_edge),
                ui.make_persistent_id(("event-resize-end", event.id)),
                Sense::drag(),
            );

            if bar_response.clicked() {
                *selected = Some(event.id);
                consumed_click = true;
            }

            let modes = [
                (DragMode::ResizeStart, &start_response),
                (DragMode::ResizeEnd, &end_response),
                (DragMode::Move, &bar_response),
            ];
            for (mode, response) in modes {
                if response.drag_started() {
                    let grabbed = response.interact_pointer_pos().and_then(|p| {
                        pointer::hit_test(sample(p), container, &config, layout).date
                    });
                    let grab_offset = grabbed.map_or(0, |d| (d - event.start_date).num_days());
                    ui.ctx().data_mut(|data| {
                        data.insert_temp(
                            drag_id(event.id, mode),
                            DragSnapshot {
                                start: event.start_date,
                                end: event.end_date,
                                grab_offset,
                            },
                        );
                    });
                    *selected = Some(event.id);
                    consumed_click = true;
                }
            }

            let active = modes.iter().find(|(_, response)| response.dragged());
            if let Some(&(mode, response)) = active {
                let cursor = if mode == DragMode::Move {
                    egui::CursorIcon::Grab
                } else {
                    egui::CursorIcon::ResizeHorizontal
                };
                ui.ctx().set_cursor_icon(cursor);

                let snapshot = ui
                    .ctx()
                    .data_mut(|data| data.get_temp::<DragSnapshot>(drag_id(event.id, mode)));
                if let (Some(snapshot), Some(pos)) = (snapshot, response.interact_pointer_pos()) {
                    let target = pointer::hit_test(sample(pos), container, &config, layout).date;
                    if let Some(date) = target {
                        edit = Some(match mode {
                            DragMode::Move => EventEdit::Move {
                                id: event.id,
                                start: date - Duration::days(snapshot.grab_offset),
                            },
                            DragMode::ResizeStart => EventEdit::Resize {
                                id: event.id,
                                start: date.min(snapshot.end),
                                end: snapshot.end,
                            },
                            DragMode::ResizeEnd => EventEdit::Resize {
                                id: event.id,
                                start: snapshot.start,
                                end: date.max(snapshot.start),
                            },
                        });
                    }
                    autoscroll_x = Some(pointer::content_x(sample(pos), container, &config));
                }
            }

            for (mode, response) in modes {
                if response.drag_stopped() {
                    ui.ctx().data_mut(|data| {
                        data.remove::<DragSnapshot>(drag_id(event.id, mode));
                    });
                }
            }

            if is_selected || start_response.hovered() || end_response.hovered() {
                if start_response.hovered() || end_response.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
                } else if bar_response.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                }
                draw_handles(&painter, bar);
            }

            if bar_response.hovered() {
                egui::show_tooltip_at_pointer(
                    ui.ctx(),
                    ui.layer_id(),
                    Id::new(("event-tip", event.id)),
                    |ui| {
                        ui.strong(&event.name);
                        ui.label(format!(
                            "{} → {}",
                            event.start_date.format("%d/%m/%Y"),
                            event.end_date.format("%d/%m/%Y"),
                        ));
                        ui.label(format!("{} day(s)", event.duration_days()));
                    },
                );
            }
        }

        toggled = draw_labels(
            ui, &painter, canvas, layout, resources, events, &config, clip,
        );
        if toggled.is_some() {
            consumed_click = true;
        }
        draw_header(&painter, canvas, layout, &config, clip);

        if response.clicked() && !consumed_click {
            *selected = None;
        }
    });

    let offset = output.state.offset;
    let inner = output.inner_rect;
    timeline.attach(Viewport {
        width: inner.width(),
        height: inner.height(),
    });
    let max_offset = (output.content_size.x - inner.width()).max(0.0);
    let raw = raw_scroll_left(offset.x, max_offset, rtl);

    if let Some(edit) = edit {
        apply_edit(timeline, edit, &mut interaction);
    }
    let autoscrolled = autoscroll_x
        .is_some_and(|x| timeline.ensure_position_visible(x, config.column_width, now));
    if autoscrolled {
        ui.ctx().request_repaint();
    }
    if let Some(resource_id) = toggled {
        let open = timeline.toggle_open_resource(resource_id);
        interaction.changed = true;
        if let Some(resource) = timeline.resources().iter().find(|r| r.id == resource_id) {
            let state = if open { "Expanded" } else { "Collapsed" };
            interaction.message = Some(format!("{} '{}'", state, resource.name));
        }
    }

    if should_observe(requested, autoscrolled, raw, timeline.scroll().scroll_left())
        && timeline.on_scroll(raw, now).is_some()
    {
        ui.ctx().request_repaint();
    }

    match ui.ctx().pointer_hover_pos() {
        Some(pos) if inner.contains(pos) => {
            let container = ContainerRect {
                left: inner.left(),
                top: inner.top(),
                width: inner.width(),
                scroll_left: raw,
                scroll_top: offset.y,
            };
            let sample = PointerSample {
                page_x: pos.x,
                page_y: pos.y,
            };
            if timeline.on_pointer_move(sample, container, now).is_none() {
                // dropped by the throttle; look again next frame
                ui.ctx().request_repaint_after(std::time::Duration::from_millis(100));
            }
        }
        _ => timeline.clear_hover(),
    }

    if timeline.scroll().is_animating() {
        ui.ctx().request_repaint();
    }

    interaction
}

fn apply_edit(timeline: &mut Timeline, edit: EventEdit, interaction: &mut TimelineInteraction) {
    let (id, start, end) = match edit {
        EventEdit::Move { id, start } => {
            let Some(event) = timeline.event(id) else {
                return;
            };
            if event.start_date == start {
                return;
            }
            (id, start, None)
        }
        EventEdit::Resize { id, start, end } => {
            let Some(event) = timeline.event(id) else {
                return;
            };
            if event.start_date == start && event.end_date == end {
                return;
            }
            (id, start, Some(end))
        }
    };

    let result = match end {
        Some(end) => timeline.update_event_duration(id, start, end),
        None => timeline.update_event_date(id, start),
    };
    match result {
        Ok(()) => {
            interaction.changed = true;
            if let Some(event) = timeline.event(id) {
                interaction.message = Some(format!(
                    "Updated '{}' ({} → {})",
                    event.name,
                    event.start_date.format("%Y-%m-%d"),
                    event.end_date.format("%Y-%m-%d"),
                ));
            }
        }
        Err(e) => log::debug!("ignoring drag edit: {}", e),
    }
}

fn draw_rows(painter: &egui::Painter, canvas: Canvas, layout: &Layout, width: f32) {
    for (i, row) in layout.rows.iter().enumerate() {
        let rect = Rect::from_min_size(
            Pos2::new(canvas.origin.x, canvas.origin.y + row.top),
            Vec2::new(width, row.height),
        );
        if i % 2 == 0 {
            painter.rect_filled(rect, 0.0, theme::BG_ROW_ALT);
        }
        painter.line_segment(
            [rect.left_bottom(), rect.right_bottom()],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }
}

fn draw_weekends(
    painter: &egui::Painter,
    canvas: Canvas,
    layout: &Layout,
    config: &TimelineConfig,
    height: f32,
) {
    for weekend in &layout.weekends {
        let rect = canvas.span(
            weekend.left,
            config.header_height,
            config.column_width,
            height - config.header_height,
        );
        painter.rect_filled(rect, 0.0, theme::BG_WEEKEND);
    }
}

fn draw_grid(
    painter: &egui::Painter,
    canvas: Canvas,
    layout: &Layout,
    config: &TimelineConfig,
    clip: Rect,
    height: f32,
) {
    for x in layout.date_positions.values() {
        let left = canvas.left(*x, config.column_width);
        if left < clip.left() - config.column_width || left > clip.right() {
            continue;
        }
        painter.line_segment(
            [
                Pos2::new(left, canvas.origin.y + config.header_height),
                Pos2::new(left, canvas.origin.y + height),
            ],
            Stroke::new(0.5, theme::GRID_LINE),
        );
    }
}

fn draw_hover(
    painter: &egui::Painter,
    canvas: Canvas,
    layout: &Layout,
    config: &TimelineConfig,
    hovered: HoverTarget,
) {
    let (Some(resource_id), Some(date)) = (hovered.resource_id, hovered.date) else {
        return;
    };
    let (Some(row), Some(x)) = (layout.row(resource_id), layout.x(date)) else {
        return;
    };
    painter.rect_filled(
        canvas.span(x, row.top, config.column_width, row.height),
        0.0,
        theme::BG_HOVER_CELL,
    );
}

fn draw_resource_spans(painter: &egui::Painter, canvas: Canvas, layout: &Layout) {
    for span in layout.resource_spans.values() {
        painter.rect_filled(
            canvas.span(span.left, span.top + 1.0, span.width, theme::SPAN_HEIGHT),
            Rounding::same(2.0),
            theme::SPAN_FILL,
        );
    }
}

fn draw_today_line(
    painter: &egui::Painter,
    canvas: Canvas,
    layout: &Layout,
    config: &TimelineConfig,
    height: f32,
) {
    let Some(x) = layout
        .today_index
        .and_then(|i| layout.dates.get(i))
        .and_then(|d| layout.x(*d))
    else {
        return;
    };
    let center = canvas.left(x, config.column_width) + config.column_width / 2.0;
    painter.line_segment(
        [
            Pos2::new(center, canvas.origin.y + config.header_height),
            Pos2::new(center, canvas.origin.y + height),
        ],
        Stroke::new(1.5, theme::TODAY_LINE),
    );
}

fn draw_event_bar(
    painter: &egui::Painter,
    bar: Rect,
    event: &Event,
    colour: Color32,
    is_selected: bool,
) {
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    // Soft shadow
    painter.rect_filled(
        bar.translate(Vec2::new(1.0, 2.0)),
        rounding,
        Color32::from_black_alpha(35),
    );
    painter.rect_filled(bar, rounding, colour);

    // Lighter top highlight
    let highlight = Rect::from_min_size(bar.min, Vec2::new(bar.width(), (bar.height() * 0.45).max(4.0)));
    painter.rect_filled(
        highlight,
        Rounding {
            nw: theme::BAR_ROUNDING,
            ne: theme::BAR_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        Color32::from_white_alpha(25),
    );

    if is_selected {
        painter.rect_stroke(
            bar.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    if bar.width() > 30.0 {
        let galley = painter.layout_no_wrap(event.name.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let text_y = bar.top() + (bar.height() - galley.size().y) / 2.0;
        painter
            .with_clip_rect(bar)
            .galley(Pos2::new(bar.left() + 6.0, text_y), galley, Color32::TRANSPARENT);
    }
}

fn draw_handles(painter: &egui::Painter, bar: Rect) {
    let handle_h = bar.height() * 0.55;
    let handle_y = bar.center().y - handle_h / 2.0;
    for x in [bar.left() - 1.5, bar.right() - 2.5] {
        painter.rect_filled(
            Rect::from_min_size(Pos2::new(x, handle_y), Vec2::new(4.0, handle_h)),
            Rounding::same(2.0),
            theme::HANDLE_COLOR,
        );
    }
}

/// Resource names, pinned to the start edge of the visible area. Clicking a
/// name expands or collapses its row; returns the resource clicked.
#[allow(clippy::too_many_arguments)]
fn draw_labels(
    ui: &Ui,
    painter: &egui::Painter,
    canvas: Canvas,
    layout: &Layout,
    resources: &[Resource],
    events: &[Event],
    config: &TimelineConfig,
    clip: Rect,
) -> Option<ResourceId> {
    let x = if canvas.rtl {
        clip.right() - config.resource_label_width
    } else {
        clip.left()
    };
    let mut clicked = None;
    for (i, (row, resource)) in layout.rows.iter().zip(resources).enumerate() {
        let rect = Rect::from_min_size(
            Pos2::new(x, canvas.origin.y + row.top),
            Vec2::new(config.resource_label_width, row.height),
        );
        if !rect.intersects(clip) {
            continue;
        }
        let response = ui.interact(
            rect,
            ui.make_persistent_id(("resource-label", resource.id)),
            Sense::click(),
        );
        if response.clicked() {
            clicked = Some(resource.id);
        }
        if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        let fill = if response.hovered() {
            theme::BG_HEADER
        } else {
            theme::BG_PANEL
        };
        painter.rect_filled(rect, 0.0, fill);
        painter.rect_filled(
            Rect::from_min_size(rect.min, Vec2::new(3.0, rect.height())),
            0.0,
            theme::resource_color(resource.colour.as_deref(), i),
        );

        let caret = if row.open {
            egui_phosphor::regular::CARET_DOWN
        } else {
            egui_phosphor::regular::CARET_RIGHT
        };
        let label = if !row.open && row.lanes > 1 {
            format!("{}  {}  ({})", caret, resource.name, row.lanes)
        } else {
            format!("{}  {}", caret, resource.name)
        };
        let clipped = painter.with_clip_rect(rect);
        clipped.text(
            Pos2::new(rect.left() + 12.0, rect.top() + config.row_height / 2.0),
            Align2::LEFT_CENTER,
            label,
            theme::font_label(),
            theme::TEXT_PRIMARY,
        );

        // one line per event below the summary line
        if row.open {
            let own = events.iter().filter(|e| e.resource_id == resource.id);
            for (line, event) in own.enumerate() {
                let y = rect.top() + (line as f32 + 1.5) * config.row_height;
                clipped.text(
                    Pos2::new(rect.left() + 32.0, y),
                    Align2::LEFT_CENTER,
                    &event.name,
                    theme::font_small(),
                    theme::TEXT_SECONDARY,
                );
            }
        }

        painter.line_segment(
            [rect.left_bottom(), rect.right_bottom()],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }
    clicked
}

/// Month and day header, pinned to the top of the visible area.
fn draw_header(
    painter: &egui::Painter,
    canvas: Canvas,
    layout: &Layout,
    config: &TimelineConfig,
    clip: Rect,
) {
    let top = clip.top();
    let band = config.header_height / 2.0;
    painter.rect_filled(
        Rect::from_min_size(Pos2::new(clip.left(), top), Vec2::new(clip.width(), config.header_height)),
        0.0,
        theme::BG_HEADER,
    );

    for month in &layout.months {
        let left = canvas.left(month.left, if canvas.rtl { config.column_width } else { 0.0 });
        let rect = if canvas.rtl {
            Rect::from_min_size(
                Pos2::new(left + config.column_width - month.width, top),
                Vec2::new(month.width, band),
            )
        } else {
            Rect::from_min_size(Pos2::new(left, top), Vec2::new(month.width, band))
        };
        if !rect.intersects(clip) {
            continue;
        }
        let (anchor, align) = if canvas.rtl {
            (Pos2::new(rect.right() - 8.0, rect.center().y), Align2::RIGHT_CENTER)
        } else {
            (Pos2::new(rect.left() + 8.0, rect.center().y), Align2::LEFT_CENTER)
        };
        painter.with_clip_rect(rect).text(
            anchor,
            align,
            &month.label,
            theme::font_header(),
            theme::TEXT_PRIMARY,
        );
        painter.line_segment(
            [Pos2::new(if canvas.rtl { rect.right() } else { rect.left() }, top), Pos2::new(if canvas.rtl { rect.right() } else { rect.left() }, top + config.header_height)],
            Stroke::new(1.0, theme::BORDER_SUBTLE),
        );
    }

    for (date, x) in &layout.date_positions {
        let cell = Rect::from_min_size(
            Pos2::new(canvas.left(*x, config.column_width), top + band),
            Vec2::new(config.column_width, band),
        );
        if !cell.intersects(clip) {
            continue;
        }
        let colour = if config.weekend_rule.is_weekend(*date) {
            theme::TEXT_DIM
        } else {
            theme::TEXT_SECONDARY
        };
        painter.text(
            cell.center(),
            Align2::CENTER_CENTER,
            date.format("%a %d").to_string(),
            theme::font_sub(),
            colour,
        );
        if date.day() == 1 {
            painter.line_segment(
                [cell.left_top(), cell.left_bottom()],
                Stroke::new(1.0, theme::BORDER_SUBTLE),
            );
        }
    }

    painter.line_segment(
        [
            Pos2::new(clip.left(), top + config.header_height),
            Pos2::new(clip.right(), top + config.header_height),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    // corner above the label column
    let corner_x = if canvas.rtl {
        clip.right() - config.resource_label_width
    } else {
        clip.left()
    };
    painter.rect_filled(
        Rect::from_min_size(
            Pos2::new(corner_x, top),
            Vec2::new(config.resource_label_width, config.header_height),
        ),
        0.0,
        theme::BG_HEADER,
    );
    painter.text(
        Pos2::new(corner_x + 12.0, top + config.header_height - 12.0),
        Align2::LEFT_BOTTOM,
        format!(
            "{} – {}",
            layout.window.start.format("%b %Y"),
            layout.window.end.format("%b %Y")
        ),
        theme::font_small(),
        theme::TEXT_DIM,
    );
}
