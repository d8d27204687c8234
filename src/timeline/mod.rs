//! The timeline engine: inputs, date window, derived layout and the
//! scroll/pointer controllers, owned by one explicitly constructed value.

pub mod geometry;
pub mod overlap;
pub mod pointer;
pub mod scroll;
pub mod throttle;
pub mod window;

use std::collections::HashSet;
use std::time::Instant;

use chrono::NaiveDate;

pub use geometry::{EventRect, Layout, MonthGroup, ResourceSpan, RowPosition, WeekendMarker, YearGroup};
pub use overlap::OverlapMap;
pub use pointer::{ContainerRect, HoverTarget, PointerMapper, PointerSample};
pub use scroll::{ScrollBehavior, ScrollController, ScrollDirection, Viewport, WindowShift};
pub use window::DateWindow;

use crate::error::{Result, TimelineError};
use crate::model::{Event, EventId, Resource, ResourceId, TimelineConfig};

/// First and last day currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// State of one timeline instance.
///
/// Every mutation bumps an input revision; [`Timeline::layout`] rebuilds the
/// derived geometry lazily, at most once per revision.
#[derive(Debug, Clone)]
pub struct Timeline {
    config: TimelineConfig,
    today: NaiveDate,
    resources: Vec<Resource>,
    events: Vec<Event>,
    open_resources: HashSet<ResourceId>,
    window: DateWindow,
    scroll: ScrollController,
    pointer: PointerMapper,
    visible: Option<VisibleRange>,
    revision: u64,
    layout: Option<Layout>,
}

impl Timeline {
    pub fn new(config: TimelineConfig) -> Result<Self> {
        Self::with_today(config, chrono::Local::now().date_naive())
    }

    /// Build a timeline with a fixed notion of "today".
    pub fn with_today(config: TimelineConfig, today: NaiveDate) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            today,
            resources: Vec::new(),
            events: Vec::new(),
            open_resources: HashSet::new(),
            window: DateWindow::around(today),
            scroll: ScrollController::default(),
            pointer: PointerMapper::default(),
            visible: None,
            revision: 0,
            layout: None,
        })
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    // --- inputs ---

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TimelineConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        self.touch();
        self.update_visible_range();
        Ok(())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn set_today(&mut self, today: NaiveDate) {
        if self.today != today {
            self.today = today;
            self.touch();
        }
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event(&self, event_id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == event_id)
    }

    pub fn add_resource(&mut self, resource: Resource) {
        self.resources.push(resource);
        self.touch();
    }

    pub fn add_resources(&mut self, resources: impl IntoIterator<Item = Resource>) {
        self.resources.extend(resources);
        self.touch();
    }

    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
        self.touch();
    }

    pub fn add_events(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
        self.touch();
    }

    /// Drop all resources and events (used when a new dataset is loaded).
    pub fn clear(&mut self) {
        self.resources.clear();
        self.events.clear();
        self.open_resources.clear();
        self.pointer.clear();
        self.touch();
    }

    /// Expand or collapse a resource row; returns whether it is now open.
    ///
    /// An open row shows a summary line followed by one line per event.
    pub fn toggle_open_resource(&mut self, resource_id: ResourceId) -> bool {
        let open = if self.open_resources.remove(&resource_id) {
            false
        } else {
            self.open_resources.insert(resource_id);
            true
        };
        self.touch();
        open
    }

    pub fn is_resource_open(&self, resource_id: ResourceId) -> bool {
        self.open_resources.contains(&resource_id)
    }

    /// Move an event to start on `new_start`, keeping its duration.
    pub fn update_event_date(&mut self, event_id: EventId, new_start: NaiveDate) -> Result<()> {
        let event = self
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or(TimelineError::EventNotFound(event_id))?;
        event.shift_to(new_start)?;
        self.touch();
        Ok(())
    }

    /// Set both ends of an event.
    pub fn update_event_duration(
        &mut self,
        event_id: EventId,
        new_start: NaiveDate,
        new_end: NaiveDate,
    ) -> Result<()> {
        let event = self
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or(TimelineError::EventNotFound(event_id))?;
        event.set_range(new_start, new_end)?;
        self.touch();
        Ok(())
    }

    // --- date window ---

    pub fn window(&self) -> DateWindow {
        self.window
    }

    pub fn reset_dates(&mut self) {
        let reset = DateWindow::around(self.today);
        if reset != self.window {
            log::info!("resetting date window to {} .. {}", reset.start, reset.end);
            self.window = reset;
            self.touch();
            self.update_visible_range();
        }
    }

    /// Returns how many days left the window on the left.
    pub fn move_dates_forward(&mut self) -> u32 {
        let days = self.window.move_forward();
        log::debug!("date window moved forward to {} .. {}", self.window.start, self.window.end);
        self.touch();
        self.update_visible_range();
        days
    }

    /// Returns how many days entered the window on the left.
    pub fn move_dates_back(&mut self) -> u32 {
        let days = self.window.move_back();
        log::debug!("date window moved back to {} .. {}", self.window.start, self.window.end);
        self.touch();
        self.update_visible_range();
        days
    }

    // --- derived geometry ---

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Current layout, rebuilt only when an input changed since the last call.
    pub fn layout(&mut self) -> &Layout {
        let stale = self
            .layout
            .as_ref()
            .map_or(true, |layout| layout.revision != self.revision);
        if stale {
            self.layout = None;
        }
        self.layout.get_or_insert_with(|| {
            Layout::compute(
                self.revision,
                self.window,
                &self.config,
                &self.resources,
                &self.events,
                &self.open_resources,
                self.today,
            )
        })
    }

    /// Bring the cached layout up to date without borrowing it.
    pub fn refresh(&mut self) {
        self.layout();
    }

    /// The cached layout, if it matches the current inputs.
    pub fn current_layout(&self) -> Option<&Layout> {
        self.layout
            .as_ref()
            .filter(|layout| layout.revision == self.revision)
    }

    /// Index of today in the window, `None` when today is outside it.
    pub fn today_position(&mut self) -> Option<usize> {
        self.layout().today_index
    }

    // --- scrolling ---

    pub fn attach(&mut self, viewport: Viewport) {
        self.scroll.attach(viewport);
    }

    pub fn detach(&mut self) {
        self.scroll.detach();
        self.pointer.clear();
        self.visible = None;
    }

    pub fn is_attached(&self) -> bool {
        self.scroll.is_attached()
    }

    pub fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    pub fn visible_range(&self) -> Option<VisibleRange> {
        self.visible
    }

    /// Feed a raw scroll offset from the container.
    ///
    /// When the offset nears an edge the window slides by a month and the
    /// compensating offset is queued in the same call, so the shifted window
    /// is never observed with the old offset. Returns the shift performed.
    pub fn on_scroll(&mut self, raw_scroll_left: f32, now: Instant) -> Option<WindowShift> {
        if !self.scroll.accept(now) {
            log::trace!("scroll sample at {} dropped by throttle", raw_scroll_left);
            return None;
        }
        let direction = self.config.text_direction;
        let width = self.layout().timeline_width;
        let shift = self.scroll.observe(raw_scroll_left, width, direction);

        if let Some(shift) = shift {
            let days = match shift {
                WindowShift::Forward => self.move_dates_forward(),
                WindowShift::Back => self.move_dates_back(),
            };
            self.scroll
                .compensate(shift, days, self.config.column_width, direction);
        }
        self.update_visible_range();
        shift
    }

    fn update_visible_range(&mut self) {
        let Some(viewport) = self.scroll.viewport() else {
            self.visible = None;
            return;
        };
        let config = self.config;
        let left = self.scroll.logical_scroll_left(config.text_direction).max(0.0);
        let dates = &self.layout().dates;
        let last_index = dates.len().saturating_sub(1);
        let first = ((left / config.column_width).floor() as usize).min(last_index);
        let span = (viewport.width - config.resource_label_width).max(0.0);
        let last = (((left + span) / config.column_width).ceil() as usize)
            .saturating_sub(1)
            .clamp(first, last_index);

        let visible = match (dates.get(first), dates.get(last)) {
            (Some(&start), Some(&end)) => Some(VisibleRange { start, end }),
            _ => None,
        };
        self.visible = visible;
    }

    /// Reset the window around today and bring today to the start edge.
    pub fn go_to_today(&mut self, smooth: bool, now: Instant) {
        if !self.is_attached() {
            return;
        }
        self.reset_dates();
        let x = self
            .today_position()
            .map_or(0.0, |index| index as f32 * self.config.column_width);
        self.scroll_to_position(x, smooth, now);
    }

    /// Scroll to a logical offset measured from the start edge.
    pub fn scroll_to_position(&mut self, x: f32, smooth: bool, now: Instant) {
        let direction = self.config.text_direction;
        self.scroll
            .scroll_to(x, ScrollBehavior::from_smooth(smooth), direction, now);
        self.update_visible_range();
    }

    /// Bring a date into view, sliding the window onto it first if needed.
    pub fn scroll_to_date(&mut self, date: NaiveDate, smooth: bool, now: Instant) {
        if !self.is_attached() {
            return;
        }
        if !self.window.contains(date) {
            let centred = DateWindow::around(date);
            log::info!("jumping date window to {} .. {}", centred.start, centred.end);
            self.window = centred;
            self.touch();
        }
        let column_width = self.config.column_width;
        let index = self.window.index_of(date).unwrap_or(0);
        self.scroll_to_position(index as f32 * column_width, smooth, now);
    }

    /// Scroll minimally so logical position `x` sits at least `margin`
    /// pixels inside the visible area. Returns whether a scroll was queued.
    pub fn ensure_position_visible(&mut self, x: f32, margin: f32, now: Instant) -> bool {
        let direction = self.config.text_direction;
        let label_width = self.config.resource_label_width;
        let scrolled = self
            .scroll
            .ensure_visible(x.abs(), margin, label_width, direction, now);
        if scrolled {
            self.update_visible_range();
        }
        scrolled
    }

    /// Next raw offset the container should be scrolled to.
    pub fn poll_scroll(&mut self, now: Instant) -> Option<f32> {
        let raw = self.scroll.poll(now)?;
        self.update_visible_range();
        Some(raw)
    }

    // --- pointer ---

    pub fn hovered(&self) -> HoverTarget {
        self.pointer.hovered()
    }

    /// Throttled hover update; returns the new target when the sample was handled.
    pub fn on_pointer_move(
        &mut self,
        sample: PointerSample,
        container: ContainerRect,
        now: Instant,
    ) -> Option<HoverTarget> {
        if !self.is_attached() {
            return None;
        }
        let config = self.config;
        self.refresh();
        let layout = self.layout.as_ref()?;
        self.pointer.on_move(sample, container, &config, layout, now)
    }

    /// Unthrottled lookup, for drop targets.
    pub fn target_at(&mut self, sample: PointerSample, container: ContainerRect) -> HoverTarget {
        let config = self.config;
        pointer::hit_test(sample, container, &config, self.layout())
    }

    pub fn clear_hover(&mut self) {
        self.pointer.clear();
    }
}
