//! Horizontal scroll tracking and the month-shift trigger behind infinite
//! scrolling.
//!
//! Offsets handed to and returned from this module are *raw* container
//! offsets: positive for left-to-right, zero-or-negative for right-to-left.
//! Internally everything is converted to a logical offset measured from
//! the start edge.

use std::time::{Duration, Instant};

use super::throttle::Throttle;
use crate::model::TextDirection;

/// Fraction of the timeline width that triggers a window shift near an edge.
pub const TRIGGER_FRACTION: f32 = 0.1;

pub const SMOOTH_SCROLL_DURATION: Duration = Duration::from_millis(300);

/// Size of the attached scroll container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    #[default]
    Idle,
    Forward,
    Backward,
}

/// Which way the date window has to slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowShift {
    Forward,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

impl ScrollBehavior {
    pub fn from_smooth(smooth: bool) -> Self {
        if smooth {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Instant
        }
    }
}

/// Eased interpolation between two raw offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAnimation {
    pub from: f32,
    pub to: f32,
    pub started: Instant,
    pub duration: Duration,
}

impl ScrollAnimation {
    /// Offset at `now` and whether the animation has finished.
    pub fn sample(&self, now: Instant) -> (f32, bool) {
        let elapsed = now.saturating_duration_since(self.started);
        if self.duration.is_zero() || elapsed >= self.duration {
            return (self.to, true);
        }
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        let eased = 1.0 - (1.0 - t).powi(3);
        (self.from + (self.to - self.from) * eased, false)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScrollController {
    viewport: Option<Viewport>,
    direction: ScrollDirection,
    scroll_left: f32,
    throttle: Throttle,
    pending: Option<f32>,
    animation: Option<ScrollAnimation>,
}

impl ScrollController {
    pub fn attach(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    pub fn detach(&mut self) {
        self.viewport = None;
        self.pending = None;
        self.animation = None;
        self.direction = ScrollDirection::Idle;
        self.throttle.reset();
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn is_attached(&self) -> bool {
        self.viewport.is_some()
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    /// Last observed (or compensated) raw offset.
    pub fn scroll_left(&self) -> f32 {
        self.scroll_left
    }

    /// Offset measured from the start edge regardless of direction.
    pub fn logical_scroll_left(&self, direction: TextDirection) -> f32 {
        direction.mirror(self.scroll_left)
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Rate-limit gate for incoming scroll samples.
    pub fn accept(&mut self, now: Instant) -> bool {
        self.is_attached() && self.throttle.ready(now)
    }

    /// Record a new raw offset and decide whether the window must slide.
    pub fn observe(
        &mut self,
        raw: f32,
        timeline_width: f32,
        direction: TextDirection,
    ) -> Option<WindowShift> {
        let viewport = self.viewport?;
        let previous = direction.mirror(self.scroll_left);
        let current = direction.mirror(raw);
        self.scroll_left = raw;
        self.direction = if current > previous {
            ScrollDirection::Forward
        } else if current < previous {
            ScrollDirection::Backward
        } else {
            ScrollDirection::Idle
        };

        let trigger_area = timeline_width * TRIGGER_FRACTION;
        match self.direction {
            ScrollDirection::Forward
                if current + viewport.width >= timeline_width - trigger_area =>
            {
                Some(WindowShift::Forward)
            }
            ScrollDirection::Backward if current < trigger_area => Some(WindowShift::Back),
            _ => None,
        }
    }

    /// Offset the scroll position so content stays put after the window slid
    /// by `days` columns.
    ///
    /// The compensated offset becomes the last observed one, so the echo of
    /// writing it back to the container reads as idle.
    pub fn compensate(
        &mut self,
        shift: WindowShift,
        days: u32,
        column_width: f32,
        direction: TextDirection,
    ) -> f32 {
        let delta = days as f32 * column_width;
        let logical_delta = match shift {
            WindowShift::Forward => -delta,
            WindowShift::Back => delta,
        };
        let raw_delta = direction.mirror(logical_delta);
        let raw = self.scroll_left + raw_delta;
        self.scroll_left = raw;
        self.pending = Some(raw);
        if let Some(animation) = self.animation.as_mut() {
            animation.from += raw_delta;
            animation.to += raw_delta;
        }
        raw
    }

    /// Request a scroll to a logical offset.
    pub fn scroll_to(
        &mut self,
        logical_x: f32,
        behavior: ScrollBehavior,
        direction: TextDirection,
        now: Instant,
    ) {
        if !self.is_attached() {
            return;
        }
        let target = direction.mirror(logical_x.max(0.0));
        match behavior {
            ScrollBehavior::Instant => {
                self.animation = None;
                self.pending = Some(target);
                self.scroll_left = target;
            }
            ScrollBehavior::Smooth => {
                self.pending = None;
                self.animation = Some(ScrollAnimation {
                    from: self.scroll_left,
                    to: target,
                    started: now,
                    duration: SMOOTH_SCROLL_DURATION,
                });
            }
        }
    }

    /// Scroll just enough to show logical position `x` with `margin` pixels
    /// of room, keeping clear of the sticky label column.
    pub fn ensure_visible(
        &mut self,
        x: f32,
        margin: f32,
        label_width: f32,
        direction: TextDirection,
        now: Instant,
    ) -> bool {
        let Some(viewport) = self.viewport else {
            return false;
        };
        let left = direction.mirror(self.scroll_left);
        let visible_start = left + label_width;
        let visible_end = left + viewport.width;

        let target = if x - margin < visible_start {
            Some(x - margin - label_width)
        } else if x + margin > visible_end {
            Some(x + margin - viewport.width)
        } else {
            None
        };
        match target {
            Some(target) => {
                self.scroll_to(target, ScrollBehavior::Instant, direction, now);
                true
            }
            None => false,
        }
    }

    /// Next raw offset to write to the container, if any. The written
    /// offset becomes the last observed one.
    pub fn poll(&mut self, now: Instant) -> Option<f32> {
        if let Some(raw) = self.pending.take() {
            return Some(raw);
        }
        let animation = self.animation?;
        let (raw, done) = animation.sample(now);
        if done {
            self.animation = None;
        }
        self.scroll_left = raw;
        Some(raw)
    }
}
