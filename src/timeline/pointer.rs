//! Resolves pointer coordinates to the resource row and day under them.

use std::time::Instant;

use chrono::NaiveDate;

use super::geometry::Layout;
use super::throttle::Throttle;
use crate::model::{ResourceId, TimelineConfig};

/// Pointer position in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub page_x: f32,
    pub page_y: f32,
}

/// Bounding box and scroll state of the scroll container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    /// Raw horizontal offset (zero or negative for right-to-left).
    pub scroll_left: f32,
    pub scroll_top: f32,
}

/// What the pointer is over. Either half may be missing when the pointer
/// is above the rows, on the label column or past the last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoverTarget {
    pub resource_id: Option<ResourceId>,
    pub date: Option<NaiveDate>,
}

/// Content-space x measured from the start edge.
pub fn content_x(sample: PointerSample, container: ContainerRect, config: &TimelineConfig) -> f32 {
    if config.is_rtl() {
        container.left + container.width - sample.page_x - container.scroll_left
    } else {
        sample.page_x + container.scroll_left - container.left
    }
}

/// Content-space y below the header.
pub fn content_y(sample: PointerSample, container: ContainerRect, config: &TimelineConfig) -> f32 {
    sample.page_y + container.scroll_top - container.top - config.header_height
}

/// Map a pointer sample onto the layout.
pub fn hit_test(
    sample: PointerSample,
    container: ContainerRect,
    config: &TimelineConfig,
    layout: &Layout,
) -> HoverTarget {
    let x = content_x(sample, container, config);
    let y = content_y(sample, container, config);

    let resource_id = if y < 0.0 {
        None
    } else {
        let y = y + config.header_height;
        layout
            .rows
            .iter()
            .find(|row| row.top <= y && y < row.top + row.height)
            .map(|row| row.resource_id)
    };

    let column = ((x - config.resource_label_width) / config.column_width).floor();
    let date = if column < 0.0 {
        None
    } else {
        layout.dates.get(column as usize).copied()
    };

    HoverTarget { resource_id, date }
}

/// Throttled hover tracking.
#[derive(Debug, Clone, Default)]
pub struct PointerMapper {
    throttle: Throttle,
    hovered: HoverTarget,
}

impl PointerMapper {
    pub fn hovered(&self) -> HoverTarget {
        self.hovered
    }

    /// Update the hovered target; samples arriving within the throttle
    /// interval are dropped and `None` is returned.
    pub fn on_move(
        &mut self,
        sample: PointerSample,
        container: ContainerRect,
        config: &TimelineConfig,
        layout: &Layout,
        now: Instant,
    ) -> Option<HoverTarget> {
        if !self.throttle.ready(now) {
            return None;
        }
        self.hovered = hit_test(sample, container, config, layout);
        Some(self.hovered)
    }

    pub fn clear(&mut self) {
        self.hovered = HoverTarget::default();
        self.throttle.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_date, Event, Resource, TextDirection};
    use crate::timeline::window::DateWindow;
    use std::collections::HashSet;
    use std::time::Duration;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn container() -> ContainerRect {
        ContainerRect {
            left: 10.0,
            top: 20.0,
            width: 1_000.0,
            scroll_left: 0.0,
            scroll_top: 0.0,
        }
    }

    fn fixture(config: &TimelineConfig) -> (Vec<Resource>, Layout) {
        let resources = vec![Resource::new("a"), Resource::new("b")];
        let window = DateWindow::covering(date("2024-01-01"), date("2024-01-31"));
        let layout = Layout::compute(
            1,
            window,
            config,
            &resources,
            &[],
            &HashSet::new(),
            date("2024-01-15"),
        );
        (resources, layout)
    }

    #[test]
    fn maps_into_grid() {
        let config = TimelineConfig::default();
        let (resources, layout) = fixture(&config);
        // x = 1_290 + 0 - 10 = 1_280 -> column 9; y = 175 - 20 - 80 = 75 -> row 1
        let hit = hit_test(
            PointerSample {
                page_x: 1_290.0,
                page_y: 175.0,
            },
            container(),
            &config,
            &layout,
        );
        assert_eq!(hit.date, Some(date("2024-01-10")));
        assert_eq!(hit.resource_id, Some(resources[1].id));
    }

    #[test]
    fn accounts_for_scroll_offsets() {
        let config = TimelineConfig::default();
        let (resources, layout) = fixture(&config);
        let scrolled = ContainerRect {
            scroll_left: 1_200.0,
            scroll_top: 50.0,
            ..container()
        };
        let hit = hit_test(
            PointerSample {
                page_x: 210.0,
                page_y: 100.0,
            },
            scrolled,
            &config,
            &layout,
        );
        assert_eq!(hit.date, Some(date("2024-01-11")));
        assert_eq!(hit.resource_id, Some(resources[1].id));
    }

    #[test]
    fn out_of_range_is_none() {
        let config = TimelineConfig::default();
        let (_, layout) = fixture(&config);

        let on_label = hit_test(
            PointerSample {
                page_x: 60.0,
                page_y: 40.0,
            },
            container(),
            &config,
            &layout,
        );
        assert_eq!(on_label, HoverTarget::default());

        let past_rows = hit_test(
            PointerSample {
                page_x: 60.0,
                page_y: 20.0 + 80.0 + 100.0 + 1.0,
            },
            container(),
            &config,
            &layout,
        );
        assert_eq!(past_rows.resource_id, None);

        let past_window = hit_test(
            PointerSample {
                page_x: 10.0 + 200.0 + 31.0 * 120.0,
                page_y: 110.0,
            },
            container(),
            &config,
            &layout,
        );
        assert_eq!(past_window.date, None);
    }

    #[test]
    fn inflated_rows_use_their_full_height() {
        let config = TimelineConfig::default();
        let resources = vec![Resource::new("a"), Resource::new("b")];
        let a = Event::parse(resources[0].id, "1", "2024-01-10", "2024-01-12").unwrap();
        let b = Event::parse(resources[0].id, "2", "2024-01-11", "2024-01-13").unwrap();
        let window = DateWindow::covering(date("2024-01-01"), date("2024-01-31"));
        let layout = Layout::compute(
            1,
            window,
            &config,
            &resources,
            &[a, b],
            &HashSet::new(),
            date("2024-01-15"),
        );

        // 70px below the header is still inside the double-height first row
        let hit = hit_test(
            PointerSample {
                page_x: 300.0,
                page_y: 20.0 + 80.0 + 70.0,
            },
            container(),
            &config,
            &layout,
        );
        assert_eq!(hit.resource_id, Some(resources[0].id));
    }

    #[test]
    fn rtl_measures_from_right_edge() {
        let config = TimelineConfig {
            text_direction: TextDirection::Rtl,
            ..Default::default()
        };
        let (_, layout) = fixture(&config);
        // right edge at 1_010; 1_010 - 1_290 is off-screen, so scroll by -1_200
        let rtl = ContainerRect {
            scroll_left: -1_200.0,
            ..container()
        };
        let hit = hit_test(
            PointerSample {
                page_x: 930.0,
                page_y: 110.0,
            },
            rtl,
            &config,
            &layout,
        );
        // x = 10 + 1_000 - 930 + 1_200 = 1_280 -> column 9
        assert_eq!(hit.date, Some(date("2024-01-10")));
    }

    #[test]
    fn mapper_throttles_samples() {
        let config = TimelineConfig::default();
        let (_, layout) = fixture(&config);
        let mut mapper = PointerMapper::default();
        let t0 = Instant::now();
        let sample = PointerSample {
            page_x: 1_290.0,
            page_y: 110.0,
        };

        assert!(mapper.on_move(sample, container(), &config, &layout, t0).is_some());
        let moved = PointerSample {
            page_x: 1_500.0,
            ..sample
        };
        assert!(mapper
            .on_move(moved, container(), &config, &layout, t0 + Duration::from_millis(50))
            .is_none());
        assert_eq!(mapper.hovered().date, Some(date("2024-01-10")));
    }
}
