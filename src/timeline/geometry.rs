//! Pixel geometry derived from the date window, configuration and inputs.
//!
//! Every x value produced here is already mirrored for right-to-left
//! layouts (negated), so renderers only need the sign to know which edge a
//! coordinate is measured from.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};

use super::overlap::OverlapMap;
use super::window::DateWindow;
use crate::model::{Event, EventId, Resource, ResourceId, TimelineConfig};

/// A Saturday (or weekend day) column to shade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekendMarker {
    pub date: NaiveDate,
    pub left: f32,
}

/// Vertical extent of a resource row.
///
/// A closed row stacks its events in `lanes`. An open row lists each event
/// on its own line below a summary line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowPosition {
    pub resource_id: ResourceId,
    pub top: f32,
    pub height: f32,
    pub lanes: u32,
    pub open: bool,
}

/// Placement of an event bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
}

/// Consecutive window days that belong to one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup {
    pub year: i32,
    pub month: u32,
    /// e.g. "January 2024"
    pub label: String,
    pub dates: Vec<NaiveDate>,
    /// Position of the group's first day.
    pub left: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearGroup {
    pub year: i32,
    pub months: Vec<MonthGroup>,
}

/// Summary bar covering all of a resource's work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub left: f32,
    pub top: f32,
    pub width: f32,
}

/// Everything a renderer needs to draw one frame of the timeline.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Input revision this layout was derived from.
    pub revision: u64,
    pub window: DateWindow,
    pub dates: Vec<NaiveDate>,
    pub months: Vec<MonthGroup>,
    pub date_positions: BTreeMap<NaiveDate, f32>,
    pub timeline_width: f32,
    pub timeline_height: f32,
    pub weekends: Vec<WeekendMarker>,
    pub rows: Vec<RowPosition>,
    pub event_positions: HashMap<EventId, EventRect>,
    pub resource_spans: HashMap<ResourceId, ResourceSpan>,
    pub today_index: Option<usize>,
    pub overlaps: OverlapMap,
    row_index: HashMap<ResourceId, usize>,
}

/// Left edge of the `index`-th day column, before mirroring.
pub fn column_left(index: usize, config: &TimelineConfig) -> f32 {
    index as f32 * config.column_width + config.resource_label_width
}

/// Width of a bar spanning `start..=end`.
pub fn span_width(start: NaiveDate, end: NaiveDate, config: &TimelineConfig) -> f32 {
    ((end - start).num_days() + 1) as f32 * config.column_width
}

impl Layout {
    pub fn compute(
        revision: u64,
        window: DateWindow,
        config: &TimelineConfig,
        resources: &[Resource],
        events: &[Event],
        open_resources: &HashSet<ResourceId>,
        today: NaiveDate,
    ) -> Self {
        let dates = window.dates();
        let overlaps = OverlapMap::resolve(events);
        let direction = config.text_direction;

        let date_positions: BTreeMap<NaiveDate, f32> = dates
            .iter()
            .enumerate()
            .map(|(i, d)| (*d, direction.mirror(column_left(i, config))))
            .collect();

        let weekends = dates
            .iter()
            .enumerate()
            .filter(|(_, d)| config.weekend_rule.is_weekend(**d))
            .map(|(i, d)| WeekendMarker {
                date: *d,
                left: direction.mirror(column_left(i, config)),
            })
            .collect();

        let months = group_by_month(&dates, config);

        let mut event_counts: HashMap<ResourceId, usize> = HashMap::new();
        for event in events {
            *event_counts.entry(event.resource_id).or_default() += 1;
        }

        let mut rows = Vec::with_capacity(resources.len());
        let mut row_index = HashMap::with_capacity(resources.len());
        let mut top = config.header_height;
        for resource in resources {
            let lanes = overlaps.lane_count(resource.id);
            let open = open_resources.contains(&resource.id);
            let lines = if open {
                event_counts.get(&resource.id).copied().unwrap_or(0) as f32 + 1.0
            } else {
                lanes as f32
            };
            let height = lines * config.row_height;
            row_index.insert(resource.id, rows.len());
            rows.push(RowPosition {
                resource_id: resource.id,
                top,
                height,
                lanes,
                open,
            });
            top += height;
        }
        let timeline_height = top;

        let mut layout = Self {
            revision,
            window,
            timeline_width: dates.len() as f32 * config.column_width
                + config.resource_label_width,
            timeline_height,
            today_index: window.index_of(today),
            dates,
            months,
            date_positions,
            weekends,
            rows,
            event_positions: HashMap::new(),
            resource_spans: HashMap::new(),
            overlaps,
            row_index,
        };
        layout.event_positions = layout.place_events(config, events);
        layout.resource_spans = layout.place_resource_spans(config, resources, events);
        layout
    }

    fn place_events(&self, config: &TimelineConfig, events: &[Event]) -> HashMap<EventId, EventRect> {
        let mut positions = HashMap::new();
        // line of each event within an open row, in input order
        let mut lines: HashMap<ResourceId, u32> = HashMap::new();
        for event in events {
            let line = lines.entry(event.resource_id).or_default();
            *line += 1;
            let line = *line;
            if !self.window.contains(event.start_date) || !self.window.contains(event.end_date) {
                continue;
            }
            let Some(row) = self.row(event.resource_id) else {
                log::debug!(
                    "event {} references unknown resource {}",
                    event.id,
                    event.resource_id
                );
                continue;
            };
            let Some(left) = self.x(event.start_date) else {
                continue;
            };
            let offset = if row.open {
                line
            } else {
                self.overlaps.slot(event.resource_id, event.id) - 1
            };
            positions.insert(
                event.id,
                EventRect {
                    left,
                    top: row.top + offset as f32 * config.row_height,
                    width: span_width(event.start_date, event.end_date, config),
                },
            );
        }
        positions
    }

    fn place_resource_spans(
        &self,
        config: &TimelineConfig,
        resources: &[Resource],
        events: &[Event],
    ) -> HashMap<ResourceId, ResourceSpan> {
        let mut spans = HashMap::new();
        for resource in resources {
            let own = events.iter().filter(|e| e.resource_id == resource.id);
            let derived = own.fold(None, |acc: Option<(NaiveDate, NaiveDate)>, e| match acc {
                Some((s, d)) => Some((s.min(e.start_date), d.max(e.end_date))),
                None => Some((e.start_date, e.end_date)),
            });
            // explicit dates only count when the resource has work at all
            let Some(range) = derived.map(|r| resource.planned_range().unwrap_or(r)) else {
                continue;
            };
            let (start, end) = range;
            let (Some(left), Some(row)) = (self.x(start), self.row(resource.id)) else {
                continue;
            };
            spans.insert(
                resource.id,
                ResourceSpan {
                    start,
                    end,
                    left,
                    top: row.top,
                    width: span_width(start, end, config),
                },
            );
        }
        spans
    }

    /// Position of `date`, if it is in the window.
    pub fn x(&self, date: NaiveDate) -> Option<f32> {
        self.date_positions.get(&date).copied()
    }

    pub fn row(&self, resource_id: ResourceId) -> Option<&RowPosition> {
        self.row_index.get(&resource_id).map(|&i| &self.rows[i])
    }

    pub fn event(&self, event_id: EventId) -> Option<&EventRect> {
        self.event_positions.get(&event_id)
    }

    /// Month groups nested under their year.
    pub fn months_by_year(&self) -> Vec<YearGroup> {
        let mut years: Vec<YearGroup> = Vec::new();
        for month in &self.months {
            match years.last_mut() {
                Some(year) if year.year == month.year => year.months.push(month.clone()),
                _ => years.push(YearGroup {
                    year: month.year,
                    months: vec![month.clone()],
                }),
            }
        }
        years
    }
}

fn group_by_month(dates: &[NaiveDate], config: &TimelineConfig) -> Vec<MonthGroup> {
    let mut months: Vec<MonthGroup> = Vec::new();
    for (i, date) in dates.iter().enumerate() {
        match months.last_mut() {
            Some(group) if group.year == date.year() && group.month == date.month() => {
                group.dates.push(*date);
                group.width += config.column_width;
            }
            _ => months.push(MonthGroup {
                year: date.year(),
                month: date.month(),
                label: date.format("%B %Y").to_string(),
                dates: vec![*date],
                left: config.text_direction.mirror(column_left(i, config)),
                width: config.column_width,
            }),
        }
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_date, TextDirection, WeekendRule};

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn january() -> DateWindow {
        DateWindow::covering(date("2024-01-01"), date("2024-01-31"))
    }

    fn layout_for(config: &TimelineConfig, resources: &[Resource], events: &[Event]) -> Layout {
        let closed = HashSet::new();
        Layout::compute(1, january(), config, resources, events, &closed, date("2024-01-15"))
    }

    // --- dates ---

    #[test]
    fn date_positions_step_by_column_width() {
        let config = TimelineConfig::default();
        let layout = layout_for(&config, &[], &[]);

        assert_eq!(layout.x(date("2024-01-01")), Some(200.0));
        assert_eq!(layout.x(date("2024-01-10")), Some(1280.0));
        let xs: Vec<f32> = layout.date_positions.values().copied().collect();
        assert!(xs.windows(2).all(|p| p[1] - p[0] == config.column_width));
        assert_eq!(layout.timeline_width, 31.0 * 120.0 + 200.0);
    }

    #[test]
    fn rtl_mirrors_every_x() {
        let ltr = TimelineConfig::default();
        let rtl = TimelineConfig {
            text_direction: TextDirection::Rtl,
            ..ltr
        };
        let r = Resource::new("r");
        let e = Event::parse(r.id, "e", "2024-01-10", "2024-01-12").unwrap();
        let resources = [r];
        let events = [e.clone()];
        let a = layout_for(&ltr, &resources, &events);
        let b = layout_for(&rtl, &resources, &events);

        for (d, x) in &a.date_positions {
            assert_eq!(b.date_positions[d], -x);
        }
        for (wa, wb) in a.weekends.iter().zip(&b.weekends) {
            assert_eq!(wb.left, -wa.left);
        }
        assert_eq!(b.event(e.id).unwrap().left, -a.event(e.id).unwrap().left);
        assert_eq!(b.timeline_width, a.timeline_width);
    }

    #[test]
    fn saturdays_are_weekends_by_default() {
        let config = TimelineConfig::default();
        let layout = layout_for(&config, &[], &[]);
        let days: Vec<u32> = layout.weekends.iter().map(|w| w.date.day()).collect();
        assert_eq!(days, vec![6, 13, 20, 27]);
        assert_eq!(layout.weekends[0].left, 5.0 * 120.0 + 200.0);

        let both = TimelineConfig {
            weekend_rule: WeekendRule::SaturdayAndSunday,
            ..config
        };
        assert_eq!(layout_for(&both, &[], &[]).weekends.len(), 8);
    }

    #[test]
    fn month_groups() {
        let config = TimelineConfig::default();
        let window = DateWindow::covering(date("2023-12-01"), date("2024-02-29"));
        let layout =
            Layout::compute(1, window, &config, &[], &[], &HashSet::new(), date("2024-01-15"));

        let labels: Vec<&str> = layout.months.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["December 2023", "January 2024", "February 2024"]);
        assert_eq!(layout.months[1].left, 31.0 * 120.0 + 200.0);
        assert_eq!(layout.months[2].dates.len(), 29);

        let years = layout.months_by_year();
        assert_eq!(years.len(), 2);
        assert_eq!(years[1].months.len(), 2);
    }

    #[test]
    fn today_index() {
        let config = TimelineConfig::default();
        assert_eq!(layout_for(&config, &[], &[]).today_index, Some(14));
        let outside =
            Layout::compute(1, january(), &config, &[], &[], &HashSet::new(), date("2024-03-01"));
        assert_eq!(outside.today_index, None);
    }

    // --- rows and events ---

    #[test]
    fn zero_resources_give_empty_geometry() {
        let config = TimelineConfig::default();
        let layout = layout_for(&config, &[], &[]);
        assert!(layout.rows.is_empty());
        assert!(layout.event_positions.is_empty());
        assert_eq!(layout.timeline_height, config.header_height);
    }

    #[test]
    fn single_event_example() {
        let config = TimelineConfig::default();
        let r = Resource::new("Crane");
        let e = Event::parse(r.id, "Lift", "2024-01-10", "2024-01-12").unwrap();
        let layout = layout_for(&config, &[r], &[e.clone()]);

        assert_eq!(
            layout.event(e.id),
            Some(&EventRect {
                left: 1280.0,
                top: 80.0,
                width: 360.0
            })
        );
    }

    #[test]
    fn single_day_event_is_one_column_wide() {
        let config = TimelineConfig::default();
        let r = Resource::new("r");
        let e = Event::parse(r.id, "e", "2024-01-10", "2024-01-10").unwrap();
        let layout = layout_for(&config, &[r], &[e.clone()]);
        assert_eq!(layout.event(e.id).unwrap().width, config.column_width);
    }

    #[test]
    fn overlapping_events_inflate_row() {
        let config = TimelineConfig::default();
        let r1 = Resource::new("one");
        let r2 = Resource::new("two");
        let a = Event::parse(r1.id, "a", "2024-01-10", "2024-01-12").unwrap();
        let b = Event::parse(r1.id, "b", "2024-01-11", "2024-01-13").unwrap();
        let layout = layout_for(&config, &[r1.clone(), r2.clone()], &[a.clone(), b.clone()]);

        assert_eq!(layout.row(r1.id).unwrap().height, 100.0);
        assert_eq!(layout.row(r2.id).unwrap().top, 80.0 + 100.0);
        assert_eq!(layout.event(a.id).unwrap().top, 80.0);
        assert_eq!(layout.event(b.id).unwrap().top, 130.0);
        assert_eq!(layout.timeline_height, 80.0 + 100.0 + 50.0);
    }

    #[test]
    fn open_rows_list_one_event_per_line() {
        let config = TimelineConfig::default();
        let r1 = Resource::new("one");
        let r2 = Resource::new("two");
        let a = Event::parse(r1.id, "a", "2024-01-10", "2024-01-12").unwrap();
        let b = Event::parse(r1.id, "b", "2024-01-20", "2024-01-21").unwrap();
        let c = Event::parse(r1.id, "c", "2024-01-11", "2024-01-13").unwrap();
        let open = HashSet::from([r1.id]);
        let layout = Layout::compute(
            1,
            january(),
            &config,
            &[r1.clone(), r2.clone()],
            &[a.clone(), b.clone(), c.clone()],
            &open,
            date("2024-01-15"),
        );

        let row = layout.row(r1.id).unwrap();
        assert!(row.open);
        // summary line plus one line per event
        assert_eq!(row.height, 4.0 * 50.0);
        assert_eq!(layout.event(a.id).unwrap().top, 80.0 + 50.0);
        assert_eq!(layout.event(b.id).unwrap().top, 80.0 + 100.0);
        assert_eq!(layout.event(c.id).unwrap().top, 80.0 + 150.0);
        assert_eq!(layout.row(r2.id).unwrap().top, 80.0 + 200.0);
        assert!(!layout.row(r2.id).unwrap().open);
        assert_eq!(layout.timeline_height, 80.0 + 200.0 + 50.0);
    }

    #[test]
    fn open_row_without_events_keeps_its_summary_line() {
        let config = TimelineConfig::default();
        let r = Resource::new("idle");
        let open = HashSet::from([r.id]);
        let layout =
            Layout::compute(1, january(), &config, &[r.clone()], &[], &open, date("2024-01-15"));
        assert_eq!(layout.row(r.id).unwrap().height, config.row_height);
    }

    #[test]
    fn events_outside_window_are_clipped() {
        let config = TimelineConfig::default();
        let r = Resource::new("r");
        let straddling = Event::parse(r.id, "s", "2023-12-30", "2024-01-02").unwrap();
        let later = Event::parse(r.id, "l", "2024-03-01", "2024-03-02").unwrap();
        let layout = layout_for(&config, &[r], &[straddling.clone(), later.clone()]);
        assert!(layout.event(straddling.id).is_none());
        assert!(layout.event(later.id).is_none());
    }

    #[test]
    fn events_for_unknown_resources_are_skipped() {
        let config = TimelineConfig::default();
        let orphan = Event::parse(uuid::Uuid::new_v4(), "o", "2024-01-10", "2024-01-11").unwrap();
        let layout = layout_for(&config, &[], &[orphan.clone()]);
        assert!(layout.event(orphan.id).is_none());
    }

    // --- resource spans ---

    #[test]
    fn resource_span_covers_events() {
        let config = TimelineConfig::default();
        let r = Resource::new("r");
        let a = Event::parse(r.id, "a", "2024-01-03", "2024-01-04").unwrap();
        let b = Event::parse(r.id, "b", "2024-01-08", "2024-01-12").unwrap();
        let layout = layout_for(&config, &[r.clone()], &[a, b]);

        let span = layout.resource_spans[&r.id];
        assert_eq!(span.start, date("2024-01-03"));
        assert_eq!(span.end, date("2024-01-12"));
        assert_eq!(span.left, 2.0 * 120.0 + 200.0);
        assert_eq!(span.width, 10.0 * 120.0);
    }

    #[test]
    fn explicit_resource_dates_win() {
        let config = TimelineConfig::default();
        let mut r = Resource::new("r");
        r.start_date = Some(date("2024-01-02"));
        r.due_date = Some(date("2024-01-20"));
        let a = Event::parse(r.id, "a", "2024-01-05", "2024-01-06").unwrap();
        let layout = layout_for(&config, &[r.clone()], &[a]);

        let span = layout.resource_spans[&r.id];
        assert_eq!(span.start, date("2024-01-02"));
        assert_eq!(span.width, 19.0 * 120.0);
    }
}
