use std::time::{Duration, Instant};

use chrono::NaiveDate;
use rust_timeline_app::io::parse_dataset;
use rust_timeline_app::settings::Settings;
use rust_timeline_app::timeline::{Viewport, WindowShift};
use rust_timeline_app::{Event, Resource, TextDirection, Timeline, TimelineConfig, TimelineError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Window starts on 2024-01-01 when today is mid-February.
fn january_timeline(config: TimelineConfig) -> Timeline {
    Timeline::with_today(config, date(2024, 2, 15)).unwrap()
}

#[test]
fn single_event_is_placed_on_its_columns() {
    let mut timeline = january_timeline(TimelineConfig::default());
    let resource = Resource::new("1");
    let event = Event::new(resource.id, "1", date(2024, 1, 10), date(2024, 1, 12)).unwrap();
    timeline.add_resource(resource);
    timeline.add_event(event.clone());

    let layout = timeline.layout();
    assert_eq!(layout.window.start, date(2024, 1, 1));
    assert_eq!(layout.date_positions[&date(2024, 1, 10)], 1_280.0);

    let rect = layout.event(event.id).unwrap();
    assert_eq!(rect.left, 1_280.0);
    assert_eq!(rect.width, 360.0);
    assert_eq!(rect.top, 80.0);
}

#[test]
fn overlapping_events_stack_and_grow_the_row() {
    let mut timeline = january_timeline(TimelineConfig::default());
    let resource = Resource::new("1");
    let first = Event::new(resource.id, "a", date(2024, 1, 10), date(2024, 1, 12)).unwrap();
    let second = Event::new(resource.id, "b", date(2024, 1, 11), date(2024, 1, 13)).unwrap();
    timeline.add_resource(resource.clone());
    timeline.add_events([first.clone(), second.clone()]);

    let layout = timeline.layout();
    assert_eq!(layout.overlaps.slot(resource.id, first.id), 1);
    assert_eq!(layout.overlaps.slot(resource.id, second.id), 2);
    assert_eq!(layout.row(resource.id).unwrap().height, 100.0);
    assert_eq!(layout.event(second.id).unwrap().top, 130.0);
}

#[test]
fn positions_step_by_one_column_per_day() {
    let mut timeline = january_timeline(TimelineConfig::default());
    let layout = timeline.layout();
    let xs: Vec<f32> = layout.date_positions.values().copied().collect();
    assert_eq!(xs.len(), layout.window.len_days());
    assert!(xs.windows(2).all(|pair| pair[1] - pair[0] == 120.0));
}

#[test]
fn rtl_negates_every_position() {
    let mut ltr = january_timeline(TimelineConfig::default());
    let mut rtl = january_timeline(TimelineConfig {
        text_direction: TextDirection::Rtl,
        ..Default::default()
    });
    let ltr_layout = ltr.layout().clone();
    let rtl_layout = rtl.layout();
    for (d, x) in &ltr_layout.date_positions {
        assert_eq!(rtl_layout.date_positions[d], -x);
    }
}

#[test]
fn reset_is_idempotent() {
    let mut timeline = january_timeline(TimelineConfig::default());
    timeline.move_dates_forward();
    timeline.reset_dates();
    let first = timeline.window();
    timeline.reset_dates();
    assert_eq!(timeline.window(), first);
}

#[test]
fn endless_scroll_forward_keeps_content_in_place() {
    let mut timeline = january_timeline(TimelineConfig::default());
    timeline.attach(Viewport {
        width: 1_000.0,
        height: 500.0,
    });
    let t0 = Instant::now();

    let mut raw = 0.0;
    let mut shifts = 0;
    for step in 0..40u64 {
        let now = t0 + Duration::from_millis(step * 150);
        raw += 400.0;
        let anchor = timeline.window().start + chrono::Days::new(45);
        let before = timeline.layout().x(anchor).unwrap() - raw;
        if timeline.on_scroll(raw, now) == Some(WindowShift::Forward) {
            shifts += 1;
            raw = timeline.poll_scroll(now).unwrap();
            assert_eq!(timeline.layout().x(anchor).unwrap() - raw, before);
        }
    }
    assert!(shifts > 0);
    // the window still spans three whole months
    let window = timeline.window();
    assert_eq!(window.start.format("%d").to_string(), "01");
    assert!(window.len_days() >= 89 && window.len_days() <= 92);
}

#[test]
fn unknown_events_are_reported() {
    let mut timeline = january_timeline(TimelineConfig::default());
    let stray = Event::new(uuid::Uuid::new_v4(), "x", date(2024, 1, 1), date(2024, 1, 2)).unwrap();
    let err = timeline.update_event_date(stray.id, date(2024, 1, 5)).unwrap_err();
    assert!(matches!(err, TimelineError::EventNotFound(id) if id == stray.id));
}

#[test]
fn dataset_feeds_a_timeline() {
    let json = r##"{
        "resources": [
            { "id": "6f1c7c0e-3b7a-4f0e-9a51-1d2b3c4d5e6f", "name": "Crane", "colour": "#ff8800" }
        ],
        "events": [
            {
                "resourceId": "6f1c7c0e-3b7a-4f0e-9a51-1d2b3c4d5e6f",
                "name": "Lift",
                "startDate": "2024-01-03",
                "endDate": "2024-01-04"
            }
        ]
    }"##;
    let dataset = parse_dataset(json).unwrap();
    let mut timeline = january_timeline(TimelineConfig::default());
    timeline.add_resources(dataset.resources);
    timeline.add_events(dataset.events);

    let event_id = timeline.events()[0].id;
    let layout = timeline.layout();
    assert_eq!(layout.rows.len(), 1);
    assert_eq!(layout.event(event_id).unwrap().left, 2.0 * 120.0 + 200.0);
}

#[test]
fn malformed_dates_fail_the_load() {
    let json = r#"{ "resources": [], "events": [
        { "resourceId": "6f1c7c0e-3b7a-4f0e-9a51-1d2b3c4d5e6f",
          "startDate": "2024-13-01", "endDate": "2024-01-04" } ] }"#;
    assert!(matches!(
        parse_dataset(json),
        Err(TimelineError::InvalidDate { .. })
    ));
}

#[test]
fn settings_survive_a_round_trip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");
    let mut settings = Settings::default();
    settings.timeline.text_direction = TextDirection::Rtl;
    settings.timeline.column_width = 64.0;
    settings.save_to(&path).unwrap();

    let loaded = Settings::load_from(&path).unwrap();
    assert_eq!(loaded, settings);
    assert!(january_timeline(loaded.timeline).config().is_rtl());
}
