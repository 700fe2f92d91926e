use smfkit::prelude::*;

fn close(found: Option<f64>, expected: f64) -> bool {
    found.is_some_and(|f| (f - expected).abs() < 1e-9)
}

#[test]
fn interpolates_between_breakpoints() {
    let mut file = MidiFile::new();
    file.set_ticks_per_quarter_note(480);
    file.add_tempo(0, 0, 120.);
    file.add_note_on(0, 480, 0, 60, 100);

    assert!(close(file.time_in_seconds(480), 0.5));
    assert!(close(file.time_in_seconds(240), 0.25));
    assert_eq!(file.absolute_tick_time(0.25), Some(240));
    assert_eq!(file.time_in_seconds(481), None);
    assert_eq!(file.time_in_seconds(-1), None);
    assert_eq!(file.absolute_tick_time(0.6), None);
}

#[test]
fn tempo_changes_across_tracks() {
    let mut file = MidiFile::new();
    file.set_ticks_per_quarter_note(480);
    file.add_tempo(0, 480, 60.);
    file.add_note_on(1, 0, 0, 60, 100);
    file.add_note_off(1, 960, 0, 60, 0);

    // default 120 for the first beat, then one second per beat
    assert!(close(file.time_in_seconds(480), 0.5));
    assert!(close(file.time_in_seconds(960), 1.5));
    assert!(close(file.time_in_seconds_of(1, 1), 1.5));
    assert!((file.file_duration_in_seconds() - 1.5).abs() < 1e-9);
    assert_eq!(file.absolute_tick_time(1.0), Some(720));
}

#[test]
fn map_is_rebuilt_after_edits() {
    let mut file = MidiFile::new();
    file.set_ticks_per_quarter_note(480);
    file.add_note_on(0, 480, 0, 60, 100);
    assert!(close(file.time_in_seconds(480), 0.5));

    file.add_tempo(0, 0, 60.);
    file.mark_sequence();
    file.sort_tracks();
    assert!(close(file.time_in_seconds(480), 1.0));

    file.set_ticks_per_quarter_note(960);
    assert!(close(file.time_in_seconds(480), 0.5));
}

#[test]
fn millisecond_ticks() {
    let mut file = MidiFile::new();
    file.set_millisecond_ticks();
    file.add_tempo(0, 0, 60.);
    file.add_note_on(0, 1500, 0, 60, 100);
    assert!(close(file.time_in_seconds(1500), 1.5));
    assert_eq!(file.timing().to_division(), 0xE728);
}

#[test]
fn time_analysis_fills_seconds() {
    let mut file = MidiFile::new();
    file.set_ticks_per_quarter_note(100);
    file.add_tempo(0, 0, 120.);
    file.add_note_on(0, 100, 0, 60, 100);
    file.add_note_off(0, 300, 0, 60, 0);
    file.delta_ticks();
    file.do_time_analysis();
    let seconds: Vec<f64> = file.track(0).unwrap().iter().map(|e| e.seconds).collect();
    assert!((seconds[1] - 0.5).abs() < 1e-9);
    assert!((seconds[2] - 1.5).abs() < 1e-9);
}

#[test]
fn empty_file_has_no_map() {
    let file = MidiFile::new();
    assert!(file.time_map().is_empty());
    assert_eq!(file.time_in_seconds(0), None);
    assert_eq!(file.file_duration_in_seconds(), 0.);
}
