use snappost_core::{MeasurementSystem, Position};
use snappost_post::config::{ExportOptions, SessionConfig};
use snappost_post::line::GcodeProgram;
use snappost_post::program::{ToolpathCommand, ToolpathGroup};
use snappost_post::profile::Toolhead;
use snappost_post::translator::Translator;

fn session(options: ExportOptions) -> SessionConfig {
    SessionConfig::resolve(&options).unwrap()
}

fn motion_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|l| !l.starts_with(';')).collect()
}

#[test]
fn test_single_rapid_move() {
    let config = SessionConfig::default();
    let mut translator = Translator::new(&config);
    let mut out = GcodeProgram::new();
    translator
        .translate_command(
            &ToolpathCommand::new("G0")
                .with('X', 10.0)
                .with('Y', 0.0)
                .with('Z', 5.0),
            &mut out,
        )
        .unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out.render(None), "G1 X10.000 Y0.000 Z5.000 F300.000\n");
}

#[test]
fn test_nested_groups_keep_program_order() {
    let config = SessionConfig::default();
    let mut translator = Translator::new(&config);
    let mut out = GcodeProgram::new();

    let mut inner = ToolpathGroup::new();
    inner.label = Some("Pass 1".to_string());
    inner.push_command(ToolpathCommand::new("G1").with('X', 2.0));
    inner.push_command(ToolpathCommand::new("G1").with('Y', 3.0));

    let mut program = ToolpathGroup::new();
    program.push_command(ToolpathCommand::new("(Profile)"));
    program.push_group(inner);
    program.push_command(ToolpathCommand::new("G0").with('Z', 5.0));

    translator.translate(&program, &mut out).unwrap();
    assert_eq!(
        out.render(None),
        ";(Profile)\n\
         G1 X2.000 Y0.000 Z0.000 F600.000\n\
         G1 X2.000 Y3.000 Z0.000 F600.000\n\
         G1 X2.000 Y3.000 Z5.000 F300.000\n"
    );
    assert_eq!(translator.state().position, Position::new(2.0, 3.0, 5.0));
}

#[test]
fn test_modal_output_keeps_parameters() {
    let config = session(ExportOptions {
        modal: true,
        ..Default::default()
    });
    let mut translator = Translator::new(&config);
    let mut out = GcodeProgram::new();
    let program = ToolpathGroup::from_commands(vec![
        ToolpathCommand::new("G1").with('X', 5.0),
        ToolpathCommand::new("G1").with('X', 10.0),
    ]);
    translator.translate(&program, &mut out).unwrap();

    let text = out.render(None);
    assert_eq!(text.matches("G1").count(), 1);
    assert_eq!(
        motion_lines(&text),
        vec![
            "G1 X5.000 Y0.000 Z0.000 F600.000",
            "X10.000 Y0.000 Z0.000 F600.000"
        ]
    );
}

#[test]
fn test_modal_applies_across_arc_segments() {
    let config = session(ExportOptions {
        modal: true,
        segments_per_cm: 1.0,
        ..Default::default()
    });
    let mut translator = Translator::new(&config);
    let mut out = GcodeProgram::new();
    let program = ToolpathGroup::from_commands(vec![
        ToolpathCommand::new("G0").with('X', 10.0),
        // Half circle of radius 10: 31.4 mm at 1 segment/cm
        ToolpathCommand::new("G2")
            .with('X', -10.0)
            .with('I', -10.0)
            .with('J', 0.0),
    ]);
    translator.translate(&program, &mut out).unwrap();

    let text = out.render(None);
    let lines = motion_lines(&text);
    assert_eq!(lines.len(), 1 + 4);
    assert!(lines[0].starts_with("G1 "));
    assert!(lines[1..].iter().all(|l| l.starts_with('X')));
    assert_eq!(lines[4], "X-10.000 Y0.000 Z0.000 F600.000");
}

#[test]
fn test_imperial_output() {
    let config = session(ExportOptions {
        units: MeasurementSystem::Imperial,
        ..Default::default()
    });
    let mut translator = Translator::new(&config);
    let mut out = GcodeProgram::new();
    let program = ToolpathGroup::from_commands(vec![
        // 25.4 mm/s horizontal feed is 60 in/min
        ToolpathCommand::new("G1")
            .with('X', 50.8)
            .with('Y', 12.7)
            .with('F', 25.4),
        ToolpathCommand::new("G92").with('Z', 2.54).with('A', 90.0),
    ]);
    translator.translate(&program, &mut out).unwrap();

    assert_eq!(
        out.render(None),
        "G1 X2.0000 Y0.5000 Z0.0000 F60.0000\nG92 Z0.1000 A90.0000\n"
    );
}

#[test]
fn test_level_two_spindle_power() {
    let config = session(ExportOptions {
        toolhead: Toolhead::LevelTwo,
        ..Default::default()
    });
    let mut translator = Translator::new(&config);
    let mut out = GcodeProgram::new();
    let program = ToolpathGroup::from_commands(vec![
        ToolpathCommand::new("M03").with('S', 9000.0),
        ToolpathCommand::new("M05"),
    ]);
    translator.translate(&program, &mut out).unwrap();
    assert_eq!(out.render(None), "M3 P50\nM5\n");
}

#[test]
fn test_broken_straights() {
    let config = session(ExportOptions {
        break_straights: true,
        segments_per_cm: 2.0,
        ..Default::default()
    });
    let mut translator = Translator::new(&config);
    let mut out = GcodeProgram::new();
    translator
        .translate_command(&ToolpathCommand::new("G1").with('X', 20.0), &mut out)
        .unwrap();
    // 2 cm at 2 segments/cm
    assert_eq!(
        out.render(None),
        "G1 X5.000 Y0.000 Z0.000 F600.000\n\
         G1 X10.000 Y0.000 Z0.000 F600.000\n\
         G1 X15.000 Y0.000 Z0.000 F600.000\n\
         G1 X20.000 Y0.000 Z0.000 F600.000\n"
    );
}
