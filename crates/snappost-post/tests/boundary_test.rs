use snappost_post::boundary::{annotate, Boundary};
use snappost_post::line::{GcodeLine, GcodeProgram};
use snappost_post::AnnotationError;

#[test]
fn test_bounds_from_body() {
    let boundary = Boundary::from_text("G1 X0 Y0 Z0\nG1 X10 Y5 Z-2\n");

    assert_eq!(boundary.range('X'), Some((0.0, 10.0)));
    assert_eq!(boundary.range('Y'), Some((0.0, 5.0)));
    assert_eq!(boundary.range('Z'), Some((-2.0, 0.0)));
    assert_eq!(boundary.range('B'), None);
}

#[test]
fn test_numbered_and_modal_lines() {
    let text = "N110 G21\nN120 G1 X-3.5 Y1 Z0 F600\nN130 X12 Y7\nN140 M5\n";
    let boundary = Boundary::from_text(text);
    assert_eq!(boundary.range('X'), Some((-3.5, 12.0)));
    assert_eq!(boundary.range('Y'), Some((1.0, 7.0)));
    assert_eq!(boundary.range('Z'), Some((0.0, 0.0)));
}

#[test]
fn test_preamble_text_counts() {
    let mut program = GcodeProgram::new();
    program.mark_boundary_anchor();
    program.push_text("G0 X-1 Y-1 Z20\nG90");
    program.push(GcodeLine::Comment("G1 X500".to_string()));
    program.push_text("G1 X1 Y1 Z1");

    let boundary = annotate(&mut program, "mm").unwrap();
    assert_eq!(boundary.range('X'), Some((-1.0, 1.0)));
    assert_eq!(boundary.range('Z'), Some((1.0, 20.0)));
    assert_eq!(program.lines()[2].to_string(), ";max_z(mm): 20");
    assert_eq!(program.lines()[7].to_string(), ";min_z(mm): 1");
}

#[test]
fn test_missing_axis_leaves_program_untouched() {
    let mut program = GcodeProgram::new();
    program.mark_boundary_anchor();
    program.push_text("G1 X1 Y1");

    let err = annotate(&mut program, "mm").unwrap_err();
    assert_eq!(err, AnnotationError::NoMotion('Z'));
    assert_eq!(program.len(), 1);
}
