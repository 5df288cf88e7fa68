//! Boundary annotator
//!
//! Recovers the bounding box of everything the program moves through and
//! places a summary block in the Snapmaker header, at the slot the header
//! recorded with [`GcodeProgram::mark_boundary_anchor`].

use crate::error::AnnotationError;
use crate::line::{is_motion_mnemonic, scan_words, GcodeLine, GcodeProgram, Word};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisRange {
    min: f64,
    max: f64,
}

impl AxisRange {
    fn include(range: &mut Option<AxisRange>, value: f64) {
        match range {
            Some(r) => {
                r.min = r.min.min(value);
                r.max = r.max.max(value);
            }
            None => *range = Some(AxisRange { min: value, max: value }),
        }
    }
}

/// Running min/max of the X, Y and Z values seen on motion lines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Boundary {
    x: Option<AxisRange>,
    y: Option<AxisRange>,
    z: Option<AxisRange>,
}

impl Boundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one axis value into the box. Letters other than X/Y/Z are ignored.
    pub fn include(&mut self, axis: char, value: f64) {
        match axis.to_ascii_uppercase() {
            'X' => AxisRange::include(&mut self.x, value),
            'Y' => AxisRange::include(&mut self.y, value),
            'Z' => AxisRange::include(&mut self.z, value),
            _ => {}
        }
    }

    /// `(min, max)` for an axis, if it ever appeared
    pub fn range(&self, axis: char) -> Option<(f64, f64)> {
        let range = match axis.to_ascii_uppercase() {
            'X' => self.x,
            'Y' => self.y,
            'Z' => self.z,
            _ => None,
        };
        range.map(|r| (r.min, r.max))
    }

    /// Scan output records. Instructions count when their mnemonic is a
    /// motion mnemonic, modally suppressed or not; free text is tokenised.
    pub fn from_lines(lines: &[GcodeLine]) -> Self {
        let mut boundary = Self::new();
        for line in lines {
            match line {
                GcodeLine::Instruction(instruction) if instruction.is_motion() => {
                    boundary.include_words(&instruction.words);
                }
                GcodeLine::Text(text) => boundary.include_text_line(text),
                _ => {}
            }
        }
        boundary
    }

    /// Scan plain G-code text line by line
    pub fn from_text(text: &str) -> Self {
        let mut boundary = Self::new();
        for line in text.lines() {
            boundary.include_text_line(line);
        }
        boundary
    }

    fn include_text_line(&mut self, line: &str) {
        let words = scan_words(line);
        let Some(first) = words.first() else {
            return;
        };
        let is_motion = match first.letter {
            'G' => is_motion_mnemonic(&format!("G{}", first.text())),
            // Modal continuation of the previous motion
            'X' | 'Y' | 'Z' => true,
            _ => false,
        };
        if is_motion {
            self.include_words(&words);
        }
    }

    /// First occurrence of each axis on a line
    fn include_words(&mut self, words: &[Word]) {
        for axis in ['X', 'Y', 'Z'] {
            if let Some(word) = words.iter().find(|w| w.letter == axis) {
                self.include(axis, word.value);
            }
        }
    }

    /// The header comment block. Every axis must have been seen.
    pub fn comment_lines(&self, unit_label: &str) -> Result<Vec<GcodeLine>, AnnotationError> {
        let x = self.x.ok_or(AnnotationError::NoMotion('X'))?;
        let y = self.y.ok_or(AnnotationError::NoMotion('Y'))?;
        let z = self.z.ok_or(AnnotationError::NoMotion('Z'))?;

        let entries: [(&str, f64); 8] = [
            ("max_x", x.max),
            ("max_y", y.max),
            ("max_z", z.max),
            ("max_b", 0.0),
            ("min_x", x.min),
            ("min_y", y.min),
            ("min_b", 0.0),
            ("min_z", z.min),
        ];
        Ok(entries
            .iter()
            .map(|(name, value)| GcodeLine::Comment(format!("{}({}): {}", name, unit_label, value)))
            .collect())
    }
}

/// Compute the bounding box of `program` and splice its block in at the
/// recorded anchor. On error the program is left unchanged.
pub fn annotate(program: &mut GcodeProgram, unit_label: &str) -> Result<Boundary, AnnotationError> {
    if program.boundary_anchor().is_none() {
        return Err(AnnotationError::MissingAnchor);
    }
    let boundary = Boundary::from_lines(program.lines());
    let block = boundary.comment_lines(unit_label)?;
    if !program.insert_at_anchor(block) {
        return Err(AnnotationError::MissingAnchor);
    }
    debug!("Boundary block added: {:?}", boundary);
    Ok(boundary)
}
