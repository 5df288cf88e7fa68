//! Output line records
//!
//! The translator and the export orchestrator append structured records to a
//! [`GcodeProgram`]. Text is only produced by [`GcodeProgram::render`], which
//! also applies line numbering, so post-passes like the boundary annotator can
//! insert records without renumbering anything.

use crate::program::canonical_mnemonic;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Mnemonics whose lines move the head
const MOTION_MNEMONICS: [&str; 8] = ["G0", "G1", "G2", "G3", "G5", "G81", "G82", "G83"];

/// Whether `mnemonic` (any spelling) is a motion instruction
pub fn is_motion_mnemonic(mnemonic: &str) -> bool {
    let canonical = canonical_mnemonic(mnemonic);
    MOTION_MNEMONICS.contains(&canonical.as_str())
}

/// One parameter word, e.g. `X12.500`
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub letter: char,
    /// Value as rendered (rounded to the rendered precision)
    pub value: f64,
    text: String,
}

impl Word {
    /// Word rendered with a fixed number of decimals
    pub fn fixed(letter: char, value: f64, precision: usize) -> Self {
        let text = format!("{:.*}", precision, value);
        let value = text.parse().unwrap_or(value);
        Self {
            letter,
            value,
            text,
        }
    }

    /// Word rendered in its shortest decimal form (`500`, `0.25`)
    pub fn plain(letter: char, value: f64) -> Self {
        Self {
            letter,
            value,
            text: format!("{}", value),
        }
    }

    /// Rendered number without the letter
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter, self.text)
    }
}

/// A machine instruction: mnemonic plus parameter words
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub mnemonic: String,
    /// Mnemonic omitted on output (modal suppression)
    pub suppressed: bool,
    pub words: Vec<Word>,
}

impl Instruction {
    pub fn new(mnemonic: impl Into<String>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            suppressed: false,
            words: Vec::new(),
        }
    }

    pub fn with_word(mut self, word: Word) -> Self {
        self.words.push(word);
        self
    }

    pub fn is_motion(&self) -> bool {
        is_motion_mnemonic(&self.mnemonic)
    }

    /// First word with the given letter
    pub fn word(&self, letter: char) -> Option<&Word> {
        self.words.iter().find(|w| w.letter == letter)
    }

    /// Printing this instruction would not change the machine: nothing at
    /// all, or a motion mnemonic with no words left
    pub fn is_noop(&self) -> bool {
        self.words.is_empty() && (self.suppressed || self.is_motion())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if !self.suppressed {
            write!(f, "{}", self.mnemonic)?;
            first = false;
        }
        for word in &self.words {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}", word)?;
            first = false;
        }
        Ok(())
    }
}

/// One output line
#[derive(Debug, Clone, PartialEq)]
pub enum GcodeLine {
    /// Rendered as `;text`
    Comment(String),
    Instruction(Instruction),
    /// User supplied text (preamble, postamble), passed through verbatim
    Text(String),
}

impl fmt::Display for GcodeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comment(text) => write!(f, ";{}", text),
            Self::Instruction(instruction) => write!(f, "{}", instruction),
            Self::Text(text) => write!(f, "{}", text),
        }
    }
}

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| {
        Regex::new(r"([A-Za-z])\s*([-+]?(?:\d+\.?\d*|\.\d+))").expect("invalid word regex")
    })
}

/// Tokenise a free-text G-code line into words. A leading `N` line number
/// is skipped, and scanning stops at a `;` comment. Comment-only lines and
/// parenthesised comments yield nothing.
pub fn scan_words(text: &str) -> Vec<Word> {
    let code = text.split(';').next().unwrap_or("").trim();
    if code.starts_with('(') {
        return Vec::new();
    }
    let mut words: Vec<Word> = word_regex()
        .captures_iter(code)
        .filter_map(|caps| {
            let letter = caps.get(1)?.as_str().chars().next()?.to_ascii_uppercase();
            let number = caps.get(2)?.as_str();
            Some(Word {
                letter,
                value: number.parse().ok()?,
                text: number.to_string(),
            })
        })
        .collect();
    if words.first().is_some_and(|w| w.letter == 'N') {
        words.remove(0);
    }
    words
}

/// Ordered, append-only buffer of output lines
#[derive(Debug, Clone, Default)]
pub struct GcodeProgram {
    lines: Vec<GcodeLine>,
    boundary_anchor: Option<usize>,
}

impl GcodeProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: GcodeLine) {
        self.lines.push(line);
    }

    pub fn push_comment(&mut self, text: impl Into<String>) {
        self.lines.push(GcodeLine::Comment(text.into()));
    }

    pub fn push_instruction(&mut self, instruction: Instruction) {
        self.lines.push(GcodeLine::Instruction(instruction));
    }

    /// Append free text, one record per non-blank line
    pub fn push_text(&mut self, text: &str) {
        for line in text.lines().map(str::trim_end).filter(|l| !l.trim().is_empty()) {
            self.lines.push(GcodeLine::Text(line.to_string()));
        }
    }

    /// Record the current end of the buffer as the boundary block slot
    pub fn mark_boundary_anchor(&mut self) {
        self.boundary_anchor = Some(self.lines.len());
    }

    pub fn boundary_anchor(&self) -> Option<usize> {
        self.boundary_anchor
    }

    /// Splice `lines` in at the boundary slot. The slot is consumed.
    pub fn insert_at_anchor(&mut self, lines: Vec<GcodeLine>) -> bool {
        match self.boundary_anchor.take() {
            Some(index) if index <= self.lines.len() => {
                self.lines.splice(index..index, lines);
                true
            }
            _ => false,
        }
    }

    pub fn lines(&self) -> &[GcodeLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render to text. With `line_number_start` set, every line gets an
    /// `N<counter> ` prefix; the counter advances by 10 before each line.
    /// The counter is 64-bit so any `u32` base is safe.
    pub fn render(&self, line_number_start: Option<u32>) -> String {
        let mut out = String::new();
        let mut counter = line_number_start.map(u64::from);
        for line in &self.lines {
            if let Some(n) = counter.as_mut() {
                *n += 10;
                out.push_str(&format!("N{} ", n));
            }
            out.push_str(&line.to_string());
            out.push('\n');
        }
        out
    }
}
