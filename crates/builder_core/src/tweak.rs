use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color pattern"));

/// Returns true when `value` is a six digit `#RRGGBB` color.
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

/// Which tweak input box a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweakField {
    Headline,
    Subheadline,
    Cta,
    /// Free-text color box (the picker is driven by `Msg::ColorPickerChanged`).
    Color,
}

/// Raw values of the tweak input surface, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TweakInput {
    pub headline: String,
    pub subheadline: String,
    pub cta: String,
    pub color: String,
}

impl TweakInput {
    pub fn set(&mut self, field: TweakField, value: String) {
        match field {
            TweakField::Headline => self.headline = value,
            TweakField::Subheadline => self.subheadline = value,
            TweakField::Cta => self.cta = value,
            TweakField::Color => self.color = value,
        }
    }

    /// Clears the text fields after a successful tweak. The color is kept.
    pub fn clear_text(&mut self) {
        self.headline.clear();
        self.subheadline.clear();
        self.cta.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweakError {
    /// All four fields were blank.
    Empty,
    /// Only a color was given and it is not a valid hex value.
    NoValidFields,
}

impl fmt::Display for TweakError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TweakError::Empty => {
                write!(f, "Enter at least one change (headline, subheadline, CTA, or color)")
            }
            TweakError::NoValidFields => write!(f, "Color must be a hex value like #1A2B3C"),
        }
    }
}

/// Sparse patch of edits applied to the current preview.
///
/// Always holds at least one field; construct through [`TweakSet::from_input`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweakSet {
    pub headline: Option<String>,
    pub subheadline: Option<String>,
    pub cta: Option<String>,
    pub color: Option<String>,
}

impl TweakSet {
    /// Trims every field, drops blanks and drops a color that is not `#RRGGBB`.
    pub fn from_input(input: &TweakInput) -> Result<Self, TweakError> {
        let headline = non_blank(&input.headline);
        let subheadline = non_blank(&input.subheadline);
        let cta = non_blank(&input.cta);
        let raw_color = non_blank(&input.color);

        if headline.is_none() && subheadline.is_none() && cta.is_none() && raw_color.is_none() {
            return Err(TweakError::Empty);
        }

        let color = raw_color.filter(|c| is_hex_color(c));
        let set = Self {
            headline,
            subheadline,
            cta,
            color,
        };
        if set.is_empty() {
            return Err(TweakError::NoValidFields);
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.headline.is_none()
            && self.subheadline.is_none()
            && self.cta.is_none()
            && self.color.is_none()
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
