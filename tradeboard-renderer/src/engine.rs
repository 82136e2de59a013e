//! Label template loading and placeholder substitution.
//!
//! # Placeholders
//!
//! | Token               | Value                                   |
//! |---------------------|-----------------------------------------|
//! | `game.id`           | record identifier                       |
//! | `game.name`         | game name                               |
//! | `game.condition`    | condition label                         |
//! | `game.price`        | price, plain decimal                    |
//! | `missingcomponents` | missing-components clause               |
//! | `smokinghousehold`  | smoking-household clause                |
//! | `animalcondition`   | animal-exposure clause                  |
//! | `mustysmell`        | musty-smell clause                      |
//!
//! Substitution is literal and single-pass: inserted text is never rescanned,
//! and every value is LaTeX-escaped first.

use std::path::{Path, PathBuf};

use tradeboard_core::types::Game;

use crate::context::LabelContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded template, baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const DEFAULT_LABEL: &str = include_str!("templates/label.tex");

pub const PLACEHOLDERS: [&str; 8] = [
    "game.id",
    "game.name",
    "game.condition",
    "game.price",
    "missingcomponents",
    "smokinghousehold",
    "animalcondition",
    "mustysmell",
];

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}

/// Escape LaTeX reserved characters.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '$' => out.push_str("\\$"),
            '&' => out.push_str("\\&"),
            '#' => out.push_str("\\#"),
            '%' => out.push_str("\\%"),
            '_' => out.push_str("\\_"),
            '^' => out.push_str("\\textasciicircum{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            other => out.push(other),
        }
    }
    out
}

fn substitute(source: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(source.len() + 256);
    let mut rest = source;
    loop {
        let next = values
            .iter()
            .filter_map(|(token, value)| rest.find(*token).map(|at| (at, *token, value)))
            .min_by_key(|(at, _, _)| *at);
        match next {
            Some((at, token, value)) => {
                out.push_str(&rest[..at]);
                out.push_str(value);
                rest = &rest[at + token.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// LabelTemplate
// ---------------------------------------------------------------------------

/// A loaded label template. Load once per batch and reuse for every game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTemplate {
    source: String,
}

impl LabelTemplate {
    /// The template compiled into the binary.
    pub fn embedded() -> Self {
        Self::from_source(DEFAULT_LABEL)
    }

    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Read a template override from disk.
    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        let source = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        if !PLACEHOLDERS.iter().any(|token| source.contains(token)) {
            return Err(RenderError::NoPlaceholders {
                path: path.to_path_buf(),
            });
        }
        Ok(Self::from_source(source))
    }

    /// Override file when given, embedded template otherwise.
    pub fn load(override_path: Option<&Path>) -> Result<Self, RenderError> {
        match override_path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::embedded()),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render the label document for `game`.
    pub fn render(&self, game: &Game) -> String {
        self.render_with_context(&LabelContext::from_game(game))
    }

    /// Render using a caller-provided [`LabelContext`].
    pub fn render_with_context(&self, ctx: &LabelContext) -> String {
        let values = [
            ("game.id", escape_latex(&ctx.id)),
            ("game.name", escape_latex(&ctx.name)),
            ("game.condition", escape_latex(&ctx.condition)),
            ("game.price", escape_latex(&ctx.price)),
            ("missingcomponents", escape_latex(&ctx.missing_components)),
            ("smokinghousehold", escape_latex(&ctx.smoking_household)),
            ("animalcondition", escape_latex(&ctx.animal_condition)),
            ("mustysmell", escape_latex(&ctx.musty_smell)),
        ];
        substitute(&self.source, &values)
    }
}

impl Default for LabelTemplate {
    fn default() -> Self {
        Self::embedded()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> LabelContext {
        LabelContext {
            id: "9".to_string(),
            name: "Ticket_to_Ride".to_string(),
            condition: "Fair".to_string(),
            price: "12.50".to_string(),
            missing_components: "All Components Present".to_string(),
            smoking_household: "Smoking Household: No".to_string(),
            animal_condition: "Animal Exposure: None".to_string(),
            musty_smell: "Musty Smell: No".to_string(),
        }
    }

    #[test]
    fn embedded_template_carries_every_placeholder() {
        let template = LabelTemplate::embedded();
        for token in PLACEHOLDERS {
            assert!(template.source().contains(token), "missing {token}");
        }
    }

    #[test]
    fn underscores_are_escaped() {
        let out = LabelTemplate::from_source("[game.name]").render_with_context(&ctx());
        assert_eq!(out, "[Ticket\\_to\\_Ride]");
    }

    #[test]
    fn escape_covers_reserved_set() {
        assert_eq!(escape_latex("50% & $5 #1"), "50\\% \\& \\$5 \\#1");
        assert_eq!(escape_latex("{a}"), "\\{a\\}");
        assert_eq!(escape_latex("a\\b"), "a\\textbackslash{}b");
        assert_eq!(escape_latex("x^2~"), "x\\textasciicircum{}2\\textasciitilde{}");
    }

    #[test]
    fn inserted_values_are_not_rescanned() {
        let mut c = ctx();
        c.name = "game.price".to_string();
        let out = LabelTemplate::from_source("game.name / game.price").render_with_context(&c);
        assert_eq!(out, "game.price / 12.50");
    }

    #[test]
    fn repeated_tokens_are_all_replaced() {
        let out = LabelTemplate::from_source("game.id-game.id").render_with_context(&ctx());
        assert_eq!(out, "9-9");
    }

    #[test]
    fn missing_override_is_io_error() {
        let err = LabelTemplate::load(Some(Path::new("/nonexistent/label.tex"))).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/label.tex"));
    }
}
