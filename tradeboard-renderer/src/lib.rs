//! # tradeboard-renderer
//!
//! Turns a game record into the LaTeX source of its printable label by
//! literal placeholder substitution into a label template.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tradeboard_renderer::LabelTemplate;
//! use tradeboard_core::types::Game;
//!
//! fn render_all(games: &[Game]) {
//!     let template = LabelTemplate::embedded();
//!     for game in games {
//!         let tex = template.render(game);
//!         println!("game {}: {} bytes", game.id, tex.len());
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::LabelContext;
pub use engine::{escape_latex, LabelTemplate, PLACEHOLDERS};
pub use error::RenderError;
