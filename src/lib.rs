//! Interactive annotation and measurement engine for paged drawings.
//!
//! The host renders the document pages (scanned plans, blueprints) and
//! forwards pointer and keyboard events in page coordinates. The engine owns
//! everything drawn on top: shapes, calibrated measurements, selection,
//! handle-based resize and rotate, undo history, and the clipboard. After
//! each event it reports [`engine::Action`]s and can build a
//! renderer-agnostic [`render::Scene`] for the host's [`render::Renderer`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Entity store: shapes, measurements, selection, calibration |
//! | [`geometry`] | Points, rectangles, distances, areas, unit conversion |
//! | [`camera`] | Host viewport mirror and screen/page conversions |
//! | [`input`] | Tools, modifiers, and the gesture state machine |
//! | [`hit`] | Point and marquee hit-testing, handle positions |
//! | [`resize`] | Pure resize and rotate math for handle drags |
//! | [`history`] | Snapshot undo/redo |
//! | [`clipboard`] | Copy, cut and paste with fresh ids |
//! | [`render`] | Scene building and the renderer contract |
//! | [`config`] | Tunables with JSON overrides |
//! | [`consts`] | Default sizes, colors and limits |

pub mod camera;
pub mod clipboard;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod history;
pub mod hit;
pub mod input;
pub mod render;
pub mod resize;
