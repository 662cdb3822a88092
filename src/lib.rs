//! # weft-tui
//!
//! A markup-driven widget toolkit for character-cell terminals.
//!
//! weft-tui lets applications build a collection of independently-drawn
//! widgets composited onto one shared terminal surface. Widget text is
//! written in a small inline markup language (attribute toggles, color
//! pairs, alignment, line-drawing glyphs) that compiles to attributed
//! cells before being blitted. A single-threaded traversal engine routes
//! keystrokes either to the focused widget or to toolkit-level
//! navigation and exit actions.
//!
//! ## Core Systems
//!
//! - **[`markup`]** — markup compiler/decompiler, attributes, glyph table
//! - **[`render`]** — cell surface with frame diffing, crossterm driver
//! - **[`widget`]** — the Widget contract every widget implements
//! - **[`widgets`]** — built-in widgets (currently [`widgets::Label`])
//! - **[`event`]** — key input types and per-widget binding tables
//! - **[`screen`]** — widget registry: arena, z-order, focus, refresh
//! - **[`traverse`]** — focus traversal engine and the input loop
//! - **[`app`]** — application context tying screens to a terminal
//! - **[`geometry`]** — Offset, Size, Region primitives

// Foundation
pub mod geometry;

// Markup pipeline
pub mod markup;

// Rendering
pub mod render;

// Widget system
pub mod widget;
pub mod widgets;

// Input
pub mod event;

// Registry and traversal
pub mod screen;
pub mod traverse;

// Application
pub mod app;

// Test support (headless pilot, surface snapshots)
pub mod testing;
