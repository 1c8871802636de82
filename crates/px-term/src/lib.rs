// SPDX-License-Identifier: MIT

//! Terminal backend for the pixel editor.
//!
//! A small, self-contained TUI layer: raw mode and alternate screen
//! handling, an input parser for keys and SGR mouse, a cell-based frame
//! buffer, a differential ANSI renderer, and an event loop that ties
//! them together behind the [`event_loop::App`] trait.

pub mod buffer;
pub mod cell;
pub mod diff;
pub mod emit;
pub mod event_loop;
pub mod input;
pub mod reader;
pub mod terminal;
