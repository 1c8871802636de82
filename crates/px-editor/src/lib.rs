// SPDX-License-Identifier: MIT

//! Editor core for the pixel editor.
//!
//! Everything here is pure state and geometry: canvases, documents,
//! tools, tabs, the codec boundary, and viewport math. The crate knows
//! nothing about terminals beyond painting into a [`px_term`] frame
//! buffer — input handling and the event loop live in the binary.

pub mod canvas;
pub mod codec;
pub mod document;
pub mod pixel;
pub mod tabs;
pub mod tool;
pub mod view;
