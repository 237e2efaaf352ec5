//! Flutter-facing FFI crate for FlowTrack.
//! Exposes use-case level task APIs generated through flutter_rust_bridge.

pub mod api;
