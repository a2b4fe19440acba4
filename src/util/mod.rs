//! Browser helpers behind the `authstate` seams.
//!
//! SYSTEM CONTEXT
//! ==============
//! These modules isolate `web-sys` glue so the session core never touches
//! browser APIs directly and SSR builds compile against no-op stubs.

pub mod storage;
pub mod visibility;
