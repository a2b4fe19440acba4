//! Identity provider networking.
//!
//! SYSTEM CONTEXT
//! ==============
//! `supabase` implements the `authstate` provider seam over GoTrue and
//! PostgREST; `types` holds the wire shapes and error-body mapping.

pub mod supabase;
pub mod types;
