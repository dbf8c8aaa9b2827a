//! Domain services called by the transport layer.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the request flow (rate limiting, validation,
//! rendering, poll bookkeeping) so the transport can stay focused on
//! protocol translation and message delivery.

pub mod card;
