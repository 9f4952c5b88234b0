//! State module for tracking what the server last told us
//!
//! # Components
//!
//! - `ClientState`: quota and cooldown observed from the latest page
//! - `Cooldown`: a backoff paired with the timestamp it is measured from

mod client_state;

pub use client_state::{ClientState, Cooldown};
