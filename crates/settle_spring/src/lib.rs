//! Settle Spring Engine
//!
//! Keyed channels that settle toward caller-supplied targets under spring
//! physics.
//!
//! # Features
//!
//! - **Keyed Channels**: Any `Hash + Eq + Debug` key, one channel per animated quantity
//! - **Independent Integration**: No channel's step reads another's state
//! - **Frame-Rate Aware**: `tick(dt)` sub-steps long frames against a reference rate
//! - **Atomic Ticks**: A tick that would go non-finite changes nothing
//!
//! # Example
//!
//! ```rust
//! use settle_spring::SpringSettler;
//!
//! let mut settler = SpringSettler::new();
//! settler.register_channel("hero", 0.0).unwrap();
//! settler.set_target(&"hero", 100.0).unwrap();
//!
//! while settler.has_active_channels() {
//!     settler.step().unwrap();
//! }
//! assert!((settler.value_of(&"hero").unwrap() - 100.0).abs() < 0.01);
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod settler;

pub use channel::Channel;
pub use config::{SpringConfig, DEFAULT_REST_THRESHOLD};
pub use error::SettleError;
pub use settler::{SpringSettler, TickReport, DEFAULT_FRAME_RATE, MAX_SUBSTEPS};
