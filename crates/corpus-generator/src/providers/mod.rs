//! Value providers.
//!
//! Each provider produces one random value of a fixed primitive shape from an
//! explicitly passed RNG. Providers keep no state between calls; correlation
//! between successive values (cardinality, fuzziness) is imposed by the
//! binder and its wrappers, never here.

pub mod network;
pub mod numeric;
pub mod static_value;
pub mod timestamp;
pub mod uuid;
pub mod words;

pub use network::{write_geo_point, write_ipv4};
pub use numeric::{default_range, random_int, random_jittered_float};
pub use static_value::render_static;
pub use timestamp::{write_near_time, NEAR_TIME_WINDOW_SECS};
pub use uuid::unique_token;
pub use words::{noun, write_nouns};
