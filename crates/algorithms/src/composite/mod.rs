//! Temporal compositing
//!
//! Per-pixel reducers over image series: median, mode, mean and max.

mod temporal;

pub use temporal::{
    pixel_max, reduce, reduce_bands, temporal_mean, temporal_median, temporal_mode, Reducer,
};
