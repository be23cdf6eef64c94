mod error;
mod record;
mod stats;
mod ratio;
mod simulate;
mod convert;
mod benchset;
mod plot;
mod report;

pub use {
    error::*,
    record::*,
    stats::*,
    ratio::*,
    simulate::*,
    convert::*,
    benchset::*,
    plot::*,
    report::*,
};

pub mod test_utils;
