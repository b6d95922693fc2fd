pub mod coordinate;
pub mod day_bucket;
pub mod feature;
pub mod wave_grid;
