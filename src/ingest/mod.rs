pub mod error;
pub mod wave_grid_loader;
