pub mod error;
pub mod geojson_store;
