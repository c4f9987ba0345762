pub mod heat_map;
