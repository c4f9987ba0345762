pub mod bezier;
pub mod dynamics;
pub mod gesture;
pub mod interaction;
pub mod kalman;
pub mod low_pass;
pub mod transform;
